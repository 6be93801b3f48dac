//! Shared viewport for annotation overlays.
//!
//! The viewport maps overlay pixel space onto imagery world coordinates:
//!
//! ```text
//! world_x = left + pixel_x * scale
//! world_y = top  + pixel_y * scale
//! ```
//!
//! It is a plain observable state holder. Every write goes through
//! [`Viewport::set`], which merges the given fields and publishes the new
//! state to all subscribers before returning. Overlay renderers hold a
//! [`ViewportWatch`] and re-read the state whenever it changes.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

/// Receiver side of the viewport, handed to overlay renderers.
pub type ViewportWatch = watch::Receiver<ViewportState>;

/// Snapshot of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewportState {
    /// Overlay drawing area width in pixels
    pub width: u32,
    /// Overlay drawing area height in pixels
    pub height: u32,
    /// World units per pixel
    pub scale: f64,
    /// World `y` of the overlay origin
    pub top: f64,
    /// World `x` of the overlay origin
    pub left: f64,
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            width: 0,
            height: 0,
            scale: 1.0,
            top: 0.0,
            left: 0.0,
        }
    }
}

/// Partial update merged by [`Viewport::set`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ViewportUpdate {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub scale: Option<f64>,
    pub top: Option<f64>,
    pub left: Option<f64>,
}

impl ViewportUpdate {
    /// Update of the pixel dimensions only.
    pub fn size(width: u32, height: u32) -> Self {
        Self {
            width: Some(width),
            height: Some(height),
            ..Self::default()
        }
    }

    /// Update of the world transform only.
    pub fn transform(scale: f64, top: f64, left: f64) -> Self {
        Self {
            scale: Some(scale),
            top: Some(top),
            left: Some(left),
            ..Self::default()
        }
    }

    fn apply(&self, state: &mut ViewportState) {
        if let Some(width) = self.width {
            state.width = width;
        }
        if let Some(height) = self.height {
            state.height = height;
        }
        if let Some(scale) = self.scale {
            state.scale = scale;
        }
        if let Some(top) = self.top {
            state.top = top;
        }
        if let Some(left) = self.left {
            state.left = left;
        }
    }
}

/// Observable viewport shared between the controller, the surface's
/// transform listener and every overlay renderer.
///
/// Cloning is cheap and yields a handle to the same state.
#[derive(Debug, Clone)]
pub struct Viewport {
    sender: Arc<watch::Sender<ViewportState>>,
}

impl Viewport {
    pub fn new() -> Self {
        Self::with_state(ViewportState::default())
    }

    pub fn with_state(state: ViewportState) -> Self {
        let (sender, _) = watch::channel(state);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Merge `update` into the current state and notify subscribers.
    ///
    /// Subscribers are marked changed even when no subscriber is alive yet
    /// and even when the merged values are identical.
    pub fn set(&self, update: ViewportUpdate) {
        self.sender.send_modify(|state| update.apply(state));
    }

    /// Current state.
    pub fn get(&self) -> ViewportState {
        *self.sender.borrow()
    }

    pub fn width(&self) -> u32 {
        self.sender.borrow().width
    }

    pub fn height(&self) -> u32 {
        self.sender.borrow().height
    }

    pub fn scale(&self) -> f64 {
        self.sender.borrow().scale
    }

    pub fn top(&self) -> f64 {
        self.sender.borrow().top
    }

    pub fn left(&self) -> f64 {
        self.sender.borrow().left
    }

    /// Subscribe to state changes.
    pub fn subscribe(&self) -> ViewportWatch {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn observer_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new()
    }
}
