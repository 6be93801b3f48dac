//! Annotation overlays.
//!
//! Each displayed annotation is drawn by its own overlay renderer on a
//! drawing element inside the host's overlay container. All renderers share
//! the [`Viewport`](crate::viewport::Viewport), so panning the imagery
//! re-projects every overlay at once:
//!
//! ```text
//!  AnnotationList ──toggle──▶ OverlayManager ──create──▶ OverlayBackend
//!                                  │                          │
//!                                  │ element per overlay      ▼
//!                                  ▼                   OverlayRenderer ◀── ViewportWatch
//!                              ViewHost
//! ```
//!
//! The manager tracks two sets: the ids the annotation list reports as
//! displayed, and the ids it actually holds an overlay for. An overlay is
//! only ever added for an id that is still displayed when its payload
//! arrives, so the tracked set stays a subset of the displayed set.

mod headless;
mod manager;

use serde::{Deserialize, Serialize};

use crate::fetch::AnnotationBody;
use crate::host::ElementId;
use crate::viewport::ViewportWatch;

pub use headless::{HeadlessOverlayBackend, OverlayStats};
pub use manager::{OverlayManager, ToggleAction};

/// An annotation's entry in the annotation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationModel {
    pub id: String,
    pub displayed: bool,
}

impl AnnotationModel {
    pub fn displayed(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            displayed: true,
        }
    }

    pub fn hidden(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            displayed: false,
        }
    }
}

/// Draws one annotation onto one overlay element.
pub trait OverlayRenderer: Send {
    /// Paint the annotation with the current viewport transform.
    fn render(&mut self);

    /// Release the renderer's resources. Called exactly once.
    fn remove(&mut self);
}

/// Factory for overlay renderers.
pub trait OverlayBackend: Send + Sync {
    fn create(
        &self,
        element: ElementId,
        viewport: ViewportWatch,
        annotation: &AnnotationBody,
    ) -> Box<dyn OverlayRenderer>;
}
