//! Rendering surface management.
//!
//! The actual rasterization and tiling renderer is an opaque capability
//! behind two traits:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            SurfaceManager               │
//! │  (one live surface, viewport sync)      │
//! └────────────────────┬────────────────────┘
//!                      │ create_surface(SurfaceSpec)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          RenderBackend Trait            │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │          RenderSurface Trait            │
//! │  node · bounds · layers · draw · pan    │
//! └─────────────────────────────────────────┘
//! ```
//!
//! A surface's projection is fixed when it is constructed, so new imagery
//! bounds always mean a new surface. [`SurfaceManager`] guarantees at most
//! one live surface and releases the previous one unconditionally before
//! creating the next.

mod headless;
mod manager;

use serde::Serialize;

use crate::config::{Renderer, RendererConfig};
use crate::geometry::{AxisConvention, Point, ViewBounds, WorldBounds};
use crate::layer::LayerSpec;

pub use headless::{HeadlessBackend, HeadlessHandle, HeadlessSurface, SurfaceRecord};
pub use manager::{sync_viewport, SurfaceManager};

/// Identifier of a surface's drawing node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u64);

/// Identifier of a layer attached to a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct LayerHandle(pub u64);

/// Callback invoked by a surface after every pan or zoom.
pub type TransformListener = Box<dyn Fn(&ViewBounds) + Send + Sync>;

// =============================================================================
// Surface Spec
// =============================================================================

/// Construction parameters of a rendering surface.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SurfaceSpec {
    /// Pixel width of the drawing node
    pub width: u32,
    /// Pixel height of the drawing node
    pub height: u32,
    /// World extent of the imagery
    pub max_bounds: WorldBounds,
    /// Initial view center, ingest coordinates
    pub center: Point,
    pub zoom: f64,
    pub discrete_zoom: bool,
    pub clamp_bounds_x: bool,
    pub clamp_bounds_y: bool,
    pub zoom_animation: bool,
    /// Convention of coordinates handed to the surface
    pub ingest: AxisConvention,
    /// Convention of the surface's own coordinates
    pub internal: AxisConvention,
    pub renderer: Renderer,
}

impl SurfaceSpec {
    /// Spec for a surface showing `bounds` on a `width` x `height` node.
    ///
    /// Zoom starts at 0, is continuous, and panning is not clamped so the
    /// view can move past the nominal bounds.
    pub fn new(bounds: WorldBounds, width: u32, height: u32, renderer: Renderer) -> Self {
        Self {
            width,
            height,
            max_bounds: bounds,
            center: bounds.center(),
            zoom: 0.0,
            discrete_zoom: false,
            clamp_bounds_x: false,
            clamp_bounds_y: false,
            zoom_animation: false,
            ingest: AxisConvention::SouthUp,
            internal: AxisConvention::NorthUp,
            renderer,
        }
    }
}

// =============================================================================
// Backend Traits
// =============================================================================

/// A live rendering surface.
pub trait RenderSurface: Send {
    /// Drawing node to mount in the container.
    fn node(&self) -> NodeId;

    /// Currently visible region, internal (north-up) coordinates.
    fn bounds(&self) -> ViewBounds;

    /// Attach a layer.
    fn add_layer(&mut self, layer: &LayerSpec) -> LayerHandle;

    /// Redraw all layers.
    fn draw(&mut self);

    /// Register a listener called after every pan or zoom.
    fn on_pan(&mut self, listener: TransformListener);

    /// Release the node, all layers and all listeners.
    fn exit(&mut self);
}

/// Factory for rendering surfaces.
pub trait RenderBackend: Send {
    type Surface: RenderSurface + 'static;

    /// Whether surfaces can be created with `renderer`.
    fn supports(&self, _renderer: Renderer) -> bool {
        true
    }

    fn create_surface(&mut self, spec: &SurfaceSpec) -> Self::Surface;
}

/// Pick the renderer for a new surface.
pub fn select_renderer<B: RenderBackend>(backend: &B, config: &RendererConfig) -> Renderer {
    if backend.supports(config.preferred) {
        config.preferred
    } else {
        config.fallback
    }
}
