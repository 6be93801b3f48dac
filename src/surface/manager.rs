use std::sync::Arc;

use tracing::debug;

use crate::config::{Renderer, RendererConfig};
use crate::geometry::{to_ingest_y, ViewBounds, WorldBounds};
use crate::host::ViewHost;
use crate::layer::LayerSpec;
use crate::viewport::{Viewport, ViewportUpdate};

use super::{select_renderer, LayerHandle, RenderBackend, RenderSurface, SurfaceSpec};

/// Push the transform implied by `bounds` into the viewport.
///
/// ```text
/// scale = (right - left) / width
/// top   = -bounds.top      (back to the ingest convention)
/// left  = bounds.left
/// ```
///
/// Does nothing while the viewport has no width.
pub fn sync_viewport(viewport: &Viewport, bounds: &ViewBounds) {
    let width = viewport.width();
    if width == 0 {
        return;
    }
    viewport.set(ViewportUpdate::transform(
        bounds.width() / f64::from(width),
        to_ingest_y(bounds.top),
        bounds.left,
    ));
}

/// Owner of the single live rendering surface.
pub struct SurfaceManager<B: RenderBackend> {
    backend: B,

    renderer: RendererConfig,

    /// Shared viewport kept in sync with the live surface
    viewport: Viewport,

    /// Container the surface node is mounted in
    host: Arc<dyn ViewHost>,

    /// Pixel size used when the container reports none
    default_size: u32,

    surface: Option<B::Surface>,

    spec: Option<SurfaceSpec>,

    /// Layers attached to the live surface, in attachment order
    layers: Vec<LayerHandle>,
}

impl<B: RenderBackend> SurfaceManager<B> {
    pub fn new(
        backend: B,
        renderer: RendererConfig,
        viewport: Viewport,
        host: Arc<dyn ViewHost>,
        default_size: u32,
    ) -> Self {
        Self {
            backend,
            renderer,
            viewport,
            host,
            default_size,
            surface: None,
            spec: None,
            layers: Vec::new(),
        }
    }

    /// Replace the live surface with a new one sized to `bounds`.
    ///
    /// The previous surface, if any, is destroyed first. The new surface is
    /// mounted in the container, the viewport is synced to it, and a pan
    /// listener keeps the viewport synced afterwards.
    pub fn create_surface(&mut self, bounds: &WorldBounds) -> &mut B::Surface {
        self.destroy();

        let (width, height) = self.container_size();
        let renderer = self.active_renderer();
        let spec = SurfaceSpec::new(*bounds, width, height, renderer);

        let mut surface = self.backend.create_surface(&spec);
        debug!(
            "Created {}x{} surface for bounds {:?} ({:?})",
            width, height, bounds, renderer
        );

        sync_viewport(&self.viewport, &surface.bounds());
        let viewport = self.viewport.clone();
        surface.on_pan(Box::new(move |view| sync_viewport(&viewport, view)));

        self.spec = Some(spec);
        let surface = self.surface.insert(surface);
        self.host.mount_surface(surface.node());
        surface
    }

    /// Mount the live surface's node in the container, replacing its content.
    pub fn attach_to_container(&self) {
        if let Some(ref surface) = self.surface {
            self.host.mount_surface(surface.node());
        }
    }

    /// Atomically swap the active imagery: new surface for `bounds`, one
    /// layer, one redraw.
    pub fn set_imagery(&mut self, bounds: &WorldBounds, layer: &LayerSpec) -> LayerHandle {
        let surface = self.create_surface(bounds);
        let handle = surface.add_layer(layer);
        surface.draw();
        self.layers.push(handle);
        debug!("Attached layer {:?}", handle);
        handle
    }

    /// Re-derive the viewport transform from the live surface.
    ///
    /// No-op when there is no surface.
    pub fn sync_viewport(&self) {
        if let Some(ref surface) = self.surface {
            sync_viewport(&self.viewport, &surface.bounds());
        }
    }

    /// Destroy the live surface and everything attached to it. Idempotent.
    pub fn destroy(&mut self) {
        if let Some(mut surface) = self.surface.take() {
            surface.exit();
            debug!("Destroyed surface {:?}", surface.node());
        }
        self.spec = None;
        self.layers.clear();
    }

    /// Pixel size of the container, substituting the default for zero.
    pub fn container_size(&self) -> (u32, u32) {
        let (width, height) = self.host.container_size();
        let or_default = |v: u32| if v == 0 { self.default_size } else { v };
        (or_default(width), or_default(height))
    }

    /// Renderer new surfaces and layers are created with.
    pub fn active_renderer(&self) -> Renderer {
        select_renderer(&self.backend, &self.renderer)
    }

    pub fn has_surface(&self) -> bool {
        self.surface.is_some()
    }

    pub fn surface(&self) -> Option<&B::Surface> {
        self.surface.as_ref()
    }

    pub fn spec(&self) -> Option<&SurfaceSpec> {
        self.spec.as_ref()
    }

    pub fn layers(&self) -> &[LayerHandle] {
        &self.layers
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: RenderBackend> Drop for SurfaceManager<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}
