//! In-memory rendering backend.
//!
//! Records live surfaces instead of drawing anything, and only counts the
//! exited ones. Used by the command-line front end to describe the surface a
//! selection would produce, and by tests to drive pan events.

use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::config::Renderer;
use crate::geometry::ViewBounds;
use crate::layer::LayerSpec;

use super::{LayerHandle, NodeId, RenderBackend, RenderSurface, SurfaceSpec, TransformListener};

/// Everything the headless backend knows about one surface.
#[derive(Debug, Clone, Serialize)]
pub struct SurfaceRecord {
    pub node: NodeId,
    pub spec: SurfaceSpec,
    /// Current view, internal coordinates
    pub view: ViewBounds,
    pub layers: Vec<LayerSpec>,
    pub draws: usize,
}

/// Records of live surfaces only; exited ones are dropped and counted.
#[derive(Default)]
struct Shared {
    next_id: u64,
    created: usize,
    exited: usize,
    surfaces: Vec<SurfaceRecord>,
    listeners: Vec<(NodeId, Arc<dyn Fn(&ViewBounds) + Send + Sync>)>,
}

fn lock(shared: &Mutex<Shared>) -> MutexGuard<'_, Shared> {
    // A poisoned lock only means a listener panicked; the records are intact.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Inspection handle onto a [`HeadlessBackend`].
#[derive(Clone, Default)]
pub struct HeadlessHandle {
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessHandle {
    /// Number of surfaces ever created.
    pub fn created_count(&self) -> usize {
        lock(&self.shared).created
    }

    /// Number of surfaces not yet exited.
    pub fn live_count(&self) -> usize {
        lock(&self.shared).surfaces.len()
    }

    /// Number of surfaces exited.
    pub fn exit_count(&self) -> usize {
        lock(&self.shared).exited
    }

    /// The most recently created surface that is still live.
    pub fn live_surface(&self) -> Option<SurfaceRecord> {
        lock(&self.shared).surfaces.last().cloned()
    }

    /// Records of every live surface, oldest first.
    pub fn surfaces(&self) -> Vec<SurfaceRecord> {
        lock(&self.shared).surfaces.clone()
    }

    /// Move the live surface's view and fire its pan listeners.
    ///
    /// Returns false when no surface is live.
    pub fn pan_to(&self, view: ViewBounds) -> bool {
        let listeners = {
            let mut shared = lock(&self.shared);
            let Some(record) = shared.surfaces.last_mut() else {
                return false;
            };
            record.view = view;
            let node = record.node;
            shared
                .listeners
                .iter()
                .filter(|(owner, _)| *owner == node)
                .map(|(_, listener)| Arc::clone(listener))
                .collect::<Vec<_>>()
        };

        for listener in listeners {
            listener(&view);
        }
        true
    }
}

/// Rendering backend that draws nothing.
pub struct HeadlessBackend {
    handle: HeadlessHandle,
    unsupported: Vec<Renderer>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            handle: HeadlessHandle::default(),
            unsupported: Vec::new(),
        }
    }

    /// Pretend `renderer` cannot be created.
    pub fn without_renderer(mut self, renderer: Renderer) -> Self {
        self.unsupported.push(renderer);
        self
    }

    pub fn handle(&self) -> HeadlessHandle {
        self.handle.clone()
    }
}

impl Default for HeadlessBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl RenderBackend for HeadlessBackend {
    type Surface = HeadlessSurface;

    fn supports(&self, renderer: Renderer) -> bool {
        !self.unsupported.contains(&renderer)
    }

    fn create_surface(&mut self, spec: &SurfaceSpec) -> HeadlessSurface {
        let mut shared = lock(&self.handle.shared);
        shared.next_id += 1;
        shared.created += 1;
        let node = NodeId(shared.next_id);
        shared.surfaces.push(SurfaceRecord {
            node,
            spec: spec.clone(),
            view: ViewBounds::covering(&spec.max_bounds),
            layers: Vec::new(),
            draws: 0,
        });

        HeadlessSurface {
            node,
            shared: Arc::clone(&self.handle.shared),
        }
    }
}

/// Surface created by [`HeadlessBackend`].
pub struct HeadlessSurface {
    node: NodeId,
    shared: Arc<Mutex<Shared>>,
}

impl HeadlessSurface {
    fn with_record<T>(&self, f: impl FnOnce(&mut SurfaceRecord) -> T) -> Option<T> {
        let mut shared = lock(&self.shared);
        shared
            .surfaces
            .iter_mut()
            .find(|s| s.node == self.node)
            .map(f)
    }
}

impl RenderSurface for HeadlessSurface {
    fn node(&self) -> NodeId {
        self.node
    }

    fn bounds(&self) -> ViewBounds {
        self.with_record(|record| record.view)
            .unwrap_or(ViewBounds {
                left: 0.0,
                top: 0.0,
                right: 0.0,
                bottom: 0.0,
            })
    }

    fn add_layer(&mut self, layer: &LayerSpec) -> LayerHandle {
        let mut shared = lock(&self.shared);
        shared.next_id += 1;
        let handle = LayerHandle(shared.next_id);
        if let Some(record) = shared.surfaces.iter_mut().find(|s| s.node == self.node) {
            record.layers.push(layer.clone());
        }
        handle
    }

    fn draw(&mut self) {
        self.with_record(|record| record.draws += 1);
    }

    fn on_pan(&mut self, listener: TransformListener) {
        lock(&self.shared)
            .listeners
            .push((self.node, Arc::from(listener)));
    }

    fn exit(&mut self) {
        let mut shared = lock(&self.shared);
        let node = self.node;
        let before = shared.surfaces.len();
        shared.surfaces.retain(|s| s.node != node);
        if shared.surfaces.len() < before {
            shared.exited += 1;
        }
        shared.listeners.retain(|(owner, _)| *owner != node);
    }
}
