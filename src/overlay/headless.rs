//! Overlay renderers that only count what they are asked to do.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::fetch::AnnotationBody;
use crate::host::ElementId;
use crate::viewport::{ViewportState, ViewportWatch};

use super::{OverlayBackend, OverlayRenderer};

/// Counters shared by every renderer of one backend.
#[derive(Debug, Default)]
pub struct OverlayStats {
    created: AtomicUsize,
    renders: AtomicUsize,
    removed: AtomicUsize,
    elements_drawn: AtomicUsize,
    last_viewport: Mutex<Option<ViewportState>>,
}

impl OverlayStats {
    pub fn created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    pub fn renders(&self) -> usize {
        self.renders.load(Ordering::SeqCst)
    }

    pub fn removed(&self) -> usize {
        self.removed.load(Ordering::SeqCst)
    }

    /// Total shapes painted across all renders.
    pub fn elements_drawn(&self) -> usize {
        self.elements_drawn.load(Ordering::SeqCst)
    }

    /// Viewport state seen by the most recent render.
    pub fn last_viewport(&self) -> Option<ViewportState> {
        *self.last_viewport.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn live(&self) -> usize {
        self.created().saturating_sub(self.removed())
    }
}

#[derive(Debug, Clone, Default)]
pub struct HeadlessOverlayBackend {
    stats: Arc<OverlayStats>,
}

impl HeadlessOverlayBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stats(&self) -> Arc<OverlayStats> {
        self.stats.clone()
    }
}

impl OverlayBackend for HeadlessOverlayBackend {
    fn create(
        &self,
        _element: ElementId,
        viewport: ViewportWatch,
        annotation: &AnnotationBody,
    ) -> Box<dyn OverlayRenderer> {
        self.stats.created.fetch_add(1, Ordering::SeqCst);
        Box::new(HeadlessOverlay {
            viewport,
            shapes: annotation.elements.len(),
            stats: self.stats.clone(),
        })
    }
}

struct HeadlessOverlay {
    viewport: ViewportWatch,
    shapes: usize,
    stats: Arc<OverlayStats>,
}

impl OverlayRenderer for HeadlessOverlay {
    fn render(&mut self) {
        let state = *self.viewport.borrow_and_update();
        *self
            .stats
            .last_viewport
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(state);
        self.stats.renders.fetch_add(1, Ordering::SeqCst);
        self.stats
            .elements_drawn
            .fetch_add(self.shapes, Ordering::SeqCst);
    }

    fn remove(&mut self) {
        self.stats.removed.fetch_add(1, Ordering::SeqCst);
    }
}
