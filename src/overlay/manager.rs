use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tracing::debug;

use crate::fetch::AnnotationDocument;
use crate::host::{ElementId, ViewHost};
use crate::viewport::Viewport;

use super::{AnnotationModel, OverlayBackend, OverlayRenderer};

/// What the caller must do after a displayed-flag change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleAction {
    /// Fetch the annotation and hand it to [`OverlayManager::complete_fetch`]
    Fetch(String),
    /// The overlay was removed
    Removed,
    /// Nothing to do
    Unchanged,
}

struct Overlay {
    element: ElementId,
    renderer: Box<dyn OverlayRenderer>,
}

/// Owner of every live annotation overlay, keyed by annotation id.
pub struct OverlayManager {
    host: Arc<dyn ViewHost>,
    backend: Arc<dyn OverlayBackend>,
    viewport: Viewport,

    overlays: HashMap<String, Overlay>,

    /// Ids the annotation list currently reports as displayed
    displayed: HashSet<String>,
}

impl OverlayManager {
    pub fn new(host: Arc<dyn ViewHost>, backend: Arc<dyn OverlayBackend>, viewport: Viewport) -> Self {
        Self {
            host,
            backend,
            viewport,
            overlays: HashMap::new(),
            displayed: HashSet::new(),
        }
    }

    /// Draw `annotation` on a new element sized to the viewport.
    ///
    /// An overlay already tracked under the same id is replaced.
    pub fn add_overlay(&mut self, annotation: &AnnotationDocument) {
        self.remove_overlay(&annotation.id);
        self.displayed.insert(annotation.id.clone());

        let state = self.viewport.get();
        let element = self.host.create_overlay_element(state.width, state.height);
        let renderer = self
            .backend
            .create(element, self.viewport.subscribe(), &annotation.annotation);

        self.overlays
            .insert(annotation.id.clone(), Overlay { element, renderer });
        self.resize_elements();

        if let Some(overlay) = self.overlays.get_mut(&annotation.id) {
            overlay.renderer.render();
        }
        debug!("Added overlay for annotation {}", annotation.id);
    }

    /// Remove the overlay tracked under `id`. No-op when absent.
    pub fn remove_overlay(&mut self, id: &str) {
        if let Some(mut overlay) = self.overlays.remove(id) {
            overlay.renderer.remove();
            self.host.remove_overlay_element(overlay.element);
            debug!("Removed overlay for annotation {}", id);
        }
    }

    /// Remove every overlay and forget the displayed set.
    pub fn reset_all(&mut self) {
        let ids: Vec<String> = self.overlays.keys().cloned().collect();
        for id in ids {
            self.remove_overlay(&id);
        }
        self.displayed.clear();
    }

    /// React to a displayed-flag change reported by the annotation list.
    pub fn toggle(&mut self, model: &AnnotationModel) -> ToggleAction {
        if model.displayed {
            self.displayed.insert(model.id.clone());
            if self.overlays.contains_key(&model.id) {
                ToggleAction::Unchanged
            } else {
                ToggleAction::Fetch(model.id.clone())
            }
        } else {
            self.displayed.remove(&model.id);
            if self.overlays.contains_key(&model.id) {
                self.remove_overlay(&model.id);
                ToggleAction::Removed
            } else {
                ToggleAction::Unchanged
            }
        }
    }

    /// Add the overlay for a fetched annotation if it is still wanted.
    ///
    /// Returns false when the annotation was hidden (or reset) while its
    /// payload was in flight, or when it is already tracked.
    pub fn complete_fetch(&mut self, annotation: &AnnotationDocument) -> bool {
        if !self.displayed.contains(&annotation.id) || self.overlays.contains_key(&annotation.id) {
            return false;
        }
        self.add_overlay(annotation);
        true
    }

    /// Forget a displayed flag whose payload could not be fetched.
    pub fn fail_fetch(&mut self, id: &str) {
        self.displayed.remove(id);
    }

    /// Size every overlay element to the viewport.
    pub fn resize_elements(&mut self) {
        let state = self.viewport.get();
        for overlay in self.overlays.values_mut() {
            self.host
                .resize_overlay_element(overlay.element, state.width, state.height);
        }
    }

    pub fn is_tracked(&self, id: &str) -> bool {
        self.overlays.contains_key(id)
    }

    pub fn is_displayed(&self, id: &str) -> bool {
        self.displayed.contains(id)
    }

    /// Tracked annotation ids, sorted.
    pub fn tracked_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.overlays.keys().cloned().collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.overlays.len()
    }

    pub fn is_empty(&self) -> bool {
        self.overlays.is_empty()
    }
}

impl Drop for OverlayManager {
    fn drop(&mut self) {
        self.reset_all();
    }
}
