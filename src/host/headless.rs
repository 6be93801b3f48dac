//! In-memory collaborators.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use tracing::{debug, warn};

use crate::fetch::SourceItem;
use crate::surface::NodeId;

use super::{Alert, AlertSink, AnnotationList, ElementId, SelectionControl, ViewHost};

// =============================================================================
// Host
// =============================================================================

/// Container of a fixed, adjustable size.
pub struct HeadlessHost {
    width: AtomicU32,
    height: AtomicU32,
    next_element: AtomicU64,
    mounted: Mutex<Option<NodeId>>,
    elements: Mutex<HashMap<ElementId, (u32, u32)>>,
    listening: AtomicBool,
    layout_renders: AtomicUsize,
}

impl HeadlessHost {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: AtomicU32::new(width),
            height: AtomicU32::new(height),
            next_element: AtomicU64::new(0),
            mounted: Mutex::new(None),
            elements: Mutex::new(HashMap::new()),
            listening: AtomicBool::new(true),
            layout_renders: AtomicUsize::new(0),
        }
    }

    /// Change the reported container size.
    pub fn set_size(&self, width: u32, height: u32) {
        self.width.store(width, Ordering::SeqCst);
        self.height.store(height, Ordering::SeqCst);
    }

    /// Node currently mounted in the body.
    pub fn mounted(&self) -> Option<NodeId> {
        *self.mounted.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Overlay elements and their pixel sizes.
    pub fn elements(&self) -> HashMap<ElementId, (u32, u32)> {
        self.elements.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn is_listening(&self) -> bool {
        self.listening.load(Ordering::SeqCst)
    }

    pub fn layout_renders(&self) -> usize {
        self.layout_renders.load(Ordering::SeqCst)
    }
}

impl ViewHost for HeadlessHost {
    fn container_size(&self) -> (u32, u32) {
        (
            self.width.load(Ordering::SeqCst),
            self.height.load(Ordering::SeqCst),
        )
    }

    fn render_layout(&self) {
        self.layout_renders.fetch_add(1, Ordering::SeqCst);
    }

    fn mount_surface(&self, node: NodeId) {
        *self.mounted.lock().unwrap_or_else(|e| e.into_inner()) = Some(node);
    }

    fn create_overlay_element(&self, width: u32, height: u32) -> ElementId {
        let element = ElementId(self.next_element.fetch_add(1, Ordering::SeqCst) + 1);
        self.elements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(element, (width, height));
        element
    }

    fn resize_overlay_element(&self, element: ElementId, width: u32, height: u32) {
        if let Some(size) = self
            .elements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get_mut(&element)
        {
            *size = (width, height);
        }
    }

    fn remove_overlay_element(&self, element: ElementId) {
        self.elements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&element);
    }

    fn detach_resize_listener(&self) {
        self.listening.store(false, Ordering::SeqCst);
    }

    fn clear(&self) {
        *self.mounted.lock().unwrap_or_else(|e| e.into_inner()) = None;
        self.elements
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

// =============================================================================
// Selection Control
// =============================================================================

/// Selection control that counts the signals it receives.
#[derive(Default)]
pub struct HeadlessSelection {
    invalid_count: AtomicUsize,
    destroyed: AtomicBool,
}

impl HeadlessSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid_count.load(Ordering::SeqCst)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

impl SelectionControl for HeadlessSelection {
    fn render(&self) {}

    fn invalid(&self) {
        self.invalid_count.fetch_add(1, Ordering::SeqCst);
    }

    fn destroy(&self) {
        self.destroyed.store(true, Ordering::SeqCst);
    }
}

// =============================================================================
// Annotation List
// =============================================================================

/// Annotation list holding the current item and forced flags.
#[derive(Default)]
pub struct HeadlessAnnotationList {
    item: Mutex<Option<SourceItem>>,
    displayed: Mutex<HashMap<String, bool>>,
}

impl HeadlessAnnotationList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn item(&self) -> Option<SourceItem> {
        self.item.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Last flag forced onto an annotation by the viewer.
    pub fn displayed(&self, annotation_id: &str) -> Option<bool> {
        self.displayed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(annotation_id)
            .copied()
    }
}

impl AnnotationList for HeadlessAnnotationList {
    fn set_item(&self, item: &SourceItem) {
        debug!("Annotation list now tracks item {}", item.id);
        *self.item.lock().unwrap_or_else(|e| e.into_inner()) = Some(item.clone());
        self.displayed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }

    fn set_displayed(&self, annotation_id: &str, displayed: bool) {
        self.displayed
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(annotation_id.to_string(), displayed);
    }
}

// =============================================================================
// Alerts
// =============================================================================

/// Alert sink that writes alerts to the log and keeps them for inspection.
#[derive(Default)]
pub struct LogAlertSink {
    alerts: Mutex<Vec<Alert>>,
}

impl LogAlertSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn alerts(&self) -> Vec<Alert> {
        self.alerts.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl AlertSink for LogAlertSink {
    fn alert(&self, alert: Alert) {
        warn!("[{:?}] {}", alert.severity, alert.text);
        self.alerts
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(alert);
    }
}
