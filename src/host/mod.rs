//! Collaborators the viewer is embedded in.
//!
//! The viewer core owns no UI. It talks to its surroundings through these
//! traits:
//!
//! - [`ViewHost`]: the container element (size, mounting, overlay elements)
//! - [`SelectionControl`]: the widget that picks the source item
//! - [`AnnotationList`]: the list that toggles which annotations are shown
//! - [`AlertSink`]: user-facing notifications
//!
//! [`headless`] provides in-memory implementations for the command-line
//! front end and for tests.

pub mod headless;

use std::time::Duration;

use serde::Serialize;

use crate::fetch::SourceItem;
use crate::surface::NodeId;

pub use headless::{HeadlessAnnotationList, HeadlessHost, HeadlessSelection, LogAlertSink};

/// Identifier of an overlay drawing element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ElementId(pub u64);

/// Container element hosting the viewer.
pub trait ViewHost: Send + Sync {
    /// Current pixel size of the container; zero when unknown.
    fn container_size(&self) -> (u32, u32);

    /// Render the viewer layout (body, overlay container, side panels).
    fn render_layout(&self);

    /// Mount a surface node in the body, replacing previous content.
    fn mount_surface(&self, node: NodeId);

    /// Append a drawing element to the overlay container.
    fn create_overlay_element(&self, width: u32, height: u32) -> ElementId;

    /// Resize an overlay drawing element.
    fn resize_overlay_element(&self, element: ElementId, width: u32, height: u32);

    /// Remove an overlay drawing element.
    fn remove_overlay_element(&self, element: ElementId);

    /// Stop delivering container resize events.
    fn detach_resize_listener(&self);

    /// Remove all rendered content.
    fn clear(&self);
}

/// Widget used to pick the source item.
pub trait SelectionControl: Send + Sync {
    fn render(&self);

    /// Flag the current selection as unusable so the user can retry.
    fn invalid(&self);

    /// Release the control's backing state.
    fn destroy(&self);
}

/// List widget tracking which annotations are displayed.
pub trait AnnotationList: Send + Sync {
    /// Point the list at a new item.
    fn set_item(&self, item: &SourceItem);

    /// Force the displayed flag of an annotation.
    fn set_displayed(&self, annotation_id: &str, displayed: bool);
}

/// Alert severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Danger,
}

/// A user-facing notification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub text: String,
    pub severity: Severity,
    pub icon: String,
    pub timeout: Duration,
}

impl Alert {
    pub fn danger(text: impl Into<String>, timeout: Duration) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Danger,
            icon: "attention".to_string(),
            timeout,
        }
    }
}

/// Fire-and-forget sink for alerts.
pub trait AlertSink: Send + Sync {
    fn alert(&self, alert: Alert);
}
