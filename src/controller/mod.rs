//! Composition controller.
//!
//! [`Visualization`] owns one viewer instance: the surface manager, the
//! overlay manager, the shared viewport, and the current selection. It moves
//! through a small state machine, one source item at a time:
//!
//! ```text
//!            select(id)                  resolved + attached
//!   Idle ───────────────▶ Resolving ───────────────────────▶ Ready
//!     ▲                     │   ▲                              │
//!     │                     │   └──────── select(id) ──────────┘
//!     │         failure     ▼
//!     └──────────────── Failed ──── select(id) ──▶ Resolving
//! ```
//!
//! Every selection first cancels the previous selection's
//! [`ResolutionToken`], then resets overlays and destroys the surface. A
//! resolution only attaches its imagery if its token is still current when
//! it completes, so a slow, stale resolution can never overwrite a newer one.
//!
//! Failures are reported exactly once, here: logged, raised on the alert
//! sink, and signalled to the selection control.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::config::ViewerConfig;
use crate::error::{FetchError, ViewerError};
use crate::fetch::{ItemKind, MetadataService, ResolutionToken};
use crate::host::{Alert, AlertSink, AnnotationList, SelectionControl, ViewHost};
use crate::layer::Imagery;
use crate::overlay::{AnnotationModel, OverlayBackend, OverlayManager, ToggleAction};
use crate::resolve::{ItemResolver, ResolvedImagery};
use crate::surface::{RenderBackend, SurfaceManager};
use crate::viewport::{Viewport, ViewportUpdate};

// =============================================================================
// Public Types
// =============================================================================

/// External collaborators of one viewer instance.
#[derive(Clone)]
pub struct Collaborators {
    pub host: Arc<dyn ViewHost>,
    pub selection: Arc<dyn SelectionControl>,
    pub annotations: Arc<dyn AnnotationList>,
    pub alerts: Arc<dyn AlertSink>,
    pub overlay_backend: Arc<dyn OverlayBackend>,
}

/// Where the viewer is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewerState {
    /// Nothing selected yet, or torn down
    Idle,
    /// A resolution is in flight
    Resolving { item_id: String },
    /// One imagery layer is attached
    Ready { item_id: String, kind: ItemKind },
    /// The last resolution failed; no imagery is attached
    Failed { item_id: String },
}

/// Result of an annotation toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// An overlay was fetched and added
    Added,
    /// An overlay was removed
    Removed,
    /// No overlay was added or removed
    Unchanged,
    /// The fetch failed and the displayed flag was reverted
    Reverted,
}

// =============================================================================
// Session
// =============================================================================

/// Mutable state, guarded by one lock.
struct Session<B: RenderBackend> {
    surface: SurfaceManager<B>,
    overlays: OverlayManager,
    state: ViewerState,
    token: ResolutionToken,
    imagery: Option<Imagery>,
}

impl<B: RenderBackend> Session<B> {
    fn is_current(&self, token: &ResolutionToken) -> bool {
        self.token.same_as(token) && !token.is_cancelled()
    }

    fn reset(&mut self) {
        self.overlays.reset_all();
        self.surface.destroy();
        self.imagery = None;
    }

    fn attach(&mut self, resolved: ResolvedImagery) -> Result<Imagery, ViewerError> {
        match resolved {
            ResolvedImagery::Image { url, bounds, .. } => {
                Ok(Imagery::Image(self.surface.add_image_layer(&url, &bounds)))
            }
            ResolvedImagery::Tiles(opts) => self.surface.add_tile_layer(opts).map(Imagery::Tiles),
        }
    }

    fn resize(&mut self) {
        let (width, height) = self.surface.container_size();
        self.surface
            .viewport()
            .set(ViewportUpdate::size(width, height));
        self.overlays.resize_elements();
        self.surface.sync_viewport();
    }
}

// =============================================================================
// Visualization
// =============================================================================

/// One viewer instance.
pub struct Visualization<B: RenderBackend, M: MetadataService> {
    config: ViewerConfig,
    viewport: Viewport,
    resolver: ItemResolver<M>,
    collaborators: Collaborators,
    session: Mutex<Session<B>>,
    destroyed: AtomicBool,
}

impl<B, M> Visualization<B, M>
where
    B: RenderBackend,
    M: MetadataService,
{
    /// Build a viewer and size its viewport to the container.
    pub fn new(
        backend: B,
        service: Arc<M>,
        collaborators: Collaborators,
        config: ViewerConfig,
    ) -> Result<Self, ViewerError> {
        config.validate().map_err(ViewerError::InvalidArgument)?;

        let viewport = Viewport::new();
        let surface = SurfaceManager::new(
            backend,
            config.renderer,
            viewport.clone(),
            collaborators.host.clone(),
            config.default_container_size,
        );
        let overlays = OverlayManager::new(
            collaborators.host.clone(),
            collaborators.overlay_backend.clone(),
            viewport.clone(),
        );

        let mut session = Session {
            surface,
            overlays,
            state: ViewerState::Idle,
            token: ResolutionToken::new(),
            imagery: None,
        };
        session.resize();

        Ok(Self {
            resolver: ItemResolver::new(service, &config),
            config,
            viewport,
            collaborators,
            session: Mutex::new(session),
            destroyed: AtomicBool::new(false),
        })
    }

    /// Render the layout and the selection control, then remount any live
    /// surface.
    pub async fn render(&self) {
        self.collaborators.host.render_layout();
        self.collaborators.selection.render();
        self.session.lock().await.surface.attach_to_container();
    }

    /// Select a source item and attach its imagery.
    ///
    /// Returns [`ViewerError::Superseded`] when a newer selection (or
    /// teardown) overtook this one; that outcome is never reported to the
    /// user. Fetch and decode failures are reported before they are
    /// returned.
    pub async fn select(&self, item_id: &str) -> Result<Imagery, ViewerError> {
        if item_id.is_empty() {
            return Err(ViewerError::InvalidArgument(
                "item id must not be empty".to_string(),
            ));
        }
        if self.is_destroyed() {
            return Err(ViewerError::InvalidArgument(
                "viewer has been destroyed".to_string(),
            ));
        }

        let token = ResolutionToken::new();
        {
            let mut session = self.session.lock().await;
            session.token.cancel();
            session.token = token.clone();
            session.reset();
            session.state = ViewerState::Resolving {
                item_id: item_id.to_string(),
            };
        }
        debug!("Resolving item {}", item_id);

        let resolved = self.resolve(item_id, &token).await;

        let mut session = self.session.lock().await;
        if !session.is_current(&token) {
            warn!("Discarding superseded resolution of item {}", item_id);
            return Err(ViewerError::Superseded);
        }

        match resolved.and_then(|(kind, resolved)| Ok((kind, session.attach(resolved)?))) {
            Ok((kind, imagery)) => {
                info!("Item {} ready ({:?})", item_id, kind);
                session.state = ViewerState::Ready {
                    item_id: item_id.to_string(),
                    kind,
                };
                session.imagery = Some(imagery.clone());
                Ok(imagery)
            }
            Err(err) => {
                session.state = ViewerState::Failed {
                    item_id: item_id.to_string(),
                };
                if err.is_reportable() {
                    self.report(item_id, &err);
                }
                Err(err)
            }
        }
    }

    async fn resolve(
        &self,
        item_id: &str,
        token: &ResolutionToken,
    ) -> Result<(ItemKind, ResolvedImagery), ViewerError> {
        let item = self.resolver.fetch_item(item_id, token).await?;

        {
            let mut session = self.session.lock().await;
            if !session.is_current(token) {
                return Err(ViewerError::Superseded);
            }
            session.overlays.reset_all();
            self.collaborators.annotations.set_item(&item);
        }

        let resolved = self.resolver.resolve(&item, token).await?;
        Ok((item.kind(), resolved))
    }

    fn report(&self, item_id: &str, err: &ViewerError) {
        error!("Could not render item {}: {}", item_id, err);
        self.collaborators
            .alerts
            .alert(Alert::danger(err.alert_text(), self.config.alert_timeout));
        self.collaborators.selection.invalid();
    }

    /// React to a displayed-flag change from the annotation list.
    ///
    /// Only a `Ready` viewer takes toggles: while resolving, the annotation
    /// list may still describe the previous item. A failed fetch reverts the
    /// flag on the annotation list so it never reports an annotation as
    /// displayed without an overlay.
    pub async fn toggle_annotation(&self, model: &AnnotationModel) -> ToggleOutcome {
        let (action, token) = {
            let mut session = self.session.lock().await;
            if !matches!(session.state, ViewerState::Ready { .. }) {
                debug!("Ignoring toggle of annotation {} outside Ready", model.id);
                return ToggleOutcome::Unchanged;
            }
            (session.overlays.toggle(model), session.token.clone())
        };

        let id = match action {
            ToggleAction::Removed => return ToggleOutcome::Removed,
            ToggleAction::Unchanged => return ToggleOutcome::Unchanged,
            ToggleAction::Fetch(id) => id,
        };

        let fetched = token
            .run(self.resolver.service().get_annotation(&id))
            .await;

        let mut session = self.session.lock().await;
        match fetched {
            Ok(document) => {
                if session.is_current(&token) && session.overlays.complete_fetch(&document) {
                    ToggleOutcome::Added
                } else {
                    ToggleOutcome::Unchanged
                }
            }
            Err(FetchError::Cancelled) => ToggleOutcome::Unchanged,
            Err(err) => {
                if !session.is_current(&token) || !session.overlays.is_displayed(&id) {
                    return ToggleOutcome::Unchanged;
                }
                warn!("Failed to fetch annotation {}: {}", id, err);
                session.overlays.fail_fetch(&id);
                self.collaborators.annotations.set_displayed(&id, false);
                ToggleOutcome::Reverted
            }
        }
    }

    /// Container resized: resize the viewport and overlays, then re-derive
    /// the transform from the live surface, if any.
    pub async fn on_resize(&self) {
        if self.is_destroyed() {
            return;
        }
        self.session.lock().await.resize();
    }

    /// Tear the viewer down. Safe to call more than once.
    pub async fn destroy(&self) {
        if self.destroyed.swap(true, Ordering::SeqCst) {
            return;
        }
        self.collaborators.host.detach_resize_listener();

        {
            let mut session = self.session.lock().await;
            session.token.cancel();
            session.reset();
            session.state = ViewerState::Idle;
        }

        self.collaborators.host.clear();
        self.collaborators.selection.destroy();
        debug!("Viewer destroyed");
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub async fn state(&self) -> ViewerState {
        self.session.lock().await.state.clone()
    }

    /// Imagery attached by the current selection.
    pub async fn imagery(&self) -> Option<Imagery> {
        self.session.lock().await.imagery.clone()
    }

    /// Ids of the annotations currently drawn, sorted.
    pub async fn tracked_annotations(&self) -> Vec<String> {
        self.session.lock().await.overlays.tracked_ids()
    }

    /// Run `f` against the surface manager.
    pub async fn with_surface<R>(&self, f: impl FnOnce(&SurfaceManager<B>) -> R) -> R {
        f(&self.session.lock().await.surface)
    }
}
