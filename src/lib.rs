//! # Slide Viewer
//!
//! Core of an image viewer for server-held items: resolves a selected item
//! into a single imagery layer (a tile pyramid or one decoded image),
//! manages the rendering surface that shows it, and keeps annotation
//! overlays registered to the imagery as the user pans and zooms.
//!
//! ## Features
//!
//! - **Two-branch resolution**: tiled items become tile layers, plain items
//!   are measured by decoding their first image file
//! - **Cancellable selection**: a new selection aborts the previous one's
//!   in-flight requests; stale results never reach the surface
//! - **Single active imagery**: every new layer replaces the surface and
//!   everything attached to it
//! - **Shared viewport**: one observable transform drives every overlay
//!
//! ## Architecture
//!
//! - [`geometry`] - World bounds and the vertical-axis convention
//! - [`viewport`] - Observable overlay viewport
//! - [`surface`] - Rendering surface manager and backend traits
//! - [`layer`] - Image and tile layers
//! - [`fetch`] - Metadata service trait, REST client, cancellation token
//! - [`resolve`] - Item resolution pipeline
//! - [`overlay`] - Annotation overlay manager
//! - [`host`] - Collaborator contracts and headless implementations
//! - [`controller`] - Composition controller
//! - [`config`] - Library and CLI configuration
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use slide_viewer::{
//!     Collaborators, HeadlessAnnotationList, HeadlessBackend, HeadlessHost,
//!     HeadlessOverlayBackend, HeadlessSelection, LogAlertSink, RestClient, ViewerConfig,
//!     Visualization,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let service = Arc::new(RestClient::new("https://data.example.org/api/v1")?);
//!     let collaborators = Collaborators {
//!         host: Arc::new(HeadlessHost::new(1024, 768)),
//!         selection: Arc::new(HeadlessSelection::new()),
//!         annotations: Arc::new(HeadlessAnnotationList::new()),
//!         alerts: Arc::new(LogAlertSink::new()),
//!         overlay_backend: Arc::new(HeadlessOverlayBackend::new()),
//!     };
//!
//!     let viewer = Visualization::new(
//!         HeadlessBackend::new(),
//!         service,
//!         collaborators,
//!         ViewerConfig::default(),
//!     )?;
//!     viewer.render().await;
//!     let imagery = viewer.select("5f0c8a2e9b1d4c0012345678").await?;
//!     println!("{:?}", imagery);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod controller;
pub mod error;
pub mod fetch;
pub mod geometry;
pub mod host;
pub mod layer;
pub mod overlay;
pub mod resolve;
pub mod surface;
pub mod viewport;

// Re-export commonly used types
pub use config::{CheckConfig, Cli, Command, Renderer, RendererConfig, ResolveConfig, ViewerConfig};
pub use controller::{Collaborators, ToggleOutcome, ViewerState, Visualization};
pub use error::{FetchError, ViewerError};
pub use fetch::{
    AnnotationBody, AnnotationDocument, AnnotationElement, FileEntry, ItemKind, MetadataService,
    ResolutionToken, RestClient, SourceItem, TileGeometry,
};
pub use geometry::{AxisConvention, Point, ViewBounds, WorldBounds};
pub use host::{
    Alert, AlertSink, AnnotationList, ElementId, HeadlessAnnotationList, HeadlessHost,
    HeadlessSelection, LogAlertSink, SelectionControl, Severity, ViewHost,
};
pub use layer::{
    estimate_size, ImageLayer, Imagery, LayerSpec, Quad, TileIndex, TileLayer, TileLayerOptions,
    TileRounding, TileUrl,
};
pub use overlay::{
    AnnotationModel, HeadlessOverlayBackend, OverlayBackend, OverlayManager, OverlayRenderer,
    OverlayStats, ToggleAction,
};
pub use resolve::{ItemResolver, ResolvedImagery};
pub use surface::{
    HeadlessBackend, HeadlessHandle, LayerHandle, NodeId, RenderBackend, RenderSurface,
    SurfaceManager, SurfaceRecord, SurfaceSpec,
};
pub use viewport::{Viewport, ViewportState, ViewportUpdate, ViewportWatch};
