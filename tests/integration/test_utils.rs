//! Test utilities for integration tests.
//!
//! This module provides an in-memory metadata service with request tracking
//! and gates, image encoders, and a helper that wires a viewer to headless
//! collaborators.

use async_trait::async_trait;
use bytes::Bytes;
use image::{ImageFormat, Rgb, RgbImage};
use std::collections::HashMap;
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Notify, RwLock};

use slide_viewer::{
    AnnotationBody, AnnotationDocument, AnnotationElement, Collaborators, FetchError, FileEntry,
    HeadlessAnnotationList, HeadlessBackend, HeadlessHandle, HeadlessHost, HeadlessOverlayBackend,
    HeadlessSelection, LogAlertSink, MetadataService, SourceItem, TileGeometry, ViewerConfig,
    Visualization,
};

// =============================================================================
// Mock Metadata Service with Request Tracking
// =============================================================================

/// An in-memory metadata service that records every request.
///
/// Any id can be gated: requests touching a gated id wait until the gate is
/// opened, which lets tests hold a resolution in flight.
#[derive(Default)]
pub struct MockMetadataService {
    items: HashMap<String, SourceItem>,
    tiles: HashMap<String, TileGeometry>,
    files: HashMap<String, Vec<FileEntry>>,
    blobs: HashMap<String, Bytes>,
    annotations: HashMap<String, AnnotationDocument>,
    gates: HashMap<String, Arc<Notify>>,
    request_count: AtomicUsize,
    requests: RwLock<Vec<String>>,
}

impl MockMetadataService {
    pub fn new() -> Self {
        Self::default()
    }

    /// A tiled item with the given pyramid geometry.
    pub fn with_tiled_item(mut self, item_id: &str, tiles: TileGeometry) -> Self {
        self.items
            .insert(item_id.to_string(), SourceItem::tiled(item_id));
        self.tiles.insert(item_id.to_string(), tiles);
        self
    }

    /// A plain item with the given files.
    pub fn with_plain_item(mut self, item_id: &str, files: Vec<FileEntry>) -> Self {
        self.items
            .insert(item_id.to_string(), SourceItem::plain(item_id));
        self.files.insert(item_id.to_string(), files);
        self
    }

    /// A plain item holding one PNG of the given size.
    pub fn with_png_item(self, item_id: &str, width: u32, height: u32) -> Self {
        let file_id = format!("{}-file", item_id);
        self.with_plain_item(item_id, vec![FileEntry::new(&file_id, Some("image/png"))])
            .with_blob(&file_id, png_bytes(width, height))
    }

    pub fn with_blob(mut self, file_id: &str, data: Vec<u8>) -> Self {
        self.blobs.insert(file_id.to_string(), Bytes::from(data));
        self
    }

    pub fn with_annotation(mut self, annotation_id: &str) -> Self {
        self.annotations
            .insert(annotation_id.to_string(), annotation(annotation_id, 3));
        self
    }

    /// Hold every request touching `id` until the returned gate is notified.
    pub fn with_gate(mut self, id: &str) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.gates.insert(id.to_string(), gate.clone());
        (self, gate)
    }

    pub fn request_count(&self) -> usize {
        self.request_count.load(Ordering::SeqCst)
    }

    pub async fn get_requests(&self) -> Vec<String> {
        self.requests.read().await.clone()
    }

    pub async fn was_requested(&self, request: &str) -> bool {
        self.requests.read().await.iter().any(|r| r == request)
    }

    async fn track(&self, request: String, id: &str) {
        self.request_count.fetch_add(1, Ordering::SeqCst);
        self.requests.write().await.push(request);
        if let Some(gate) = self.gates.get(id) {
            gate.notified().await;
        }
    }
}

#[async_trait]
impl MetadataService for MockMetadataService {
    async fn get_item(&self, item_id: &str) -> Result<SourceItem, FetchError> {
        self.track(format!("item:{}", item_id), item_id).await;
        self.items
            .get(item_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("item/{}", item_id)))
    }

    async fn get_tiles(&self, item_id: &str) -> Result<TileGeometry, FetchError> {
        self.track(format!("tiles:{}", item_id), item_id).await;
        self.tiles.get(item_id).copied().ok_or(FetchError::Http {
            status: 400,
            path: format!("item/{}/tiles", item_id),
        })
    }

    async fn list_files(&self, item_id: &str, limit: u32) -> Result<Vec<FileEntry>, FetchError> {
        self.track(format!("files:{}:{}", item_id, limit), item_id).await;
        Ok(self
            .files
            .get(item_id)
            .map(|files| files.iter().take(limit as usize).cloned().collect())
            .unwrap_or_default())
    }

    async fn download_file(&self, file_id: &str) -> Result<Bytes, FetchError> {
        self.track(format!("download:{}", file_id), file_id).await;
        self.blobs
            .get(file_id)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(format!("file/{}/download", file_id)))
    }

    async fn get_annotation(&self, annotation_id: &str) -> Result<AnnotationDocument, FetchError> {
        self.track(format!("annotation:{}", annotation_id), annotation_id)
            .await;
        self.annotations
            .get(annotation_id)
            .cloned()
            .ok_or_else(|| FetchError::Connection("connection reset".to_string()))
    }

    fn tile_url_template(&self, item_id: &str) -> String {
        format!("mock://item/{}/tiles/zxy/{{z}}/{{x}}/{{y}}", item_id)
    }

    fn file_download_url(&self, file_id: &str) -> String {
        format!("mock://file/{}/download", file_id)
    }
}

// =============================================================================
// Fixtures
// =============================================================================

/// Pyramid geometry without explicit size.
pub fn pyramid(levels: u32) -> TileGeometry {
    TileGeometry {
        levels,
        tile_width: 256,
        tile_height: 256,
        size_x: None,
        size_y: None,
    }
}

/// An annotation with `shapes` rectangles.
pub fn annotation(annotation_id: &str, shapes: usize) -> AnnotationDocument {
    let elements = (0..shapes)
        .map(|i| {
            let properties = serde_json::json!({
                "center": [10 * i, 20, 0],
                "width": 5,
                "height": 5,
            });
            AnnotationElement {
                kind: "rectangle".to_string(),
                properties: properties.as_object().cloned().unwrap_or_default(),
            }
        })
        .collect();

    AnnotationDocument {
        id: annotation_id.to_string(),
        annotation: AnnotationBody {
            name: format!("annotation {}", annotation_id),
            description: None,
            elements,
        },
    }
}

/// Encode a gradient image as PNG.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Png)
}

/// Encode a gradient image as JPEG.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    encode(width, height, ImageFormat::Jpeg)
}

fn encode(width: u32, height: u32, format: ImageFormat) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    });
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, format).unwrap();
    out.into_inner()
}

// =============================================================================
// Viewer Harness
// =============================================================================

/// A viewer wired to headless collaborators, with handles to all of them.
pub struct TestViewer {
    pub viewer: Arc<Visualization<HeadlessBackend, MockMetadataService>>,
    pub service: Arc<MockMetadataService>,
    pub host: Arc<HeadlessHost>,
    pub selection: Arc<HeadlessSelection>,
    pub annotations: Arc<HeadlessAnnotationList>,
    pub alerts: Arc<LogAlertSink>,
    pub overlays: HeadlessOverlayBackend,
    pub surfaces: HeadlessHandle,
}

/// Build an 800x600 viewer over `service`.
pub fn test_viewer(service: MockMetadataService) -> TestViewer {
    test_viewer_with_size(service, 800, 600)
}

pub fn test_viewer_with_size(service: MockMetadataService, width: u32, height: u32) -> TestViewer {
    let service = Arc::new(service);
    let host = Arc::new(HeadlessHost::new(width, height));
    let selection = Arc::new(HeadlessSelection::new());
    let annotations = Arc::new(HeadlessAnnotationList::new());
    let alerts = Arc::new(LogAlertSink::new());
    let overlays = HeadlessOverlayBackend::new();
    let backend = HeadlessBackend::new();
    let surfaces = backend.handle();

    let collaborators = Collaborators {
        host: host.clone(),
        selection: selection.clone(),
        annotations: annotations.clone(),
        alerts: alerts.clone(),
        overlay_backend: Arc::new(overlays.clone()),
    };

    let viewer = Visualization::new(
        backend,
        service.clone(),
        collaborators,
        ViewerConfig::default(),
    )
    .unwrap();

    TestViewer {
        viewer: Arc::new(viewer),
        service,
        host,
        selection,
        annotations,
        alerts,
        overlays,
        surfaces,
    }
}

/// Wait until the service has seen `request`.
pub async fn wait_for_request(service: &MockMetadataService, request: &str) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !service.was_requested(request).await {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .unwrap_or_else(|_| panic!("request {} never issued", request));
}
