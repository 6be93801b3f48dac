//! REST client tests against an in-process HTTP server.

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use slide_viewer::{
    Collaborators, FetchError, HeadlessAnnotationList, HeadlessBackend, HeadlessHost,
    HeadlessOverlayBackend, HeadlessSelection, Imagery, ItemKind, LogAlertSink, MetadataService,
    RestClient, ViewerConfig, Visualization, WorldBounds,
};

use super::test_utils::png_bytes;

const TOKEN: &str = "secret-token";

// =============================================================================
// Test Server
// =============================================================================

async fn item(Path(id): Path<String>) -> Response {
    match id.as_str() {
        "slide" => Json(json!({
            "_id": "slide",
            "name": "slide.svs",
            "largeImage": {"fileId": "f0"}
        }))
        .into_response(),
        "photo" => Json(json!({"_id": "photo", "name": "photo.png"})).into_response(),
        "garbled" => (StatusCode::OK, "this is not json").into_response(),
        "boom" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn tiles(Path(id): Path<String>) -> Response {
    if id != "slide" {
        return StatusCode::BAD_REQUEST.into_response();
    }
    Json(json!({
        "levels": 6,
        "tileWidth": 256,
        "tileHeight": 256,
        "sizeX": 12000,
        "sizeY": 9000
    }))
    .into_response()
}

async fn files(Path(_id): Path<String>, Query(query): Query<HashMap<String, String>>) -> Json<Value> {
    let limit = query
        .get("limit")
        .and_then(|limit| limit.parse::<usize>().ok())
        .unwrap_or(50);

    let all = vec![
        json!({"_id": "f1", "name": "photo.png", "mimeType": "image/png"}),
        json!({"_id": "f2", "name": "notes.txt", "mimeType": "text/plain"}),
    ];
    Json(Value::Array(all.into_iter().take(limit).collect()))
}

async fn download(Path(id): Path<String>) -> Response {
    if id != "f1" {
        return StatusCode::NOT_FOUND.into_response();
    }
    ([(header::CONTENT_TYPE, "image/png")], png_bytes(640, 480)).into_response()
}

async fn annotation(Path(id): Path<String>, headers: HeaderMap) -> Response {
    let authorized = headers
        .get("Girder-Token")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|token| token == TOKEN);
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }

    Json(json!({
        "_id": id,
        "annotation": {
            "name": "regions",
            "elements": [
                {"type": "polyline", "points": [[0, 0, 0], [10, 10, 0]], "closed": true}
            ]
        }
    }))
    .into_response()
}

async fn version() -> Json<Value> {
    Json(json!({"release": "3.2.0"}))
}

fn router() -> Router {
    Router::new()
        .route("/api/v1/item/{id}", get(item))
        .route("/api/v1/item/{id}/tiles", get(tiles))
        .route("/api/v1/item/{id}/files", get(files))
        .route("/api/v1/file/{id}/download", get(download))
        .route("/api/v1/annotation/{id}", get(annotation))
        .route("/api/v1/system/version", get(version))
}

/// Serve the test API on an ephemeral port and return its API root.
async fn spawn_server() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router()).await.unwrap();
    });
    format!("http://{}/api/v1/", addr)
}

// =============================================================================
// Client Tests
// =============================================================================

#[tokio::test]
async fn test_get_item_detects_tiled() {
    let client = RestClient::new(&spawn_server().await).unwrap();

    let slide = client.get_item("slide").await.unwrap();
    assert_eq!(slide.kind(), ItemKind::Tiled);
    assert_eq!(slide.name, "slide.svs");

    let photo = client.get_item("photo").await.unwrap();
    assert_eq!(photo.kind(), ItemKind::Plain);
}

#[tokio::test]
async fn test_get_tiles() {
    let client = RestClient::new(&spawn_server().await).unwrap();

    let tiles = client.get_tiles("slide").await.unwrap();
    assert_eq!(tiles.levels, 6);
    assert_eq!(tiles.size_x, Some(12000));
    assert_eq!(tiles.size_y, Some(9000));
}

#[tokio::test]
async fn test_list_files_sends_limit() {
    let client = RestClient::new(&spawn_server().await).unwrap();

    let one = client.list_files("photo", 1).await.unwrap();
    assert_eq!(one.len(), 1);
    assert!(one[0].is_image());

    let all = client.list_files("photo", 10).await.unwrap();
    assert_eq!(all.len(), 2);
}

#[tokio::test]
async fn test_download_file_bytes() {
    let client = RestClient::new(&spawn_server().await).unwrap();

    let data = client.download_file("f1").await.unwrap();
    assert_eq!(&data[..8], b"\x89PNG\r\n\x1a\n");
}

#[tokio::test]
async fn test_error_mapping() {
    let client = RestClient::new(&spawn_server().await).unwrap();

    assert!(matches!(
        client.get_item("missing").await,
        Err(FetchError::NotFound(_))
    ));
    assert!(matches!(
        client.get_item("boom").await,
        Err(FetchError::Http { status: 500, .. })
    ));
    assert!(matches!(
        client.get_item("garbled").await,
        Err(FetchError::Parse(_))
    ));
}

#[tokio::test]
async fn test_token_header() {
    let root = spawn_server().await;

    let anonymous = RestClient::new(&root).unwrap();
    assert!(matches!(
        anonymous.get_annotation("ann1").await,
        Err(FetchError::Http { status: 401, .. })
    ));

    let client = RestClient::new(&root).unwrap().with_token(TOKEN);
    let doc = client.get_annotation("ann1").await.unwrap();
    assert_eq!(doc.id, "ann1");
    assert_eq!(doc.annotation.elements[0].kind, "polyline");
}

#[tokio::test]
async fn test_server_version() {
    let client = RestClient::new(&spawn_server().await).unwrap();
    let version = client.server_version().await.unwrap();
    assert_eq!(version["release"], "3.2.0");
}

#[tokio::test]
async fn test_connection_refused() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = RestClient::new(&format!("http://{}/api/v1", addr)).unwrap();
    assert!(matches!(
        client.get_item("slide").await,
        Err(FetchError::Connection(_))
    ));
}

// =============================================================================
// End to End
// =============================================================================

fn viewer(root: &str) -> (Visualization<HeadlessBackend, RestClient>, Arc<LogAlertSink>) {
    let alerts = Arc::new(LogAlertSink::new());
    let collaborators = Collaborators {
        host: Arc::new(HeadlessHost::new(800, 600)),
        selection: Arc::new(HeadlessSelection::new()),
        annotations: Arc::new(HeadlessAnnotationList::new()),
        alerts: alerts.clone(),
        overlay_backend: Arc::new(HeadlessOverlayBackend::new()),
    };
    let viewer = Visualization::new(
        HeadlessBackend::new(),
        Arc::new(RestClient::new(root).unwrap()),
        collaborators,
        ViewerConfig::default(),
    )
    .unwrap();
    (viewer, alerts)
}

#[tokio::test]
async fn test_viewer_over_rest_plain_item() {
    let root = spawn_server().await;
    let (viewer, alerts) = viewer(&root);

    let imagery = viewer.select("photo").await.unwrap();

    let Imagery::Image(layer) = imagery else {
        panic!("expected an image layer");
    };
    assert_eq!(layer.bounds, WorldBounds::extent(640.0, 480.0));
    assert!(layer.quad.image.ends_with("/api/v1/file/f1/download"));
    assert!(alerts.alerts().is_empty());
}

#[tokio::test]
async fn test_viewer_over_rest_tiled_item() {
    let root = spawn_server().await;
    let (viewer, _) = viewer(&root);

    let imagery = viewer.select("slide").await.unwrap();

    let Imagery::Tiles(layer) = imagery else {
        panic!("expected a tile layer");
    };
    assert_eq!(layer.max_level, 6);
    assert_eq!(layer.bounds(), WorldBounds::extent(11999.0, 8999.0));
    assert!(layer
        .tile_url(slide_viewer::TileIndex { level: 2, x: 1, y: 3 })
        .ends_with("/api/v1/item/slide/tiles/zxy/2/1/3"));
}
