//! Item resolution pipeline tests.

use std::sync::Arc;

use slide_viewer::{
    FileEntry, ItemResolver, ResolutionToken, ResolvedImagery, SourceItem, TileGeometry, TileUrl,
    ViewerConfig, ViewerError, WorldBounds,
};

use super::test_utils::{jpeg_bytes, pyramid, MockMetadataService};

fn resolver(service: MockMetadataService) -> (ItemResolver<MockMetadataService>, Arc<MockMetadataService>) {
    let service = Arc::new(service);
    (
        ItemResolver::new(service.clone(), &ViewerConfig::default()),
        service,
    )
}

#[tokio::test]
async fn test_plain_png_resolves_to_image_bounds() {
    let (resolver, _) = resolver(MockMetadataService::new().with_png_item("photo", 800, 600));
    let token = ResolutionToken::new();

    let item = resolver.fetch_item("photo", &token).await.unwrap();
    let resolved = resolver.resolve(&item, &token).await.unwrap();

    match resolved {
        ResolvedImagery::Image {
            file_id,
            url,
            bounds,
        } => {
            assert_eq!(file_id, "photo-file");
            assert_eq!(url, "mock://file/photo-file/download");
            assert_eq!(bounds, WorldBounds::extent(800.0, 600.0));
        }
        other => panic!("expected an image, got {:?}", other),
    }
}

#[tokio::test]
async fn test_plain_jpeg_is_measured() {
    let (resolver, _) = resolver(
        MockMetadataService::new()
            .with_plain_item("scan", vec![FileEntry::new("f1", Some("image/jpeg"))])
            .with_blob("f1", jpeg_bytes(321, 123)),
    );

    let resolved = resolver
        .resolve(&SourceItem::plain("scan"), &ResolutionToken::new())
        .await
        .unwrap();

    assert!(matches!(
        resolved,
        ResolvedImagery::Image { bounds, .. } if bounds == WorldBounds::extent(321.0, 123.0)
    ));
}

#[tokio::test]
async fn test_tiled_item_estimates_size() {
    let (resolver, _) = resolver(MockMetadataService::new().with_tiled_item("slide", pyramid(5)));

    let resolved = resolver
        .resolve(&SourceItem::tiled("slide"), &ResolutionToken::new())
        .await
        .unwrap();

    let ResolvedImagery::Tiles(opts) = resolved else {
        panic!("expected tiles");
    };
    let layer = opts.resolve().unwrap();
    assert_eq!(layer.max_level, 5);
    assert_eq!(layer.size_x, 8192);
    assert_eq!(layer.size_y, 8192);
    assert!(layer.use_credentials);
    assert_eq!(layer.bounds(), WorldBounds::extent(8191.0, 8191.0));
    match layer.url {
        TileUrl::Template(ref template) => {
            assert_eq!(template, "mock://item/slide/tiles/zxy/{z}/{x}/{y}")
        }
        TileUrl::Resolver(_) => panic!("expected a template"),
    }
}

#[tokio::test]
async fn test_tiled_item_keeps_explicit_size() {
    let (resolver, _) = resolver(MockMetadataService::new().with_tiled_item(
        "slide",
        TileGeometry {
            levels: 7,
            tile_width: 240,
            tile_height: 240,
            size_x: Some(30000),
            size_y: Some(20000),
        },
    ));

    let resolved = resolver
        .resolve(&SourceItem::tiled("slide"), &ResolutionToken::new())
        .await
        .unwrap();

    let ResolvedImagery::Tiles(opts) = resolved else {
        panic!("expected tiles");
    };
    let layer = opts.resolve().unwrap();
    assert_eq!((layer.size_x, layer.size_y), (30000, 20000));
    assert_eq!((layer.tile_width, layer.tile_height), (240, 240));
    assert_eq!(layer.bounds(), WorldBounds::extent(29999.0, 19999.0));
}

#[tokio::test]
async fn test_no_image_file_fails_without_download() {
    let (resolver, service) = resolver(MockMetadataService::new().with_plain_item(
        "docs",
        vec![FileEntry::new("f1", Some("application/pdf"))],
    ));

    let err = resolver
        .resolve(&SourceItem::plain("docs"), &ResolutionToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ViewerError::NoRenderableImage { ref item_id } if item_id == "docs"));
    assert!(!service.was_requested("download:f1").await);
}

#[tokio::test]
async fn test_file_lookup_is_bounded() {
    let (resolver, service) = resolver(
        MockMetadataService::new()
            .with_plain_item(
                "mixed",
                vec![
                    FileEntry::new("readme", Some("text/plain")),
                    FileEntry::new("photo", Some("image/png")),
                ],
            )
            .with_blob("photo", super::test_utils::png_bytes(4, 4)),
    );

    let err = resolver
        .resolve(&SourceItem::plain("mixed"), &ResolutionToken::new())
        .await
        .unwrap_err();

    // Only the first file is listed, and it is not an image.
    assert!(matches!(err, ViewerError::NoRenderableImage { .. }));
    assert!(service.was_requested("files:mixed:1").await);
}

#[tokio::test]
async fn test_undecodable_image_fails() {
    let (resolver, _) = resolver(
        MockMetadataService::new()
            .with_plain_item("bad", vec![FileEntry::new("f1", Some("image/png"))])
            .with_blob("f1", b"not really a png".to_vec()),
    );

    let err = resolver
        .resolve(&SourceItem::plain("bad"), &ResolutionToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ViewerError::ImageDecodeFailed { ref file_id, .. } if file_id == "f1"));
}

#[tokio::test]
async fn test_tile_metadata_failure() {
    let (resolver, _) = resolver(MockMetadataService::new());

    let err = resolver
        .resolve(&SourceItem::tiled("ghost"), &ResolutionToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, ViewerError::MetadataFetchFailed { .. }));
    assert!(err.is_reportable());
}

#[tokio::test]
async fn test_cancelled_token_is_superseded() {
    let (resolver, service) = resolver(MockMetadataService::new().with_png_item("photo", 8, 8));
    let token = ResolutionToken::new();
    token.cancel();

    let err = resolver.fetch_item("photo", &token).await.unwrap_err();

    assert!(matches!(err, ViewerError::Superseded));
    assert_eq!(service.request_count(), 0);
}

#[tokio::test]
async fn test_cancel_aborts_pending_fetch() {
    let (service, _gate) = MockMetadataService::new()
        .with_png_item("photo", 8, 8)
        .with_gate("photo-file");
    let (resolver, service) = resolver(service);
    let resolver = Arc::new(resolver);
    let token = ResolutionToken::new();

    let task = {
        let resolver = resolver.clone();
        let token = token.clone();
        tokio::spawn(async move {
            resolver
                .resolve(&SourceItem::plain("photo"), &token)
                .await
        })
    };

    super::test_utils::wait_for_request(&service, "download:photo-file").await;
    token.cancel();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(ViewerError::Superseded)));
}
