//! Item resolution pipeline.
//!
//! Turns a [`SourceItem`] into a description of the imagery to attach. The
//! pipeline branches once, on whether the item carries pyramid metadata:
//!
//! ```text
//!                     SourceItem
//!                         │
//!            ┌────────────┴────────────┐
//!            ▼ tiled                   ▼ plain
//!      get_tiles(id)           list_files(id, limit)
//!            │                         │ first image/*
//!            │                         ▼
//!            │                 download_file(file)
//!            │                         │
//!            │                         ▼
//!            │                  decode → (w, h)
//!            ▼                         ▼
//!  ResolvedImagery::Tiles     ResolvedImagery::Image
//! ```
//!
//! Steps within one resolution run strictly in sequence. Every fetch goes
//! through the caller's [`ResolutionToken`], so a superseded resolution stops
//! at its next suspension point with [`ViewerError::Superseded`].
//!
//! The resolver never touches the surface and never reports to the user; the
//! controller does both with the result.

mod decode;

use std::sync::Arc;

use tracing::debug;

use crate::config::ViewerConfig;
use crate::error::ViewerError;
use crate::fetch::{ItemKind, MetadataService, ResolutionToken, SourceItem};
use crate::geometry::WorldBounds;
use crate::layer::{TileLayerOptions, TileUrl};

pub use decode::{decode_dimensions, measure};

/// Imagery an item resolved to, ready to hand to the layer factory.
#[derive(Debug, Clone)]
pub enum ResolvedImagery {
    /// A single decoded image
    Image {
        file_id: String,
        url: String,
        bounds: WorldBounds,
    },
    /// A tile pyramid
    Tiles(TileLayerOptions),
}

/// Resolves items against a metadata service.
pub struct ItemResolver<M: MetadataService> {
    service: Arc<M>,
    file_lookup_limit: u32,
    use_credentials: bool,
}

impl<M: MetadataService> ItemResolver<M> {
    pub fn new(service: Arc<M>, config: &ViewerConfig) -> Self {
        Self {
            service,
            file_lookup_limit: config.file_lookup_limit,
            use_credentials: config.use_credentials,
        }
    }

    pub fn service(&self) -> &Arc<M> {
        &self.service
    }

    /// Fetch the record of the selected item.
    pub async fn fetch_item(
        &self,
        item_id: &str,
        token: &ResolutionToken,
    ) -> Result<SourceItem, ViewerError> {
        token
            .run(self.service.get_item(item_id))
            .await
            .map_err(|e| ViewerError::fetch(format!("item {}", item_id), e))
    }

    /// Resolve `item` into attachable imagery.
    pub async fn resolve(
        &self,
        item: &SourceItem,
        token: &ResolutionToken,
    ) -> Result<ResolvedImagery, ViewerError> {
        match item.kind() {
            ItemKind::Tiled => self.resolve_tiled(item, token).await,
            ItemKind::Plain => self.resolve_plain(item, token).await,
        }
    }

    async fn resolve_tiled(
        &self,
        item: &SourceItem,
        token: &ResolutionToken,
    ) -> Result<ResolvedImagery, ViewerError> {
        let tiles = token
            .run(self.service.get_tiles(&item.id))
            .await
            .map_err(|e| ViewerError::fetch(format!("tiles for item {}", item.id), e))?;

        debug!(
            "Item {} is tiled: {} levels, {}x{} tiles",
            item.id, tiles.levels, tiles.tile_width, tiles.tile_height
        );

        let opts = TileLayerOptions::with_url(TileUrl::Template(
            self.service.tile_url_template(&item.id),
        ))
        .max_level(tiles.levels)
        .tile_size(tiles.tile_width, tiles.tile_height)
        .size(tiles.size_x, tiles.size_y)
        .use_credentials(self.use_credentials);

        Ok(ResolvedImagery::Tiles(opts))
    }

    async fn resolve_plain(
        &self,
        item: &SourceItem,
        token: &ResolutionToken,
    ) -> Result<ResolvedImagery, ViewerError> {
        let files = token
            .run(self.service.list_files(&item.id, self.file_lookup_limit))
            .await
            .map_err(|e| ViewerError::fetch(format!("files of item {}", item.id), e))?;

        let file = files
            .into_iter()
            .find(|file| file.is_image())
            .ok_or_else(|| ViewerError::NoRenderableImage {
                item_id: item.id.clone(),
            })?;

        debug!(
            "Item {} is plain, using file {} ({:?})",
            item.id, file.id, file.mime_type
        );

        let data = token
            .run(self.service.download_file(&file.id))
            .await
            .map_err(|e| ViewerError::fetch(format!("file {}", file.id), e))?;

        let (width, height) = measure(&file.id, data).await?;
        if token.is_cancelled() {
            return Err(ViewerError::Superseded);
        }

        Ok(ResolvedImagery::Image {
            url: self.service.file_download_url(&file.id),
            bounds: WorldBounds::extent(f64::from(width), f64::from(height)),
            file_id: file.id,
        })
    }
}
