//! Metadata, file and annotation fetch service.
//!
//! The viewer never talks to the network directly. Everything it needs from
//! the server goes through the [`MetadataService`] trait:
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │          ItemResolver / Controller      │
//! └────────────────────┬────────────────────┘
//!                      │  ResolutionToken::run(...)
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │         MetadataService Trait           │
//! │  item · tiles · files · file bytes ·    │
//! │  annotation                             │
//! └────────────────────┬────────────────────┘
//!                      │
//!                      ▼
//! ┌─────────────────────────────────────────┐
//! │     RestClient (reqwest, REST API)      │
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Cancellation
//!
//! Every fetch is issued through [`ResolutionToken::run`]. Cancelling the
//! token drops the pending request future, which aborts the HTTP request in
//! flight; callers observe [`FetchError::Cancelled`](crate::error::FetchError).

mod rest;
mod token;
mod types;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::FetchError;

pub use rest::RestClient;
pub use token::ResolutionToken;
pub use types::{
    AnnotationBody, AnnotationDocument, AnnotationElement, FileEntry, ItemKind, SourceItem,
    TileGeometry,
};

/// Request-by-id access to server-held items.
#[async_trait]
pub trait MetadataService: Send + Sync {
    /// Fetch the item record.
    async fn get_item(&self, item_id: &str) -> Result<SourceItem, FetchError>;

    /// Fetch the pyramid geometry of a tiled item.
    async fn get_tiles(&self, item_id: &str) -> Result<TileGeometry, FetchError>;

    /// List at most `limit` files attached to an item.
    async fn list_files(&self, item_id: &str, limit: u32) -> Result<Vec<FileEntry>, FetchError>;

    /// Download a file's bytes.
    async fn download_file(&self, file_id: &str) -> Result<Bytes, FetchError>;

    /// Fetch an annotation with its geometry and style.
    async fn get_annotation(&self, annotation_id: &str) -> Result<AnnotationDocument, FetchError>;

    /// Tile URL template for an item, with `{z}`, `{x}` and `{y}` placeholders.
    fn tile_url_template(&self, item_id: &str) -> String;

    /// URL the rendering surface loads a plain image from.
    fn file_download_url(&self, file_id: &str) -> String;
}
