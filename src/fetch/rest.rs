//! REST implementation of the metadata service.
//!
//! Endpoints, relative to the API root:
//!
//! ```text
//! GET item/{id}                 - item record
//! GET item/{id}/tiles           - pyramid geometry of a tiled item
//! GET item/{id}/files?limit=N   - files attached to an item
//! GET file/{id}/download        - file bytes
//! GET annotation/{id}           - annotation payload
//! GET system/version            - server version (connectivity check)
//! ```

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::FetchError;

use super::types::{AnnotationDocument, FileEntry, SourceItem, TileGeometry};
use super::MetadataService;

/// Header carrying the authentication token.
const TOKEN_HEADER: &str = "Girder-Token";

const CONNECT_TIMEOUT_SECS: u64 = 10;

/// Metadata service backed by a REST API.
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_root: String,
    token: Option<String>,
}

impl RestClient {
    /// Create a client for the API rooted at `api_root`.
    ///
    /// No request timeout is applied; slow requests are abandoned through
    /// cancellation instead.
    pub fn new(api_root: &str) -> Result<Self, FetchError> {
        let root = url::Url::parse(api_root)
            .map_err(|e| FetchError::Connection(format!("invalid API root '{}': {}", api_root, e)))?;

        let http = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        Ok(Self {
            http,
            api_root: root.as_str().trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// Attach an authentication token to every request.
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn api_root(&self) -> &str {
        &self.api_root
    }

    /// Fetch the server's version record. Used to check connectivity.
    pub async fn server_version(&self) -> Result<serde_json::Value, FetchError> {
        self.get_json("system/version", &[]).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.api_root, path)
    }

    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<reqwest::Response, FetchError> {
        debug!("GET {}", path);

        let mut request = self.http.get(self.url(path)).query(query);
        if let Some(ref token) = self.token {
            request = request.header(TOKEN_HEADER, token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Http {
                status: status.as_u16(),
                path: path.to_string(),
            });
        }

        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let body = self
            .get(path, query)
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Parse(format!("{}: {}", path, e)))
    }
}

#[async_trait]
impl MetadataService for RestClient {
    async fn get_item(&self, item_id: &str) -> Result<SourceItem, FetchError> {
        self.get_json(&format!("item/{}", urlencoding::encode(item_id)), &[])
            .await
    }

    async fn get_tiles(&self, item_id: &str) -> Result<TileGeometry, FetchError> {
        self.get_json(&format!("item/{}/tiles", urlencoding::encode(item_id)), &[])
            .await
    }

    async fn list_files(&self, item_id: &str, limit: u32) -> Result<Vec<FileEntry>, FetchError> {
        self.get_json(
            &format!("item/{}/files", urlencoding::encode(item_id)),
            &[("limit", limit.to_string())],
        )
        .await
    }

    async fn download_file(&self, file_id: &str) -> Result<Bytes, FetchError> {
        self.get(&format!("file/{}/download", urlencoding::encode(file_id)), &[])
            .await?
            .bytes()
            .await
            .map_err(|e| FetchError::Connection(e.to_string()))
    }

    async fn get_annotation(&self, annotation_id: &str) -> Result<AnnotationDocument, FetchError> {
        self.get_json(
            &format!("annotation/{}", urlencoding::encode(annotation_id)),
            &[],
        )
        .await
    }

    fn tile_url_template(&self, item_id: &str) -> String {
        self.url(&format!(
            "item/{}/tiles/zxy/{{z}}/{{x}}/{{y}}",
            urlencoding::encode(item_id)
        ))
    }

    fn file_download_url(&self, file_id: &str) -> String {
        self.url(&format!("file/{}/download", urlencoding::encode(file_id)))
    }
}
