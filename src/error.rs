use thiserror::Error;

/// Transport-level errors from the metadata/file/annotation fetch service.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    /// The server answered with a non-success status
    #[error("HTTP {status} for {path}")]
    Http { status: u16, path: String },

    /// Network or connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Resource not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Response body could not be interpreted
    #[error("Malformed response: {0}")]
    Parse(String),

    /// The request was abandoned because a newer selection superseded it
    #[error("Request cancelled")]
    Cancelled,
}

/// Failure conditions of the viewer core.
///
/// Fetch and decode failures are produced by the resolution pipeline and
/// reported to the user exactly once, by the composition controller.
/// `InvalidArgument` is a collaborator misuse and is returned to the caller
/// without going through the alert sink.
#[derive(Debug, Clone, Error)]
pub enum ViewerError {
    /// A remote lookup (item, files, tile geometry, annotation) failed
    #[error("Failed to fetch {what}: {source}")]
    MetadataFetchFailed {
        what: String,
        #[source]
        source: FetchError,
    },

    /// A plain item has no file with an `image/*` media type
    #[error("No renderable image file found in item {item_id}")]
    NoRenderableImage { item_id: String },

    /// The selected image binary could not be decoded
    #[error("Could not load image {file_id}: {message}")]
    ImageDecodeFailed { file_id: String, message: String },

    /// A required construction parameter is missing or malformed
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The resolution was invalidated by a newer selection
    #[error("Resolution superseded by a newer selection")]
    Superseded,
}

impl ViewerError {
    /// Build a `MetadataFetchFailed`, folding cancellation into `Superseded`.
    pub fn fetch(what: impl Into<String>, source: FetchError) -> Self {
        match source {
            FetchError::Cancelled => ViewerError::Superseded,
            source => ViewerError::MetadataFetchFailed {
                what: what.into(),
                source,
            },
        }
    }

    /// Whether this failure should reach the user through the alert sink.
    pub fn is_reportable(&self) -> bool {
        !matches!(
            self,
            ViewerError::Superseded | ViewerError::InvalidArgument(_)
        )
    }

    /// User-facing alert text.
    pub fn alert_text(&self) -> &'static str {
        "Could not render item as an image"
    }
}
