//! Wire types returned by the metadata service.

use serde::{Deserialize, Serialize};

// =============================================================================
// Source Item
// =============================================================================

/// Kind of imagery an item holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemKind {
    /// Multi-resolution tile pyramid
    Tiled,
    /// Zero or more files, at most one of them an image
    Plain,
}

/// Reference to a server-held item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceItem {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    /// Pyramid registration, present only on tiled items
    #[serde(
        rename = "largeImage",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub large_image: Option<serde_json::Value>,
}

impl SourceItem {
    /// A plain item with the given id.
    pub fn plain(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            large_image: None,
        }
    }

    /// A tiled item with the given id.
    pub fn tiled(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            large_image: Some(serde_json::json!({})),
        }
    }

    pub fn kind(&self) -> ItemKind {
        if self.large_image.is_some() {
            ItemKind::Tiled
        } else {
            ItemKind::Plain
        }
    }
}

// =============================================================================
// Files
// =============================================================================

/// One file attached to a plain item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    #[serde(rename = "_id")]
    pub id: String,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub mime_type: Option<String>,
}

impl FileEntry {
    pub fn new(id: impl Into<String>, mime_type: Option<&str>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            mime_type: mime_type.map(str::to_string),
        }
    }

    /// True when the declared media type is `image/*`.
    pub fn is_image(&self) -> bool {
        self.mime_type
            .as_deref()
            .is_some_and(|mime| mime.starts_with("image/"))
    }
}

// =============================================================================
// Tile Geometry
// =============================================================================

/// Pyramid geometry of a tiled item.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileGeometry {
    /// Number of pyramid levels
    pub levels: u32,
    pub tile_width: u32,
    pub tile_height: u32,
    /// Full-resolution width in pixels, when known
    #[serde(default)]
    pub size_x: Option<u64>,
    /// Full-resolution height in pixels, when known
    #[serde(default)]
    pub size_y: Option<u64>,
}

// =============================================================================
// Annotations
// =============================================================================

/// Annotation as served by the annotation endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationDocument {
    #[serde(rename = "_id")]
    pub id: String,

    pub annotation: AnnotationBody,
}

/// Geometry and style payload of an annotation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotationBody {
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub elements: Vec<AnnotationElement>,
}

/// A single shape. Everything but the type tag is kept verbatim for the
/// overlay renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationElement {
    #[serde(rename = "type")]
    pub kind: String,

    #[serde(flatten)]
    pub properties: serde_json::Map<String, serde_json::Value>,
}
