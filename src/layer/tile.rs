//! Tiled-pyramid layers.

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};

use crate::config::{DEFAULT_MAX_LEVEL, DEFAULT_TILE_SIZE};
use crate::error::ViewerError;
use crate::geometry::WorldBounds;

// =============================================================================
// Tile Addressing
// =============================================================================

/// Address of one tile in the pyramid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TileIndex {
    pub level: u32,
    pub x: u64,
    pub y: u64,
}

/// Where tiles are fetched from.
#[derive(Clone)]
pub enum TileUrl {
    /// Template with `{z}`, `{x}` and `{y}` placeholders
    Template(String),
    /// Function computing the URL of a tile
    Resolver(Arc<dyn Fn(TileIndex) -> String + Send + Sync>),
}

impl TileUrl {
    pub fn url_for(&self, index: TileIndex) -> String {
        match self {
            TileUrl::Template(template) => template
                .replace("{z}", &index.level.to_string())
                .replace("{x}", &index.x.to_string())
                .replace("{y}", &index.y.to_string()),
            TileUrl::Resolver(resolve) => resolve(index),
        }
    }
}

impl fmt::Debug for TileUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TileUrl::Template(template) => f.debug_tuple("Template").field(template).finish(),
            TileUrl::Resolver(_) => f.write_str("Resolver(..)"),
        }
    }
}

impl Serialize for TileUrl {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TileUrl::Template(template) => serializer.serialize_str(template),
            TileUrl::Resolver(_) => serializer.serialize_str("<resolver>"),
        }
    }
}

/// Rounding applied when computing tile counts from pixel sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TileRounding {
    #[default]
    Ceil,
    Floor,
    Round,
}

impl TileRounding {
    pub fn apply(&self, value: f64) -> f64 {
        match self {
            TileRounding::Ceil => value.ceil(),
            TileRounding::Floor => value.floor(),
            TileRounding::Round => value.round(),
        }
    }
}

/// Pixel offset of the tile grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct TileOffset {
    pub x: i64,
    pub y: i64,
}

// =============================================================================
// Options
// =============================================================================

/// Caller-supplied tile layer options. Absent fields take defaults in
/// [`TileLayerOptions::resolve`].
#[derive(Debug, Clone, Default)]
pub struct TileLayerOptions {
    pub url: Option<TileUrl>,
    pub use_credentials: Option<bool>,
    pub max_level: Option<u32>,
    pub wrap_x: Option<bool>,
    pub wrap_y: Option<bool>,
    pub tile_offset: Option<TileOffset>,
    pub attribution: Option<String>,
    pub tile_width: Option<u32>,
    pub tile_height: Option<u32>,
    pub tile_rounding: Option<TileRounding>,
    /// Full-resolution width in pixels
    pub size_x: Option<u64>,
    /// Full-resolution height in pixels
    pub size_y: Option<u64>,
}

impl TileLayerOptions {
    /// Options with the given URL and everything else defaulted.
    pub fn with_url(url: TileUrl) -> Self {
        Self {
            url: Some(url),
            ..Self::default()
        }
    }

    pub fn max_level(mut self, level: u32) -> Self {
        self.max_level = Some(level);
        self
    }

    pub fn tile_size(mut self, width: u32, height: u32) -> Self {
        self.tile_width = Some(width);
        self.tile_height = Some(height);
        self
    }

    pub fn size(mut self, size_x: Option<u64>, size_y: Option<u64>) -> Self {
        self.size_x = size_x;
        self.size_y = size_y;
        self
    }

    pub fn use_credentials(mut self, enabled: bool) -> Self {
        self.use_credentials = Some(enabled);
        self
    }

    /// Apply defaults and estimate missing sizes.
    ///
    /// Fails with [`ViewerError::InvalidArgument`] when no URL is given. A
    /// missing or zero size is estimated as `2^max_level * tile_size`.
    pub fn resolve(self) -> Result<TileLayer, ViewerError> {
        let url = self
            .url
            .ok_or_else(|| ViewerError::InvalidArgument("`url` parameter required.".to_string()))?;

        let max_level = self.max_level.unwrap_or(DEFAULT_MAX_LEVEL);
        let tile_width = self.tile_width.unwrap_or(DEFAULT_TILE_SIZE);
        let tile_height = self.tile_height.unwrap_or(DEFAULT_TILE_SIZE);

        let size_x = self
            .size_x
            .filter(|&size| size > 0)
            .unwrap_or_else(|| estimate_size(max_level, tile_width));
        let size_y = self
            .size_y
            .filter(|&size| size > 0)
            .unwrap_or_else(|| estimate_size(max_level, tile_height));

        Ok(TileLayer {
            url,
            use_credentials: self.use_credentials.unwrap_or(true),
            max_level,
            wrap_x: self.wrap_x.unwrap_or(false),
            wrap_y: self.wrap_y.unwrap_or(false),
            tile_offset: self.tile_offset.unwrap_or_default(),
            attribution: self.attribution.unwrap_or_default(),
            tile_width,
            tile_height,
            tile_rounding: self.tile_rounding.unwrap_or_default(),
            size_x,
            size_y,
        })
    }
}

/// `2^max_level * tile_size`, saturating.
pub fn estimate_size(max_level: u32, tile_size: u32) -> u64 {
    2u64.saturating_pow(max_level)
        .saturating_mul(u64::from(tile_size))
}

// =============================================================================
// Tile Layer
// =============================================================================

/// A fully specified tiled-pyramid layer.
#[derive(Debug, Clone, Serialize)]
pub struct TileLayer {
    pub url: TileUrl,
    pub use_credentials: bool,
    pub max_level: u32,
    pub wrap_x: bool,
    pub wrap_y: bool,
    pub tile_offset: TileOffset,
    pub attribution: String,
    pub tile_width: u32,
    pub tile_height: u32,
    pub tile_rounding: TileRounding,
    pub size_x: u64,
    pub size_y: u64,
}

impl TileLayer {
    /// World bounds covered by the pyramid: `{right: size_x - 1, bottom: size_y - 1}`.
    pub fn bounds(&self) -> WorldBounds {
        WorldBounds::extent(self.size_x as f64 - 1.0, self.size_y as f64 - 1.0)
    }

    /// Number of tile columns and rows at `level` (`max_level` = full resolution).
    pub fn tile_count(&self, level: u32) -> Option<(u64, u64)> {
        if level > self.max_level {
            return None;
        }
        let downsample = 2f64.powi((self.max_level - level) as i32);
        let columns = self
            .tile_rounding
            .apply(self.size_x as f64 / downsample / f64::from(self.tile_width));
        let rows = self
            .tile_rounding
            .apply(self.size_y as f64 / downsample / f64::from(self.tile_height));
        Some(((columns as u64).max(1), (rows as u64).max(1)))
    }

    /// URL of the tile at `index`.
    pub fn tile_url(&self, index: TileIndex) -> String {
        self.url.url_for(index)
    }
}
