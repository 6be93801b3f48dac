//! Imagery layers.
//!
//! Exactly one imagery layer is active at a time. Both layer kinds are
//! attached through the surface manager, which replaces the previous
//! surface (and with it the previous layer) before attaching the new one:
//!
//! - [`ImageLayer`]: one textured [`Quad`] spanning the image's world bounds
//! - [`TileLayer`]: a tile pyramid addressed by `{z}/{x}/{y}`, built from
//!   [`TileLayerOptions`] with defaults and size estimation applied

mod factory;
mod quad;
mod tile;

use serde::Serialize;

use crate::config::Renderer;

pub use quad::{ImageLayer, Quad};
pub use tile::{
    estimate_size, TileIndex, TileLayer, TileLayerOptions, TileOffset, TileRounding, TileUrl,
};

/// Layer description handed to a rendering surface.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerSpec {
    /// Feature layer holding a single quad
    Quad { quad: Quad, renderer: Renderer },
    /// Tile pyramid layer
    Tiles(TileLayer),
}

/// The imagery currently shown by a viewer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Imagery {
    Image(ImageLayer),
    Tiles(TileLayer),
}
