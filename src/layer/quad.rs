//! Single-image layers.

use serde::Serialize;

use crate::config::Renderer;
use crate::geometry::{to_internal_y, Point, WorldBounds};
use crate::surface::LayerHandle;

/// A textured quad primitive.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Quad {
    /// Lower-left corner, internal (north-up) coordinates
    pub ll: Point,
    /// Upper-right corner, internal (north-up) coordinates
    pub ur: Point,
    /// Texture source
    pub image: String,
}

impl Quad {
    /// Quad covering `bounds` with the image at `url`.
    ///
    /// The bottom image row lands at `y = -bottom` and the top row at
    /// `y = -top`.
    pub fn spanning(url: impl Into<String>, bounds: &WorldBounds) -> Self {
        Self {
            ll: Point::new(bounds.left, to_internal_y(bounds.bottom)),
            ur: Point::new(bounds.right, to_internal_y(bounds.top)),
            image: url.into(),
        }
    }
}

/// A single raster image attached to the surface.
#[derive(Debug, Clone, Serialize)]
pub struct ImageLayer {
    pub handle: LayerHandle,
    pub bounds: WorldBounds,
    pub quad: Quad,
    pub renderer: Renderer,
}
