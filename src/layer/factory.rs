//! Layer creation on top of the surface manager.

use tracing::debug;

use crate::error::ViewerError;
use crate::geometry::WorldBounds;
use crate::surface::{RenderBackend, SurfaceManager};

use super::{ImageLayer, LayerSpec, Quad, TileLayer, TileLayerOptions};

impl<B: RenderBackend> SurfaceManager<B> {
    /// Show a single image spanning `bounds`.
    ///
    /// Creates a fresh surface for `bounds` and attaches one quad textured
    /// with `url`.
    pub fn add_image_layer(&mut self, url: &str, bounds: &WorldBounds) -> ImageLayer {
        let quad = Quad::spanning(url, bounds);
        let renderer = self.active_renderer();
        let handle = self.set_imagery(
            bounds,
            &LayerSpec::Quad {
                quad: quad.clone(),
                renderer,
            },
        );
        debug!("Image layer {} spanning {:?}", url, bounds);

        ImageLayer {
            handle,
            bounds: *bounds,
            quad,
            renderer,
        }
    }

    /// Show a tile pyramid.
    ///
    /// Fails with [`ViewerError::InvalidArgument`] before touching the
    /// surface when `opts` has no URL.
    pub fn add_tile_layer(&mut self, opts: TileLayerOptions) -> Result<TileLayer, ViewerError> {
        let layer = opts.resolve()?;
        let bounds = layer.bounds();
        self.set_imagery(&bounds, &LayerSpec::Tiles(layer.clone()));
        debug!(
            "Tile layer {}x{} px, max level {}",
            layer.size_x, layer.size_y, layer.max_level
        );
        Ok(layer)
    }
}
