//! World-coordinate geometry shared by the surface, layer and viewport code.
//!
//! # Vertical axis convention
//!
//! Imagery is ingested in image-pixel coordinates: the origin is the top-left
//! corner and `y` grows downwards ("south-up" ingest, `+axis=esu`). The
//! rendering surface works internally in a "north-up" convention (`+axis=enu`)
//! where `y` grows upwards. Converting between the two is a sign flip of `y`
//! and nothing else:
//!
//! ```text
//! internal_y = -ingest_y
//! ```
//!
//! [`WorldBounds`] is always expressed in the ingest convention. [`ViewBounds`]
//! (what a surface reports for its current pan/zoom) is always expressed in
//! the internal convention, so `ViewBounds::top >= ViewBounds::bottom`.

use serde::{Deserialize, Serialize};

// =============================================================================
// Axis Convention
// =============================================================================

/// Orientation of the vertical axis of a coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AxisConvention {
    /// `y` grows downwards (image rows)
    SouthUp,
    /// `y` grows upwards (map/GL space)
    NorthUp,
}

impl AxisConvention {
    /// Projection string understood by the rendering surface.
    pub const fn proj(&self) -> &'static str {
        match self {
            AxisConvention::SouthUp => "+proj=longlat +axis=esu",
            AxisConvention::NorthUp => "+proj=longlat +axis=enu",
        }
    }
}

/// Convert an ingest (south-up) `y` into the internal (north-up) convention.
#[inline]
pub fn to_internal_y(y: f64) -> f64 {
    -y
}

/// Convert an internal (north-up) `y` back into the ingest convention.
#[inline]
pub fn to_ingest_y(y: f64) -> f64 {
    -y
}

// =============================================================================
// Points and Bounds
// =============================================================================

/// A point in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Rectangular extent of the displayed imagery in world (ingest) coordinates.
///
/// `left` and `top` default to 0 when absent from serialized input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WorldBounds {
    #[serde(default)]
    pub left: f64,
    #[serde(default)]
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl WorldBounds {
    pub const fn new(left: f64, top: f64, right: f64, bottom: f64) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Bounds anchored at the origin, e.g. `{right: width, bottom: height}`.
    pub const fn extent(right: f64, bottom: f64) -> Self {
        Self::new(0.0, 0.0, right, bottom)
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    /// Center of the bounds in ingest coordinates.
    pub fn center(&self) -> Point {
        Point::new(
            self.width() / 2.0 + self.left,
            self.height() / 2.0 + self.top,
        )
    }

    /// True when `right > left` and `bottom > top`.
    pub fn is_valid(&self) -> bool {
        self.right > self.left && self.bottom > self.top
    }
}

/// Currently visible region of a surface, in internal (north-up) coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewBounds {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl ViewBounds {
    /// The view that exactly covers `bounds`.
    pub fn covering(bounds: &WorldBounds) -> Self {
        Self {
            left: bounds.left,
            top: to_internal_y(bounds.top),
            right: bounds.right,
            bottom: to_internal_y(bounds.bottom),
        }
    }

    pub fn width(&self) -> f64 {
        self.right - self.left
    }
}
