//! Planar primitives: points, segments, the playable rectangle, and the
//! segment crossing test every other module builds on.

use serde::{Deserialize, Serialize};

use crate::error::{PuzzleError, Result};

/// Determinants below this magnitude are treated as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-4;

pub const DEFAULT_INSET_X: f32 = 20.0;
pub const DEFAULT_INSET_Y: f32 = 50.0;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<(f32, f32)> for Point {
    fn from((x, y): (f32, f32)) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub start: Point,
    pub end: Point,
}

impl Segment {
    pub const fn new(start: Point, end: Point) -> Self {
        Self { start, end }
    }

    pub fn crosses(&self, other: &Segment) -> bool {
        intersect(*self, *other).is_some()
    }
}

/// Returns the point where `a` and `b` cross.
///
/// Both interpolation parameters must lie strictly inside `(0, 1)`, so
/// segments that merely touch at an endpoint (including two cycle edges that
/// share a node) never count. Parallel and colinear pairs report `None`.
pub fn intersect(a: Segment, b: Segment) -> Option<Point> {
    let delta1x = a.end.x - a.start.x;
    let delta1y = a.end.y - a.start.y;
    let delta2x = b.end.x - b.start.x;
    let delta2y = b.end.y - b.start.y;

    let determinant = delta1x * delta2y - delta2x * delta1y;
    if determinant.abs() < PARALLEL_EPSILON {
        return None;
    }

    let offset_x = a.start.x - b.start.x;
    let offset_y = a.start.y - b.start.y;

    // A NaN parameter fails both comparisons and is rejected.
    let t1 = (offset_y * delta2x - offset_x * delta2y) / determinant;
    if !(t1 > 0.0 && t1 < 1.0) {
        return None;
    }

    let t2 = (offset_y * delta1x - offset_x * delta1y) / determinant;
    if !(t2 > 0.0 && t2 < 1.0) {
        return None;
    }

    Some(Point {
        x: a.start.x + t1 * delta1x,
        y: a.start.y + t1 * delta1y,
    })
}

/// Margins kept clear along each side when placing nodes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Insets {
    pub x: f32,
    pub y: f32,
}

impl Default for Insets {
    fn default() -> Self {
        Self {
            x: DEFAULT_INSET_X,
            y: DEFAULT_INSET_Y,
        }
    }
}

impl Insets {
    pub const NONE: Insets = Insets { x: 0.0, y: 0.0 };
}

/// The playable rectangle `(0, 0)..(width, height)` together with the insets
/// that shrink it to the area new nodes are placed in.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bounds {
    width: f32,
    height: f32,
    insets: Insets,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Result<Self> {
        Self::with_insets(width, height, Insets::default())
    }

    pub fn with_insets(width: f32, height: f32, insets: Insets) -> Result<Self> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(PuzzleError::InvalidBounds { width, height });
        }
        if !(insets.x.is_finite() && insets.y.is_finite()) || insets.x < 0.0 || insets.y < 0.0 {
            return Err(PuzzleError::InvalidInsets {
                x: insets.x,
                y: insets.y,
            });
        }
        if width - 2.0 * insets.x <= 0.0 || height - 2.0 * insets.y <= 0.0 {
            return Err(PuzzleError::PlacementAreaEmpty {
                width,
                height,
                inset_x: insets.x,
                inset_y: insets.y,
            });
        }

        Ok(Self {
            width,
            height,
            insets,
        })
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn insets(&self) -> Insets {
        self.insets
    }

    /// Minimum and maximum corners of the inset placement area.
    pub fn placement_area(&self) -> (Point, Point) {
        (
            Point::new(self.insets.x, self.insets.y),
            Point::new(self.width - self.insets.x, self.height - self.insets.y),
        )
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= 0.0 && point.x <= self.width && point.y >= 0.0 && point.y <= self.height
    }

    pub fn in_placement_area(&self, point: Point) -> bool {
        let (min, max) = self.placement_area();
        point.x >= min.x && point.x <= max.x && point.y >= min.y && point.y <= max.y
    }

    /// Pulls a drag target back onto the playable rectangle.
    ///
    /// Panics if `point` has a non-finite coordinate.
    pub fn clamp(&self, point: Point) -> Point {
        assert!(point.is_finite(), "cannot clamp non-finite point {point:?}");
        Point {
            x: point.x.clamp(0.0, self.width),
            y: point.y.clamp(0.0, self.height),
        }
    }

    /// Pixel size of the rectangle rasterized at `scale`.
    pub fn raster_size(&self, scale: f32) -> Result<(u32, u32)> {
        if !scale.is_finite() || scale <= 0.0 {
            return Err(PuzzleError::InvalidScale(scale));
        }
        let width = (self.width * scale).ceil();
        let height = (self.height * scale).ceil();
        if !(width >= 1.0 && height >= 1.0 && width <= u32::MAX as f32 && height <= u32::MAX as f32)
        {
            return Err(PuzzleError::RasterSize {
                scale,
                width,
                height,
            });
        }
        Ok((width as u32, height as u32))
    }
}
