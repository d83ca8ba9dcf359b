//! Geometry primitives shared by the solver, the gesture state machine and the
//! extraction renderer.
//!
//! # Coordinate System
//!
//! - Origin is the top-left corner of the display container
//! - X grows to the right, Y grows downwards
//! - Rotation angles are in degrees, positive = clockwise on screen

use serde::{Deserialize, Serialize};

/// A point in container space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - other`.
    pub fn delta_from(self, other: Point) -> Point {
        Point::new(self.x - other.x, self.y - other.y)
    }
}

/// An axis-aligned rectangle.
///
/// Crop rectangles live in container space; the extraction renderer also uses
/// this type for regions in native image pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Bounding box of two corner points, whatever their order.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }

    /// Axis-aligned bounding box of a point set, `None` when empty.
    pub fn bounding_box(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y) = (first.x, first.y);
        let (mut max_x, mut max_y) = (first.x, first.y);

        for p in &points[1..] {
            min_x = min_x.min(p.x);
            min_y = min_y.min(p.y);
            max_x = max_x.max(p.x);
            max_y = max_y.max(p.y);
        }

        Some(Self::new(min_x, min_y, max_x - min_x, max_y - min_y))
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when either extent is zero or negative.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Inclusive containment test (edges count as inside).
    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Same size, moved so that its top-left corner is at `origin`.
    pub fn with_origin(&self, origin: Point) -> Self {
        Self::new(origin.x, origin.y, self.width, self.height)
    }

    /// Same size, moved so that its center is at `center`.
    pub fn centered_on(&self, center: Point) -> Self {
        Self::new(
            center.x - self.width / 2.0,
            center.y - self.height / 2.0,
            self.width,
            self.height,
        )
    }

    /// Scale every component independently.
    pub fn scale(&self, sx: f64, sy: f64) -> Self {
        Self::new(self.x * sx, self.y * sy, self.width * sx, self.height * sy)
    }

    /// Component-wise comparison within `tolerance`.
    pub fn approx_eq(&self, other: &Rect, tolerance: f64) -> bool {
        (self.x - other.x).abs() <= tolerance
            && (self.y - other.y).abs() <= tolerance
            && (self.width - other.width).abs() <= tolerance
            && (self.height - other.height).abs() <= tolerance
    }
}

/// Size of the display viewport the crop rectangle is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ContainerMetrics {
    pub width: f64,
    pub height: f64,
}

impl ContainerMetrics {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A container with no area cannot host a crop rectangle.
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Intrinsic pixel size of the loaded source raster.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub natural_width: u32,
    pub natural_height: u32,
}

impl ImageMetrics {
    pub fn new(natural_width: u32, natural_height: u32) -> Self {
        Self {
            natural_width,
            natural_height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.natural_width == 0 || self.natural_height == 0
    }
}

/// Clamp `value` into `[min, max]`.
///
/// Unlike `f64::clamp` this never panics: when `min > max` the upper bound
/// wins, and a NaN `value` comes back as `min` clamped by `max`.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Euclidean distance between two points.
#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

/// Rotate `point` around `center` by `angle_degrees` (clockwise on screen).
///
/// ```text
/// x' = cx + dx * cos(θ) - dy * sin(θ)
/// y' = cy + dx * sin(θ) + dy * cos(θ)
/// ```
pub fn rotate_point(point: Point, center: Point, angle_degrees: f64) -> Point {
    Rotation::from_degrees(angle_degrees).apply(point, center)
}

/// A rotation with its sine and cosine computed once, for per-pixel use.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    sin: f64,
    cos: f64,
}

impl Rotation {
    pub fn from_degrees(angle_degrees: f64) -> Self {
        let (sin, cos) = angle_degrees.to_radians().sin_cos();
        Self { sin, cos }
    }

    /// The opposite rotation.
    pub fn inverse(self) -> Self {
        Self {
            sin: -self.sin,
            cos: self.cos,
        }
    }

    pub fn apply(self, point: Point, center: Point) -> Point {
        let dx = point.x - center.x;
        let dy = point.y - center.y;
        Point::new(
            center.x + dx * self.cos - dy * self.sin,
            center.y + dx * self.sin + dy * self.cos,
        )
    }
}

/// Smallest accepted zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest accepted zoom factor.
pub const MAX_ZOOM: f64 = 5.0;

/// Clamp a zoom factor into `[MIN_ZOOM, MAX_ZOOM]`. NaN becomes `MIN_ZOOM`.
pub fn clamp_zoom(zoom: f64) -> f64 {
    clamp(zoom, MIN_ZOOM, MAX_ZOOM)
}

/// Normalize an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle_degrees: f64) -> f64 {
    let normalized = angle_degrees.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs
    if normalized >= 360.0 {
        0.0
    } else {
        normalized
    }
}
