//! Pixel sampling for extraction.
//!
//! Sampling uses inverse mapping: for each output pixel we compute where it
//! lands in the source and interpolate there. Coordinates are continuous with
//! pixel `(i, j)` covering `[i, i + 1) x [j, j + 1)`, so its centre is at
//! `(i + 0.5, j + 0.5)`.
//!
//! For a rotated source the image is conceptually drawn, rotated about its own
//! centre, onto a square canvas of side `2 * max(width, height)`:
//! ```text
//! canvas = C + R(p - n/2)          C = canvas centre, n = natural size
//! p      = R⁻¹(canvas - C) + n/2
//! ```
//! The canvas is never allocated; [`RotatedCanvas::sample`] evaluates the
//! second line per pixel.

use image::{Rgba, RgbaImage};

use crate::geometry::{Point, Rotation};

/// What lies outside the image (and outside the rotated canvas).
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

/// Slack for sample points that land on the image border through rounding.
const EDGE_TOLERANCE: f64 = 1e-6;

/// Sample `image` at continuous coordinates using bilinear interpolation.
///
/// Points inside the image interpolate between the 4 nearest pixel centres,
/// clamping to the border pixels; points outside return [`TRANSPARENT`].
pub fn sample_bilinear(image: &RgbaImage, x: f64, y: f64) -> Rgba<u8> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return TRANSPARENT;
    }

    let inside = x >= -EDGE_TOLERANCE
        && x <= w as f64 + EDGE_TOLERANCE
        && y >= -EDGE_TOLERANCE
        && y <= h as f64 + EDGE_TOLERANCE;
    if !inside {
        return TRANSPARENT;
    }

    // Shift so pixel centres sit on integers
    let px = x - 0.5;
    let py = y - 0.5;
    let fx0 = px.floor();
    let fy0 = py.floor();
    let fx = px - fx0;
    let fy = py - fy0;

    let max_x = w as i64 - 1;
    let max_y = h as i64 - 1;
    let x0 = (fx0 as i64).clamp(0, max_x) as u32;
    let x1 = (fx0 as i64 + 1).clamp(0, max_x) as u32;
    let y0 = (fy0 as i64).clamp(0, max_y) as u32;
    let y1 = (fy0 as i64 + 1).clamp(0, max_y) as u32;

    let p00 = image.get_pixel(x0, y0).0;
    let p10 = image.get_pixel(x1, y0).0;
    let p01 = image.get_pixel(x0, y1).0;
    let p11 = image.get_pixel(x1, y1).0;

    let mut result = [0u8; 4];
    for i in 0..4 {
        let v = p00[i] as f64 * (1.0 - fx) * (1.0 - fy)
            + p10[i] as f64 * fx * (1.0 - fy)
            + p01[i] as f64 * (1.0 - fx) * fy
            + p11[i] as f64 * fx * fy;
        result[i] = v.clamp(0.0, 255.0).round() as u8;
    }

    Rgba(result)
}

/// A source image rotated about its centre onto an oversized square canvas.
#[derive(Debug, Clone, Copy)]
pub struct RotatedCanvas<'a> {
    source: &'a RgbaImage,
    inverse: Rotation,
    side: f64,
    centre: Point,
    half_natural: Point,
}

impl<'a> RotatedCanvas<'a> {
    pub fn new(source: &'a RgbaImage, angle_degrees: f64) -> Self {
        let (w, h) = source.dimensions();
        let side = 2.0 * w.max(h) as f64;
        Self {
            source,
            inverse: Rotation::from_degrees(angle_degrees).inverse(),
            side,
            centre: Point::new(side / 2.0, side / 2.0),
            half_natural: Point::new(w as f64 / 2.0, h as f64 / 2.0),
        }
    }

    /// Side length of the square canvas.
    pub fn side(&self) -> f64 {
        self.side
    }

    /// Where a point in unrotated native-pixel space lands on the canvas.
    pub fn to_canvas(&self, p: Point) -> Point {
        Point::new(
            self.centre.x + p.x - self.half_natural.x,
            self.centre.y + p.y - self.half_natural.y,
        )
    }

    /// Sample the canvas at `p` (canvas coordinates).
    pub fn sample(&self, p: Point) -> Rgba<u8> {
        if p.x < 0.0 || p.y < 0.0 || p.x > self.side || p.y > self.side {
            return TRANSPARENT;
        }
        let q = self.inverse.apply(p, self.centre);
        sample_bilinear(
            self.source,
            q.x - self.centre.x + self.half_natural.x,
            q.y - self.centre.y + self.half_natural.y,
        )
    }
}
