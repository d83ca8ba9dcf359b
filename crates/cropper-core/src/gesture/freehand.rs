//! Freehand (lasso) path sampling.

use crate::geometry::{Point, Rect};

/// A new sample must move further than this on some axis to be recorded.
pub const SAMPLE_THRESHOLD: f64 = 2.0;

/// Fewer recorded points than this do not make a selection.
pub const MIN_POINTS: usize = 3;

/// Append-only point path recorded during a freehand gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FreehandPath {
    points: Vec<Point>,
}

impl FreehandPath {
    pub fn starting_at(point: Point) -> Self {
        Self {
            points: vec![point],
        }
    }

    /// Record `point` unless it is within the sampling threshold of the last
    /// recorded point. Returns whether it was recorded.
    pub fn push(&mut self, point: Point) -> bool {
        if let Some(last) = self.points.last() {
            let dx = (point.x - last.x).abs();
            let dy = (point.y - last.y).abs();
            if dx <= SAMPLE_THRESHOLD && dy <= SAMPLE_THRESHOLD {
                return false;
            }
        }
        self.points.push(point);
        true
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the path, once it has enough points.
    pub fn bounds(&self) -> Option<Rect> {
        if self.points.len() < MIN_POINTS {
            return None;
        }
        Rect::bounding_box(&self.points)
    }
}
