//! Constraint solver for crop rectangles.
//!
//! [`resolve`] turns any candidate rectangle (including zero or negative
//! extents produced mid-gesture) into the nearest valid one. The steps run in
//! a fixed order and the container clamp runs last, so it always wins:
//!
//! 1. Aspect ratio: the shorter side (relative to the ratio) is grown to match
//! 2. Size limits: min/max width and height
//! 3. Container: overflowing edges are cut off, never translated
//!
//! Requests that cannot be satisfied are truncated silently. Callers that need
//! feedback compare the candidate with the returned rectangle.
//!
//! # Tie-break policy
//!
//! With an aspect ratio set, step 2 re-derives the other side whenever it
//! clamps one, and after step 3 the uncut side is shrunk back to the ratio.
//! The only constraint allowed to break the ratio or the minimum size is the
//! container itself.
//!
//! A cut at the left or top edge can leave the rectangle below its minimum,
//! so the steps run a second time over the clamped result. Once the origin is
//! inside the container one pass is stable, which makes [`resolve`]
//! idempotent.

use serde::{Deserialize, Serialize};

use crate::geometry::{clamp, ContainerMetrics, Rect};

/// Default minimum crop extent in container pixels.
pub const DEFAULT_MIN_SIZE: f64 = 50.0;

/// Size and shape limits for the crop rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Constraints {
    pub min_width: f64,
    pub min_height: f64,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    /// `width / height`, or `None` for a free shape.
    pub aspect_ratio: Option<f64>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            min_width: DEFAULT_MIN_SIZE,
            min_height: DEFAULT_MIN_SIZE,
            max_width: None,
            max_height: None,
            aspect_ratio: None,
        }
    }
}

impl Constraints {
    /// Constraints with no limits at all.
    pub fn unconstrained() -> Self {
        Self {
            min_width: 0.0,
            min_height: 0.0,
            ..Self::default()
        }
    }

    pub fn with_min(mut self, min_width: f64, min_height: f64) -> Self {
        self.min_width = min_width;
        self.min_height = min_height;
        self
    }

    pub fn with_max(mut self, max_width: Option<f64>, max_height: Option<f64>) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub fn with_aspect_ratio(mut self, aspect_ratio: Option<f64>) -> Self {
        self.aspect_ratio = aspect_ratio;
        self
    }

    /// The aspect ratio if it is usable (finite and positive).
    pub fn aspect(&self) -> Option<f64> {
        self.aspect_ratio.filter(|a| a.is_finite() && *a > 0.0)
    }

    /// True when an aspect ratio was supplied but cannot be honoured.
    pub fn has_invalid_aspect(&self) -> bool {
        self.aspect_ratio.is_some() && self.aspect().is_none()
    }

    fn min_size(&self) -> (f64, f64) {
        // NaN and negative minimums mean "no minimum"
        (self.min_width.max(0.0), self.min_height.max(0.0))
    }

    fn max_size(&self) -> (f64, f64) {
        (
            self.max_width.unwrap_or(f64::INFINITY),
            self.max_height.unwrap_or(f64::INFINITY),
        )
    }
}

/// Resolve a candidate rectangle against the container and constraints.
pub fn resolve(candidate: Rect, container: ContainerMetrics, constraints: &Constraints) -> Rect {
    let clamped = resolve_pass(candidate, container, constraints);
    resolve_pass(clamped, container, constraints)
}

fn resolve_pass(candidate: Rect, container: ContainerMetrics, constraints: &Constraints) -> Rect {
    let aspect = constraints.aspect();

    let mut rect = candidate;
    if let Some(ratio) = aspect {
        rect = apply_aspect_ratio(rect, ratio);
    }
    rect = apply_size_limits(rect, constraints);

    let sized = rect;
    rect = clamp_to_container(rect, container);

    if let Some(ratio) = aspect {
        if rect.width < sized.width || rect.height < sized.height {
            rect = shrink_to_aspect(rect, ratio);
        }
    }

    rect
}

/// Step 1: grow the side that is short for `ratio`.
///
/// Wider than the ratio (or exactly on it) recomputes the height, otherwise
/// the width.
pub fn apply_aspect_ratio(rect: Rect, ratio: f64) -> Rect {
    let mut out = rect;
    if rect.width / rect.height >= ratio {
        out.height = rect.width / ratio;
    } else {
        out.width = rect.height * ratio;
    }
    out
}

/// Step 2: clamp the extents to the min/max limits.
///
/// Without an aspect ratio each axis is clamped on its own. With one, every
/// clamp carries the other axis along so the ratio survives; maximums are
/// applied last and win over minimums.
pub fn apply_size_limits(rect: Rect, constraints: &Constraints) -> Rect {
    let (min_w, min_h) = constraints.min_size();
    let (max_w, max_h) = constraints.max_size();
    let (mut w, mut h) = (rect.width, rect.height);

    match constraints.aspect() {
        None => {
            w = clamp(w, min_w, max_w);
            h = clamp(h, min_h, max_h);
        }
        Some(ratio) => {
            if !(w >= min_w) {
                w = min_w;
                h = w / ratio;
            }
            if !(h >= min_h) {
                h = min_h;
                w = h * ratio;
            }
            if w > max_w {
                w = max_w;
                h = w / ratio;
            }
            if h > max_h {
                h = max_h;
                w = h * ratio;
            }
        }
    }

    Rect::new(rect.x, rect.y, w.max(0.0), h.max(0.0))
}

/// Step 3: cut the rectangle down to the container.
///
/// Negative positions move to zero and give up the overhanging extent; edges
/// past the far side are cut. The rectangle is never moved inwards as a whole
/// and never grows.
pub fn clamp_to_container(rect: Rect, container: ContainerMetrics) -> Rect {
    let (x, width) = clamp_axis(rect.x, rect.width, container.width.max(0.0));
    let (y, height) = clamp_axis(rect.y, rect.height, container.height.max(0.0));
    Rect::new(x, y, width, height)
}

fn clamp_axis(position: f64, extent: f64, limit: f64) -> (f64, f64) {
    let mut position = if position.is_nan() { 0.0 } else { position };
    let mut extent = if extent.is_nan() { 0.0 } else { extent };

    if position < 0.0 {
        extent += position;
        position = 0.0;
    }
    if position > limit {
        position = limit;
    }
    if position + extent > limit {
        extent = limit - position;
    }

    (position, extent.max(0.0))
}

/// Shrink whichever side is too long for `ratio`.
fn shrink_to_aspect(rect: Rect, ratio: f64) -> Rect {
    let mut out = rect;
    if rect.width / rect.height > ratio {
        out.width = rect.height * ratio;
    } else {
        out.height = rect.width / ratio;
    }
    out
}

/// Move a rectangle inside the container without touching its size.
///
/// A rectangle larger than the container on some axis is pinned to the
/// origin on that axis; [`resolve`] then cuts it down.
pub fn translate_into(rect: Rect, container: ContainerMetrics) -> Rect {
    let x = if rect.width <= container.width {
        clamp(rect.x, 0.0, container.width - rect.width)
    } else {
        0.0
    };
    let y = if rect.height <= container.height {
        clamp(rect.y, 0.0, container.height - rect.height)
    } else {
        0.0
    };
    Rect::new(x, y, rect.width, rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn container(w: f64, h: f64) -> ContainerMetrics {
        ContainerMetrics::new(w, h)
    }

    #[test]
    fn test_valid_rect_unchanged() {
        let r = Rect::new(10.0, 20.0, 100.0, 80.0);
        let out = resolve(r, container(400.0, 300.0), &Constraints::default());
        assert_eq!(out, r);
    }

    #[test]
    fn test_aspect_ratio_grows_height_when_too_wide() {
        let r = Rect::new(0.0, 0.0, 200.0, 50.0);
        let out = apply_aspect_ratio(r, 2.0);
        assert_eq!(out.width, 200.0);
        assert_eq!(out.height, 100.0);
    }

    #[test]
    fn test_aspect_ratio_grows_width_when_too_tall() {
        let r = Rect::new(0.0, 0.0, 50.0, 100.0);
        let out = apply_aspect_ratio(r, 1.0);
        assert_eq!(out.width, 100.0);
        assert_eq!(out.height, 100.0);
    }

    #[test]
    fn test_min_size_grows_rect() {
        let r = Rect::new(10.0, 10.0, 5.0, 5.0);
        let out = resolve(r, container(400.0, 300.0), &Constraints::default());
        assert_eq!(out, Rect::new(10.0, 10.0, 50.0, 50.0));
    }

    #[test]
    fn test_max_size_shrinks_rect() {
        let k = Constraints::default().with_max(Some(100.0), Some(60.0));
        let out = resolve(Rect::new(0.0, 0.0, 300.0, 200.0), container(400.0, 300.0), &k);
        assert_eq!(out.width, 100.0);
        assert_eq!(out.height, 60.0);
    }

    #[test]
    fn test_max_wins_over_min() {
        let k = Constraints::default()
            .with_min(80.0, 80.0)
            .with_max(Some(40.0), Some(40.0));
        let out = resolve(Rect::new(0.0, 0.0, 10.0, 10.0), container(400.0, 300.0), &k);
        assert_eq!(out.width, 40.0);
        assert_eq!(out.height, 40.0);
    }

    #[test]
    fn test_negative_position_shrinks_instead_of_translating() {
        let k = Constraints::unconstrained();
        let out = resolve(Rect::new(-20.0, -5.0, 100.0, 50.0), container(400.0, 300.0), &k);
        assert_eq!(out, Rect::new(0.0, 0.0, 80.0, 45.0));
    }

    #[test]
    fn test_overflow_shrinks_instead_of_translating() {
        let k = Constraints::unconstrained();
        let out = resolve(Rect::new(350.0, 280.0, 100.0, 50.0), container(400.0, 300.0), &k);
        assert_eq!(out, Rect::new(350.0, 280.0, 50.0, 20.0));
    }

    #[test]
    fn test_right_edge_clip_keeps_square() {
        let k = Constraints::default().with_aspect_ratio(Some(1.0));
        let out = resolve(Rect::new(380.0, 0.0, 100.0, 100.0), container(400.0, 300.0), &k);
        assert!(out.approx_eq(&Rect::new(380.0, 0.0, 20.0, 20.0), EPS), "{out:?}");
    }

    #[test]
    fn test_bottom_edge_clip_keeps_ratio() {
        let k = Constraints::default().with_aspect_ratio(Some(2.0));
        let out = resolve(Rect::new(0.0, 260.0, 200.0, 100.0), container(400.0, 300.0), &k);
        assert!(out.approx_eq(&Rect::new(0.0, 260.0, 80.0, 40.0), EPS), "{out:?}");
    }

    #[test]
    fn test_min_size_with_aspect_keeps_ratio() {
        let k = Constraints::default().with_aspect_ratio(Some(2.0));
        let out = resolve(Rect::new(0.0, 0.0, 60.0, 10.0), container(400.0, 300.0), &k);
        assert!((out.width / out.height - 2.0).abs() < EPS, "{out:?}");
        assert!(out.width >= 50.0 && out.height >= 50.0);
    }

    #[test]
    fn test_zero_candidate_is_legal() {
        let out = resolve(Rect::new(100.0, 100.0, 0.0, 0.0), container(400.0, 300.0), &Constraints::default());
        assert_eq!(out, Rect::new(100.0, 100.0, 50.0, 50.0));

        let k = Constraints::default().with_aspect_ratio(Some(1.5));
        let out = resolve(Rect::new(100.0, 100.0, 0.0, 0.0), container(400.0, 300.0), &k);
        assert!(!out.is_empty());
        assert!((out.width / out.height - 1.5).abs() < EPS);
    }

    #[test]
    fn test_negative_candidate_is_legal() {
        let k = Constraints::unconstrained().with_aspect_ratio(Some(1.0));
        let out = resolve(Rect::new(50.0, 50.0, -30.0, -10.0), container(400.0, 300.0), &k);
        assert!(out.width >= 0.0 && out.height >= 0.0);
    }

    #[test]
    fn test_near_edge_overhang_regrows_to_min() {
        // The whole height hangs above the top edge
        let out = resolve(Rect::new(10.0, -100.0, 100.0, 50.0), container(400.0, 300.0), &Constraints::default());
        assert_eq!(out, Rect::new(10.0, 0.0, 100.0, 50.0));
        assert_eq!(resolve(out, container(400.0, 300.0), &Constraints::default()), out);
    }

    #[test]
    fn test_left_overhang_in_tiny_container_is_stable() {
        let k = Constraints::default()
            .with_min(0.0, 30.76)
            .with_aspect_ratio(Some(0.25));
        let c = container(1.0, 1.0);
        let once = resolve(Rect::new(-90.6, 0.0, 0.0, 0.0), c, &k);
        let twice = resolve(once, c, &k);
        assert!(once.approx_eq(&twice, EPS), "{once:?} vs {twice:?}");
        assert!(once.approx_eq(&Rect::new(0.0, 0.0, 0.25, 1.0), EPS), "{once:?}");
    }

    #[test]
    fn test_position_past_far_edge_degenerates() {
        let k = Constraints::unconstrained();
        let out = resolve(Rect::new(500.0, 10.0, 40.0, 40.0), container(400.0, 300.0), &k);
        assert_eq!(out.x, 400.0);
        assert_eq!(out.width, 0.0);
    }

    #[test]
    fn test_unsatisfiable_min_is_truncated_by_container() {
        let k = Constraints::default().with_min(500.0, 50.0);
        let out = resolve(Rect::new(0.0, 0.0, 100.0, 100.0), container(400.0, 300.0), &k);
        assert_eq!(out.width, 400.0);
    }

    #[test]
    fn test_invalid_aspect_is_free() {
        for bad in [0.0, -1.0, f64::NAN, f64::INFINITY] {
            let k = Constraints::default().with_aspect_ratio(Some(bad));
            assert!(k.aspect().is_none());
            assert!(k.has_invalid_aspect());
            let r = Rect::new(0.0, 0.0, 120.0, 60.0);
            assert_eq!(resolve(r, container(400.0, 300.0), &k), r);
        }
    }

    #[test]
    fn test_translate_into_keeps_size() {
        let c = container(400.0, 300.0);
        let out = translate_into(Rect::new(380.0, -10.0, 100.0, 50.0), c);
        assert_eq!(out, Rect::new(300.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_translate_into_oversized_pins_origin() {
        let c = container(400.0, 300.0);
        let out = translate_into(Rect::new(30.0, 30.0, 500.0, 50.0), c);
        assert_eq!(out.x, 0.0);
        assert_eq!(out.y, 30.0);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
