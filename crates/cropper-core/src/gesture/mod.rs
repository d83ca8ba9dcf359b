//! Pointer gesture state machine.
//!
//! A [`Gesture`] is chosen on pointer-down from the current rectangle and
//! feature flags, then turns each pointer-move into a solved candidate
//! rectangle. The gesture owns everything it needs to finish, so flag changes
//! made while it runs only affect the next one.
//!
//! # Modes
//!
//! - **Moving**: translate, size fixed, relative to the initial grab offset
//! - **Resizing**: incremental edge updates through a [`ResizeHandle`]
//! - **Creating**: span from the down point to the pointer
//! - **Freehand**: record a lasso path, commit its bounding box on release
//!
//! Cursor following is not a pointer-down gesture; see [`follow_cursor`].

mod freehand;
mod handle;

pub use freehand::{FreehandPath, MIN_POINTS, SAMPLE_THRESHOLD};
pub use handle::{Edges, ResizeHandle, HANDLE_HIT_RADIUS};

use serde::{Deserialize, Serialize};

use crate::constraints::{
    apply_aspect_ratio, apply_size_limits, clamp_to_container, resolve, translate_into,
    Constraints,
};
use crate::features::Features;
use crate::geometry::{ContainerMetrics, Point, Rect};

/// Observable interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode", content = "handle")]
pub enum GestureMode {
    Idle,
    Moving,
    Resizing(ResizeHandle),
    Creating,
    FreehandDrawing,
    CursorFollowing,
}

/// How a create-by-drag gesture applies constraints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStyle {
    /// Aspect ratio and size limits on every move.
    FreeStyle,
    /// Only kept inside the container while dragging; full constraints on release.
    Photoshop,
}

/// Everything a gesture step reads from the controller.
#[derive(Debug, Clone, Copy)]
pub struct GestureContext<'a> {
    pub rect: Rect,
    pub container: ContainerMetrics,
    pub constraints: &'a Constraints,
}

/// An in-progress pointer gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Gesture {
    #[default]
    Idle,
    Moving {
        /// Pointer position relative to the rectangle's origin at pointer-down.
        grab_offset: Point,
        /// The rectangle at pointer-down; its size is kept for the whole drag.
        start: Rect,
    },
    Resizing {
        handle: ResizeHandle,
        /// Previous pointer sample; deltas are incremental.
        last: Point,
    },
    Creating {
        origin: Point,
        style: CreationStyle,
        /// Raw span from the last move, `None` until the pointer moves.
        span: Option<Rect>,
    },
    Freehand(FreehandPath),
}

impl Gesture {
    /// Pick a gesture for a pointer-down at `point`.
    ///
    /// Priority: resize handles, then the rectangle interior, then freehand,
    /// then rectangle creation (photoshop style before free style).
    pub fn begin(point: Point, rect: &Rect, features: &Features) -> Self {
        if features.resize {
            if let Some(handle) = ResizeHandle::hit_test(rect, point) {
                return Gesture::Resizing {
                    handle,
                    last: point,
                };
            }
        }

        if features.drag && rect.contains(point) {
            return Gesture::Moving {
                grab_offset: point.delta_from(Point::new(rect.x, rect.y)),
                start: *rect,
            };
        }

        if features.freehand {
            return Gesture::Freehand(FreehandPath::starting_at(point));
        }

        let style = if features.photoshop_style {
            Some(CreationStyle::Photoshop)
        } else if features.free_style {
            Some(CreationStyle::FreeStyle)
        } else {
            None
        };

        match style {
            Some(style) => Gesture::Creating {
                origin: point,
                style,
                span: None,
            },
            None => Gesture::Idle,
        }
    }

    pub fn mode(&self) -> GestureMode {
        match self {
            Gesture::Idle => GestureMode::Idle,
            Gesture::Moving { .. } => GestureMode::Moving,
            Gesture::Resizing { handle, .. } => GestureMode::Resizing(*handle),
            Gesture::Creating { .. } => GestureMode::Creating,
            Gesture::Freehand(_) => GestureMode::FreehandDrawing,
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }

    /// The lasso path while a freehand gesture runs.
    pub fn freehand_path(&self) -> Option<&FreehandPath> {
        match self {
            Gesture::Freehand(path) => Some(path),
            _ => None,
        }
    }

    /// Feed a pointer-move; returns the rectangle to commit, if any.
    pub fn update(&mut self, point: Point, ctx: &GestureContext<'_>) -> Option<Rect> {
        match self {
            Gesture::Idle => None,
            Gesture::Moving { grab_offset, start } => {
                let origin = point.delta_from(*grab_offset);
                let moved = translate_into(start.with_origin(origin), ctx.container);
                Some(resolve(moved, ctx.container, ctx.constraints))
            }
            Gesture::Resizing { handle, last } => {
                let delta = point.delta_from(*last);
                *last = point;

                let raw = handle.drag(&ctx.rect, delta);
                let sized = handle.pin_opposite_edges(&raw, size_rules(raw, ctx.constraints));
                Some(resolve(sized, ctx.container, ctx.constraints))
            }
            Gesture::Creating {
                origin,
                style,
                span,
            } => {
                let raw = Rect::from_corners(*origin, point);
                *span = Some(raw);
                Some(match style {
                    CreationStyle::FreeStyle => create(*origin, point, ctx),
                    CreationStyle::Photoshop => clamp_to_container(raw, ctx.container),
                })
            }
            Gesture::Freehand(path) => {
                path.push(point);
                None
            }
        }
    }

    /// Pointer-up; returns the final rectangle to commit, if any.
    pub fn finish(self, ctx: &GestureContext<'_>) -> Option<Rect> {
        match self {
            Gesture::Creating {
                origin,
                style: CreationStyle::Photoshop,
                span: Some(span),
            } => Some(create(origin, far_corner(origin, &span), ctx)),
            Gesture::Freehand(path) => path
                .bounds()
                .map(|bounds| resolve(bounds, ctx.container, ctx.constraints)),
            _ => None,
        }
    }
}

/// Centre the current rectangle on the pointer.
pub fn follow_cursor(point: Point, ctx: &GestureContext<'_>) -> Rect {
    let centered = translate_into(ctx.rect.centered_on(point), ctx.container);
    resolve(centered, ctx.container, ctx.constraints)
}

/// Aspect ratio then size limits, as the solver's first two steps.
fn size_rules(rect: Rect, constraints: &Constraints) -> Rect {
    let shaped = match constraints.aspect() {
        Some(ratio) => apply_aspect_ratio(rect, ratio),
        None => rect,
    };
    apply_size_limits(shaped, constraints)
}

/// Span `origin` to `corner`, apply size rules growing away from `origin`,
/// then solve.
fn create(origin: Point, corner: Point, ctx: &GestureContext<'_>) -> Rect {
    let raw = Rect::from_corners(origin, corner);
    let sized = size_rules(raw, ctx.constraints);

    let x = if corner.x < origin.x {
        origin.x - sized.width
    } else {
        origin.x
    };
    let y = if corner.y < origin.y {
        origin.y - sized.height
    } else {
        origin.y
    };

    resolve(
        Rect::new(x, y, sized.width, sized.height),
        ctx.container,
        ctx.constraints,
    )
}

/// The span corner opposite `origin`, i.e. the last pointer position.
fn far_corner(origin: Point, span: &Rect) -> Point {
    let x = if span.x < origin.x { span.x } else { span.right() };
    let y = if span.y < origin.y { span.y } else { span.bottom() };
    Point::new(x, y)
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn ctx<'a>(rect: Rect, constraints: &'a Constraints) -> GestureContext<'a> {
        GestureContext {
            rect,
            container: ContainerMetrics::new(400.0, 300.0),
            constraints,
        }
    }

    fn rect() -> Rect {
        Rect::new(100.0, 100.0, 100.0, 80.0)
    }

    #[test]
    fn test_begin_on_handle_resizes() {
        let g = Gesture::begin(Point::new(101.0, 99.0), &rect(), &Features::default());
        assert_eq!(g.mode(), GestureMode::Resizing(ResizeHandle::Nw));
    }

    #[test]
    fn test_begin_inside_moves() {
        let g = Gesture::begin(Point::new(150.0, 140.0), &rect(), &Features::default());
        assert_eq!(g.mode(), GestureMode::Moving);
    }

    #[test]
    fn test_begin_handle_ignored_when_resize_disabled() {
        let mut features = Features::default();
        features.resize = false;
        // On the corner, which is also inside the rectangle
        let g = Gesture::begin(Point::new(100.0, 100.0), &rect(), &features);
        assert_eq!(g.mode(), GestureMode::Moving);
    }

    #[test]
    fn test_begin_outside_stays_idle_by_default() {
        let g = Gesture::begin(Point::new(10.0, 10.0), &rect(), &Features::default());
        assert!(g.is_idle());
    }

    #[test]
    fn test_begin_outside_priority() {
        let mut features = Features::default();
        features.free_style = true;
        features.photoshop_style = true;
        features.freehand = true;
        let p = Point::new(10.0, 10.0);
        assert_eq!(Gesture::begin(p, &rect(), &features).mode(), GestureMode::FreehandDrawing);

        features.freehand = false;
        let g = Gesture::begin(p, &rect(), &features);
        assert!(matches!(
            g,
            Gesture::Creating {
                style: CreationStyle::Photoshop,
                ..
            }
        ));

        features.photoshop_style = false;
        let g = Gesture::begin(p, &rect(), &features);
        assert!(matches!(
            g,
            Gesture::Creating {
                style: CreationStyle::FreeStyle,
                ..
            }
        ));
    }

    #[test]
    fn test_move_translates_by_pointer_delta() {
        let k = Constraints::unconstrained();
        let start = rect();
        let mut g = Gesture::begin(Point::new(150.0, 140.0), &start, &Features::default());
        let out = g.update(Point::new(170.0, 125.0), &ctx(start, &k)).unwrap();
        assert_eq!(out, Rect::new(120.0, 85.0, 100.0, 80.0));
    }

    #[test]
    fn test_move_against_edge_keeps_size() {
        let k = Constraints::default();
        let start = rect();
        let mut g = Gesture::begin(Point::new(150.0, 140.0), &start, &Features::default());
        let out = g.update(Point::new(500.0, 140.0), &ctx(start, &k)).unwrap();
        assert_eq!(out, Rect::new(300.0, 100.0, 100.0, 80.0));
    }

    #[test]
    fn test_resize_is_incremental() {
        let k = Constraints::unconstrained();
        let mut current = rect();
        let mut g = Gesture::begin(Point::new(200.0, 180.0), &current, &Features::default());
        assert_eq!(g.mode(), GestureMode::Resizing(ResizeHandle::Se));

        current = g.update(Point::new(210.0, 190.0), &ctx(current, &k)).unwrap();
        assert_eq!(current, Rect::new(100.0, 100.0, 110.0, 90.0));

        // Second sample only adds the delta since the first
        current = g.update(Point::new(215.0, 190.0), &ctx(current, &k)).unwrap();
        assert_eq!(current, Rect::new(100.0, 100.0, 115.0, 90.0));
    }

    #[test]
    fn test_resize_respects_min_size_and_pins_right_edge() {
        let k = Constraints::default();
        let current = rect();
        let mut g = Gesture::begin(Point::new(100.0, 140.0), &current, &Features::default());
        assert_eq!(g.mode(), GestureMode::Resizing(ResizeHandle::W));

        let out = g.update(Point::new(190.0, 140.0), &ctx(current, &k)).unwrap();
        assert_eq!(out.width, 50.0);
        assert_eq!(out.right(), 200.0);
    }

    #[test]
    fn test_resize_with_aspect_ratio() {
        let k = Constraints::default().with_aspect_ratio(Some(1.0));
        let current = Rect::new(100.0, 100.0, 100.0, 100.0);
        let mut g = Gesture::begin(Point::new(200.0, 200.0), &current, &Features::default());
        let out = g.update(Point::new(240.0, 210.0), &ctx(current, &k)).unwrap();
        assert!((out.width - out.height).abs() < EPS);
        assert_eq!(out.width, 140.0);
    }

    #[test]
    fn test_free_style_create_spans_any_direction() {
        let k = Constraints::unconstrained();
        let mut features = Features::default();
        features.free_style = true;
        let mut g = Gesture::begin(Point::new(50.0, 50.0), &rect(), &features);

        let out = g.update(Point::new(20.0, 10.0), &ctx(rect(), &k)).unwrap();
        assert_eq!(out, Rect::new(20.0, 10.0, 30.0, 40.0));
    }

    #[test]
    fn test_free_style_create_applies_min_size_away_from_origin() {
        let k = Constraints::default();
        let mut features = Features::default();
        features.free_style = true;
        let mut g = Gesture::begin(Point::new(80.0, 80.0), &rect(), &features);

        let out = g.update(Point::new(70.0, 75.0), &ctx(rect(), &k)).unwrap();
        assert_eq!(out, Rect::new(30.0, 30.0, 50.0, 50.0));
        assert!(g.finish(&ctx(out, &k)).is_none());
    }

    #[test]
    fn test_photoshop_create_constrains_on_release_only() {
        let k = Constraints::default().with_aspect_ratio(Some(1.0));
        let mut features = Features::default();
        features.photoshop_style = true;
        let mut g = Gesture::begin(Point::new(20.0, 20.0), &rect(), &features);

        let dragging = g.update(Point::new(60.0, 30.0), &ctx(rect(), &k)).unwrap();
        assert_eq!(dragging, Rect::new(20.0, 20.0, 40.0, 10.0));

        let released = g.finish(&ctx(dragging, &k)).unwrap();
        assert_eq!(released, Rect::new(20.0, 20.0, 50.0, 50.0));
    }

    #[test]
    fn test_photoshop_press_without_move_changes_nothing() {
        let k = Constraints::default();
        let mut features = Features::default();
        features.photoshop_style = true;
        let g = Gesture::begin(Point::new(20.0, 20.0), &rect(), &features);
        assert!(g.finish(&ctx(rect(), &k)).is_none());
    }

    #[test]
    fn test_freehand_commits_bounding_box() {
        let k = Constraints::unconstrained();
        let mut features = Features::default();
        features.freehand = true;
        let mut g = Gesture::begin(Point::new(0.0, 0.0), &rect(), &features);
        for p in [(10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            assert!(g.update(Point::new(p.0, p.1), &ctx(rect(), &k)).is_none());
        }
        let out = g.finish(&ctx(rect(), &k)).unwrap();
        assert_eq!(out, Rect::new(0.0, 0.0, 10.0, 10.0));
    }

    #[test]
    fn test_freehand_clamps_to_container() {
        let k = Constraints::unconstrained();
        let mut features = Features::default();
        features.freehand = true;
        let mut g = Gesture::begin(Point::new(-20.0, 250.0), &rect(), &features);
        g.update(Point::new(350.0, 250.0), &ctx(rect(), &k));
        g.update(Point::new(350.0, 400.0), &ctx(rect(), &k));
        let out = g.finish(&ctx(rect(), &k)).unwrap();
        assert_eq!(out, Rect::new(0.0, 250.0, 350.0, 50.0));
    }

    #[test]
    fn test_freehand_bounds_follow_constraints() {
        let k = Constraints::default().with_aspect_ratio(Some(2.0));
        let mut features = Features::default();
        features.freehand = true;
        let mut g = Gesture::begin(Point::new(0.0, 0.0), &rect(), &features);
        for p in [(10.0, 0.0), (10.0, 10.0), (0.0, 10.0)] {
            g.update(Point::new(p.0, p.1), &ctx(rect(), &k));
        }
        // 10x10 lasso: widened to 2:1, then grown to the 50px minimum height
        let out = g.finish(&ctx(rect(), &k)).unwrap();
        assert_eq!(out, Rect::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn test_freehand_needs_three_points() {
        let k = Constraints::default();
        let mut features = Features::default();
        features.freehand = true;
        let mut g = Gesture::begin(Point::new(0.0, 0.0), &rect(), &features);
        g.update(Point::new(1.0, 1.0), &ctx(rect(), &k));
        g.update(Point::new(40.0, 40.0), &ctx(rect(), &k));
        assert!(g.finish(&ctx(rect(), &k)).is_none());
    }

    #[test]
    fn test_follow_cursor_centres_rect() {
        let k = Constraints::default();
        let out = follow_cursor(Point::new(200.0, 150.0), &ctx(rect(), &k));
        assert_eq!(out, Rect::new(150.0, 110.0, 100.0, 80.0));
    }

    #[test]
    fn test_follow_cursor_near_edge_keeps_size() {
        let k = Constraints::default();
        let out = follow_cursor(Point::new(395.0, 5.0), &ctx(rect(), &k));
        assert_eq!(out, Rect::new(300.0, 0.0, 100.0, 80.0));
    }
}
