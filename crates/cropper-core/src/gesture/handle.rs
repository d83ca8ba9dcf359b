//! The eight resize handles and their edge table.

use serde::{Deserialize, Serialize};

use crate::geometry::{Point, Rect};

/// Half the side of the square hit box around each handle anchor.
pub const HANDLE_HIT_RADIUS: f64 = 10.0;

/// Which edges of the rectangle a handle drags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edges {
    pub left: bool,
    pub top: bool,
    pub right: bool,
    pub bottom: bool,
}

impl Edges {
    const fn new(left: bool, top: bool, right: bool, bottom: bool) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

/// A resize handle: four corners and four edge midpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
    N,
    S,
    W,
    E,
}

impl ResizeHandle {
    /// Hit-test order: corners before edge midpoints.
    pub const ALL: [ResizeHandle; 8] = [
        ResizeHandle::Nw,
        ResizeHandle::Ne,
        ResizeHandle::Sw,
        ResizeHandle::Se,
        ResizeHandle::N,
        ResizeHandle::S,
        ResizeHandle::W,
        ResizeHandle::E,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ResizeHandle::Nw => "nw",
            ResizeHandle::Ne => "ne",
            ResizeHandle::Sw => "sw",
            ResizeHandle::Se => "se",
            ResizeHandle::N => "n",
            ResizeHandle::S => "s",
            ResizeHandle::W => "w",
            ResizeHandle::E => "e",
        }
    }

    /// The edges each handle moves.
    pub fn edges(self) -> Edges {
        match self {
            ResizeHandle::Nw => Edges::new(true, true, false, false),
            ResizeHandle::Ne => Edges::new(false, true, true, false),
            ResizeHandle::Sw => Edges::new(true, false, false, true),
            ResizeHandle::Se => Edges::new(false, false, true, true),
            ResizeHandle::N => Edges::new(false, true, false, false),
            ResizeHandle::S => Edges::new(false, false, false, true),
            ResizeHandle::W => Edges::new(true, false, false, false),
            ResizeHandle::E => Edges::new(false, false, true, false),
        }
    }

    /// Where the handle sits on `rect`.
    pub fn anchor(self, rect: &Rect) -> Point {
        let edges = self.edges();
        let x = if edges.left {
            rect.x
        } else if edges.right {
            rect.right()
        } else {
            rect.x + rect.width / 2.0
        };
        let y = if edges.top {
            rect.y
        } else if edges.bottom {
            rect.bottom()
        } else {
            rect.y + rect.height / 2.0
        };
        Point::new(x, y)
    }

    /// First handle (in [`ResizeHandle::ALL`] order) whose hit box holds `point`.
    pub fn hit_test(rect: &Rect, point: Point) -> Option<ResizeHandle> {
        ResizeHandle::ALL.into_iter().find(|handle| {
            let anchor = handle.anchor(rect);
            (point.x - anchor.x).abs() < HANDLE_HIT_RADIUS
                && (point.y - anchor.y).abs() < HANDLE_HIT_RADIUS
        })
    }

    /// Move this handle's edges by `delta`. The result may have negative
    /// extents; it is raw input for the size rules and the solver.
    pub fn drag(self, rect: &Rect, delta: Point) -> Rect {
        let edges = self.edges();
        let mut out = *rect;
        if edges.left {
            out.x += delta.x;
            out.width -= delta.x;
        }
        if edges.right {
            out.width += delta.x;
        }
        if edges.top {
            out.y += delta.y;
            out.height -= delta.y;
        }
        if edges.bottom {
            out.height += delta.y;
        }
        out
    }

    /// Reposition `sized` so the edges this handle does not drag stay where
    /// they were in `raw`.
    pub fn pin_opposite_edges(self, raw: &Rect, sized: Rect) -> Rect {
        let edges = self.edges();
        let mut out = sized;
        out.x = if edges.left {
            raw.right() - sized.width
        } else {
            raw.x
        };
        out.y = if edges.top {
            raw.bottom() - sized.height
        } else {
            raw.y
        };
        out
    }
}
