//! Normalized input events delivered to a viewer.

use crate::geometry::Point;

/// Part of the viewer a pointer went down on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    Image,
    ResizeHandle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerKind {
    Mouse,
    Touch,
}

/// One input event, positions in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerInput {
    PointerDown {
        pos: Point,
        target: PointerTarget,
        kind: PointerKind,
    },
    PointerMove {
        pos: Point,
    },
    /// Pointer up, touch end or touch cancel
    PointerUp,
    TwoTouchDown {
        a: Point,
        b: Point,
    },
    TwoTouchMove {
        a: Point,
        b: Point,
    },
    /// Negative `delta_y` zooms in
    Wheel {
        pos: Point,
        delta_y: f64,
    },
    /// Double click or double tap
    DoubleClick,
}

impl ViewerInput {
    /// Inputs that start an interaction and move focus to the viewer.
    pub fn takes_focus(&self) -> bool {
        matches!(
            self,
            Self::PointerDown { .. }
                | Self::TwoTouchDown { .. }
                | Self::Wheel { .. }
                | Self::DoubleClick
        )
    }
}
