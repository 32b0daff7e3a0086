//! Slot drag and resize math for the layout builder.
//!
//! Everything here works in percent of the viewport. Order of operations
//! matters: clamp, then snap, then clamp again so snapping never pushes a
//! slot off screen.

use crate::constants::MIN_SLOT_PERCENT;
use crate::geometry::{Point, Size, snap_value};
use crate::layout::{CollisionSettings, GridSettings, SlotPosition, SlotSize};
use std::str::FromStr;

/// One of the eight slot resize handles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResizeHandle {
    N,
    E,
    S,
    W,
    NE,
    SE,
    SW,
    NW,
}

impl ResizeHandle {
    pub const ALL: [ResizeHandle; 8] = [
        Self::N,
        Self::E,
        Self::S,
        Self::W,
        Self::NE,
        Self::SE,
        Self::SW,
        Self::NW,
    ];

    pub fn north(&self) -> bool {
        matches!(self, Self::N | Self::NE | Self::NW)
    }

    pub fn south(&self) -> bool {
        matches!(self, Self::S | Self::SE | Self::SW)
    }

    pub fn east(&self) -> bool {
        matches!(self, Self::E | Self::NE | Self::SE)
    }

    pub fn west(&self) -> bool {
        matches!(self, Self::W | Self::NW | Self::SW)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::N => "n",
            Self::E => "e",
            Self::S => "s",
            Self::W => "w",
            Self::NE => "ne",
            Self::SE => "se",
            Self::SW => "sw",
            Self::NW => "nw",
        }
    }
}

impl FromStr for ResizeHandle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|handle| handle.as_str() == s)
            .ok_or_else(|| format!("unknown resize handle: {s}"))
    }
}

/// Rules a builder gesture is constrained by.
#[derive(Debug, Clone, Copy)]
pub struct EditConstraints {
    pub grid: GridSettings,
    pub collision: CollisionSettings,
    pub viewport: Size,
}

impl EditConstraints {
    /// Pointer movement converted to percent of the viewport.
    pub fn delta_percent(&self, from: Point, to: Point) -> (f64, f64) {
        let delta = to.delta_from(from);
        let x = if self.viewport.width > 0.0 {
            delta.x / self.viewport.width * 100.0
        } else {
            0.0
        };
        let y = if self.viewport.height > 0.0 {
            delta.y / self.viewport.height * 100.0
        } else {
            0.0
        };
        (x, y)
    }

    fn snap_increment(&self) -> Option<(f64, f64)> {
        self.grid
            .snap
            .then(|| self.grid.snap_increment(self.viewport))
    }
}

fn clamp_origin(value: f64, extent: f64) -> f64 {
    value.min(100.0 - extent).max(0.0)
}

/// New slot origin for a drag of `delta` percent.
pub fn drag_slot_position(
    start: SlotPosition,
    size: SlotSize,
    delta: (f64, f64),
    constraints: &EditConstraints,
) -> SlotPosition {
    let offscreen = constraints.collision.prevent_offscreen;
    let mut x = start.x + delta.0;
    let mut y = start.y + delta.1;

    if offscreen {
        x = clamp_origin(x, size.width);
        y = clamp_origin(y, size.height);
    }

    if let Some((inc_x, inc_y)) = constraints.snap_increment() {
        x = snap_value(x, inc_x);
        y = snap_value(y, inc_y);
        if offscreen {
            x = clamp_origin(x, size.width);
            y = clamp_origin(y, size.height);
        }
    }

    SlotPosition::new(x, y)
}

/// New slot geometry for a resize from `handle` by `delta` percent.
///
/// North and west handles keep the opposite edge anchored.
pub fn resize_slot(
    handle: ResizeHandle,
    start_pos: SlotPosition,
    start_size: SlotSize,
    delta: (f64, f64),
    constraints: &EditConstraints,
) -> (SlotPosition, SlotSize) {
    let (dx, dy) = delta;
    let mut x = start_pos.x;
    let mut y = start_pos.y;
    let mut width = start_size.width;
    let mut height = start_size.height;

    if handle.east() {
        width = (start_size.width + dx).max(MIN_SLOT_PERCENT);
    }
    if handle.west() {
        let proposed = start_size.width - dx;
        if proposed >= MIN_SLOT_PERCENT {
            width = proposed;
            x = start_pos.x + dx;
        } else {
            width = MIN_SLOT_PERCENT;
            x = start_pos.x + start_size.width - MIN_SLOT_PERCENT;
        }
    }
    if handle.south() {
        height = (start_size.height + dy).max(MIN_SLOT_PERCENT);
    }
    if handle.north() {
        let proposed = start_size.height - dy;
        if proposed >= MIN_SLOT_PERCENT {
            height = proposed;
            y = start_pos.y + dy;
        } else {
            height = MIN_SLOT_PERCENT;
            y = start_pos.y + start_size.height - MIN_SLOT_PERCENT;
        }
    }

    width = width.max(MIN_SLOT_PERCENT);
    height = height.max(MIN_SLOT_PERCENT);

    if let Some((inc_x, inc_y)) = constraints.snap_increment() {
        width = snap_value(width, inc_x);
        height = snap_value(height, inc_y);
        if handle.west() {
            x = snap_value(x, inc_x);
        }
        if handle.north() {
            y = snap_value(y, inc_y);
        }
        width = width.max(inc_x);
        height = height.max(inc_y);
    }

    if constraints.collision.prevent_offscreen {
        if x < 0.0 {
            width += x;
            x = 0.0;
        }
        if y < 0.0 {
            height += y;
            y = 0.0;
        }
        if x + width > 100.0 {
            width = 100.0 - x;
        }
        if y + height > 100.0 {
            height = 100.0 - y;
        }
    }

    (SlotPosition::new(x, y), SlotSize::new(width, height))
}
