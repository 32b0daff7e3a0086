//! Viewer lifecycle and gesture state.
//!
//! ## Gesture Transitions
//!
//! ```text
//! Idle -> Panning     (pointer down on image while zoomed)
//! Idle -> Dragging    (pointer down on image at 100%, not locked)
//! Idle -> Resizing    (pointer down on a resize handle, free viewers only)
//! Any  -> Pinching    (second touch point while zoom is enabled)
//!
//! Any -> Idle         (pointer up / touch end)
//! ```

use crate::geometry::{Point, Size};

/// Where a viewer is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    /// Mounted, waiting for the image's natural dimensions
    #[default]
    Opening,
    Interactive,
    /// Fading out, no longer accepts input
    Closing,
    /// Unmounted, every binding released
    Disposed,
}

impl Lifecycle {
    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }

    pub fn is_closing_or_gone(&self) -> bool {
        matches!(self, Self::Closing | Self::Disposed)
    }
}

/// Input device that started a resize. Mouse resizes follow the width,
/// touch resizes follow the larger of the two deltas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeKind {
    Mouse,
    Touch,
}

/// The gesture in progress on one viewer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    #[default]
    Idle,

    /// Moving the whole window
    Dragging {
        start_pointer: Point,
        start_origin: Point,
        /// Last origin that passed the overlap check
        last_valid: Point,
    },

    /// Moving the zoomed image inside its window
    Panning { start_pointer: Point, start_pan: Point },

    /// Two-finger zoom
    Pinching { initial_distance: f64, initial_zoom: f64 },

    Resizing {
        kind: ResizeKind,
        start_pointer: Point,
        start_size: Size,
    },
}

impl GestureState {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_dragging(&self) -> bool {
        matches!(self, Self::Dragging { .. })
    }

    pub fn is_panning(&self) -> bool {
        matches!(self, Self::Panning { .. })
    }

    pub fn is_pinching(&self) -> bool {
        matches!(self, Self::Pinching { .. })
    }

    pub fn is_resizing(&self) -> bool {
        matches!(self, Self::Resizing { .. })
    }

    /// Short tag for logs and snapshots.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging { .. } => "dragging",
            Self::Panning { .. } => "panning",
            Self::Pinching { .. } => "pinching",
            Self::Resizing { .. } => "resizing",
        }
    }

    pub fn reset(&mut self) {
        *self = Self::Idle;
    }

    pub fn start_dragging(&mut self, pointer: Point, origin: Point) {
        *self = Self::Dragging {
            start_pointer: pointer,
            start_origin: origin,
            last_valid: origin,
        };
    }

    pub fn start_panning(&mut self, pointer: Point, pan: Point) {
        *self = Self::Panning {
            start_pointer: pointer,
            start_pan: pan,
        };
    }

    pub fn start_pinching(&mut self, distance: f64, zoom: f64) {
        *self = Self::Pinching {
            initial_distance: distance,
            initial_zoom: zoom,
        };
    }

    pub fn start_resizing(&mut self, kind: ResizeKind, pointer: Point, size: Size) {
        *self = Self::Resizing {
            kind,
            start_pointer: pointer,
            start_size: size,
        };
    }
}
