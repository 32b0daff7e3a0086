//! Pure geometry helpers for viewer placement and interaction.
//!
//! Units are consistent per call: percent-of-viewport for layout authoring,
//! pixels for everything that happens on screen. Nothing here holds state.

use crate::constants::MIN_ZOOM;
use serde::{Deserialize, Serialize};

/// A screen position or offset in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub const ZERO: Point = Point::new(0.0, 0.0);

    #[inline]
    pub fn delta_from(self, origin: Point) -> Point {
        Point::new(self.x - origin.x, self.y - origin.y)
    }

    #[inline]
    pub fn offset(self, delta: Point) -> Point {
        Point::new(self.x + delta.x, self.y + delta.y)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[inline]
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// Width over height, or `None` for a degenerate size.
    pub fn aspect_ratio(&self) -> Option<f64> {
        if self.width > 0.0 && self.height > 0.0 {
            Some(self.width / self.height)
        } else {
            None
        }
    }

    #[inline]
    pub fn scale(self, factor: f64) -> Size {
        Size::new(self.width * factor, self.height * factor)
    }
}

/// An on-screen box. Also the persisted `{left, top, width, height}` record.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[inline]
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn from_parts(origin: Point, size: Size) -> Self {
        Self::new(origin.x, origin.y, size.width, size.height)
    }

    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.left, self.top)
    }

    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn with_origin(self, origin: Point) -> Self {
        Self {
            left: origin.x,
            top: origin.y,
            ..self
        }
    }
}

/// Strategy for mapping an image onto a slot's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FitMode {
    /// Image fills its limiting dimension and the container shrinks to match
    #[default]
    Classic,
    Cover,
    Contain,
    Stretch,
    Center,
}

/// CSS `object-fit` the render target should use for the image element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectFit {
    Fill,
    Cover,
    Contain,
    None,
}

/// Output of [`compute_fit_mode`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitResult {
    /// Size of the window container
    pub container: Size,
    /// Size of the image element
    pub render: Size,
    pub object_fit: ObjectFit,
}

/// Scale `natural` down (never up) so it fits within `bounds`.
pub fn fit_within_box(natural: Size, bounds: Size) -> Size {
    if natural.width <= bounds.width && natural.height <= bounds.height {
        return natural;
    }
    if natural.width <= 0.0 || natural.height <= 0.0 {
        return natural;
    }
    let ratio = (bounds.width / natural.width).min(bounds.height / natural.height);
    natural.scale(ratio)
}

/// Largest box of the given aspect ratio that fits inside `bounds`.
fn aspect_box(bounds: Size, aspect_ratio: Option<f64>) -> Size {
    match aspect_ratio {
        Some(ratio) if ratio.is_finite() && ratio > 0.0 && bounds.height > 0.0 => {
            if bounds.width / bounds.height > ratio {
                Size::new(bounds.height * ratio, bounds.height)
            } else {
                Size::new(bounds.width, bounds.width / ratio)
            }
        }
        _ => bounds,
    }
}

/// Map an image of `natural` size onto a slot box using `mode`.
///
/// A slot `aspect_ratio` narrows the box to the largest box of that ratio
/// inside the slot before the mode is applied.
pub fn compute_fit_mode(
    mode: FitMode,
    slot: Size,
    natural: Size,
    aspect_ratio: Option<f64>,
) -> FitResult {
    let bounds = aspect_box(slot, aspect_ratio);

    if natural.aspect_ratio().is_none() {
        return FitResult {
            container: bounds,
            render: bounds,
            object_fit: ObjectFit::Fill,
        };
    }

    let contain_scale = (bounds.width / natural.width).min(bounds.height / natural.height);

    match mode {
        FitMode::Classic => {
            let render = natural.scale(contain_scale);
            FitResult {
                container: render,
                render,
                object_fit: ObjectFit::Fill,
            }
        }
        FitMode::Contain => FitResult {
            container: bounds,
            render: natural.scale(contain_scale),
            object_fit: ObjectFit::Contain,
        },
        FitMode::Cover => {
            let scale = (bounds.width / natural.width).max(bounds.height / natural.height);
            FitResult {
                container: bounds,
                render: natural.scale(scale),
                object_fit: ObjectFit::Cover,
            }
        }
        FitMode::Stretch => FitResult {
            container: bounds,
            render: bounds,
            object_fit: ObjectFit::Fill,
        },
        FitMode::Center => FitResult {
            container: bounds,
            render: fit_within_box(natural, bounds),
            object_fit: ObjectFit::None,
        },
    }
}

/// Half the linear overflow of a container zoomed to `zoom_level` percent.
pub fn pan_overflow(zoom_level: f64, container: Size) -> Point {
    let scale = zoom_level / 100.0;
    Point::new(
        (container.width * (scale - 1.0) / 2.0).max(0.0),
        (container.height * (scale - 1.0) / 2.0).max(0.0),
    )
}

/// Keep the zoomed image covering its container unless `free_pan` is set.
pub fn clamp_pan(pan: Point, zoom_level: f64, container: Size, free_pan: bool) -> Point {
    if free_pan {
        return pan;
    }
    let overflow = pan_overflow(zoom_level, container);
    Point::new(
        pan.x.clamp(-overflow.x, overflow.x),
        pan.y.clamp(-overflow.y, overflow.y),
    )
}

/// Rescale `pan` so the image point under the cursor stays fixed.
///
/// `point` is the vector from the cursor to the container centre.
pub fn zoom_toward_point(old_zoom: f64, new_zoom: f64, pan: Point, point: Point) -> Point {
    if new_zoom <= MIN_ZOOM || old_zoom <= 0.0 {
        return Point::ZERO;
    }
    let ratio = new_zoom / old_zoom;
    Point::new(
        pan.x * ratio + point.x * (ratio - 1.0),
        pan.y * ratio + point.y * (ratio - 1.0),
    )
}

pub fn pinch_distance(a: Point, b: Point) -> f64 {
    (a.x - b.x).hypot(a.y - b.y)
}

pub fn pinch_center(a: Point, b: Point) -> Point {
    Point::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Axis-aligned intersection test. Touching edges are not an overlap.
pub fn rects_overlap(a: &Rect, b: &Rect) -> bool {
    a.left < b.right() && b.left < a.right() && a.top < b.bottom() && b.top < a.bottom()
}

/// Clamp a box's origin so all of it stays on screen.
///
/// Boxes larger than the viewport on an axis pin to 0 on that axis.
pub fn clamp_to_viewport(left: f64, top: f64, width: f64, height: f64, viewport: Size) -> Point {
    let max_left = (viewport.width - width).max(0.0);
    let max_top = (viewport.height - height).max(0.0);
    Point::new(left.clamp(0.0, max_left), top.clamp(0.0, max_top))
}

/// Round `value` to the nearest multiple of `increment`.
pub fn snap_value(value: f64, increment: f64) -> f64 {
    if !(increment > 0.0) || !increment.is_finite() {
        return value;
    }
    (value / increment).round() * increment
}

/// Aspect-locked resize from `start` by a width delta.
///
/// Both edges stay within `[min_edge, max]`; when the bounds cannot all be
/// met the lower bound wins.
pub fn aspect_locked_resize(start: Size, delta: f64, aspect: f64, min_edge: f64, max: Size) -> Size {
    if !(aspect > 0.0) {
        return start;
    }
    let min_width = min_edge.max(min_edge * aspect);
    let max_width = max.width.min(max.height * aspect).max(min_width);
    let width = (start.width + delta).clamp(min_width, max_width);
    Size::new(width, width / aspect)
}
