//! A single floating viewer: geometry, zoom/pan and the gesture dispatcher.

use super::input::{PointerKind, PointerTarget, ViewerInput};
use super::placement::{Placement, SlotBinding};
use super::state::{GestureState, Lifecycle, ResizeKind};
use crate::constants::{MINIMIZED_HEIGHT, MIN_RESIZE_PX, MIN_ZOOM, ZOOM_STEP};
use crate::geometry::{
    ObjectFit, Point, Rect, Size, aspect_locked_resize, clamp_pan, clamp_to_viewport,
    pinch_center, pinch_distance, zoom_toward_point,
};
use crate::profile_scope;
use crate::settings::Settings;
use crate::spatial_index::SpatialIndex;
use serde::Serialize;
use std::fmt;
use tracing::debug;

/// Render-target address of one viewer. Never reused, unlike viewer ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct InstanceKey(pub u64);

impl fmt::Display for InstanceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "viewer-{}", self.0)
    }
}

/// What the pool needs to know while handling an input.
#[derive(Debug, Clone, Copy)]
pub struct InteractionContext<'a> {
    pub settings: &'a Settings,
    pub viewport: Size,
    /// Frames of the active viewers, this one included
    pub others: &'a SpatialIndex,
    pub prevent_overlap: bool,
}

/// What an input changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputResponse {
    /// Window position or size moved
    pub frame_changed: bool,
    /// Zoom level or pan moved
    pub transform_changed: bool,
}

impl InputResponse {
    const NONE: Self = Self {
        frame_changed: false,
        transform_changed: false,
    };

    const FRAME: Self = Self {
        frame_changed: true,
        transform_changed: false,
    };

    const TRANSFORM: Self = Self {
        frame_changed: false,
        transform_changed: true,
    };

    pub fn changed(&self) -> bool {
        self.frame_changed || self.transform_changed
    }
}

#[derive(Debug, Clone)]
pub struct ViewerInstance {
    key: InstanceKey,
    viewer_id: u32,
    image_url: String,
    lifecycle: Lifecycle,
    gesture: GestureState,
    natural: Option<Size>,
    frame: Rect,
    image: Size,
    object_fit: ObjectFit,
    slot: Option<SlotBinding>,
    zoom_level: f64,
    pan: Point,
    locked: bool,
    minimized: bool,
}

impl ViewerInstance {
    pub fn new(key: InstanceKey, viewer_id: u32, image_url: impl Into<String>, locked: bool) -> Self {
        Self {
            key,
            viewer_id,
            image_url: image_url.into(),
            lifecycle: Lifecycle::Opening,
            gesture: GestureState::Idle,
            natural: None,
            frame: Rect::default(),
            image: Size::default(),
            object_fit: ObjectFit::Fill,
            slot: None,
            zoom_level: MIN_ZOOM,
            pan: Point::ZERO,
            locked,
            minimized: false,
        }
    }

    // ==================== Accessors ====================

    pub fn key(&self) -> InstanceKey {
        self.key
    }

    pub fn viewer_id(&self) -> u32 {
        self.viewer_id
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn natural(&self) -> Option<Size> {
        self.natural
    }

    /// Window box at full size, also while minimized.
    pub fn frame(&self) -> Rect {
        self.frame
    }

    /// Window box as drawn: minimized viewers collapse to their title bar.
    pub fn visible_frame(&self) -> Rect {
        if self.minimized {
            Rect {
                height: MINIMIZED_HEIGHT.min(self.frame.height),
                ..self.frame
            }
        } else {
            self.frame
        }
    }

    pub fn image_size(&self) -> Size {
        self.image
    }

    pub fn object_fit(&self) -> ObjectFit {
        self.object_fit
    }

    pub fn slot(&self) -> Option<&SlotBinding> {
        self.slot.as_ref()
    }

    pub fn is_slotted(&self) -> bool {
        self.slot.is_some()
    }

    pub fn zoom_level(&self) -> f64 {
        self.zoom_level
    }

    pub fn pan(&self) -> Point {
        self.pan
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn is_minimized(&self) -> bool {
        self.minimized
    }

    // ==================== Lifecycle ====================

    /// Natural dimensions arrived: take the computed placement and accept input.
    pub fn on_loaded(&mut self, natural: Size, placement: Placement) {
        self.natural = Some(natural);
        self.apply_placement(placement, false);
        self.lifecycle = Lifecycle::Interactive;
        debug!(key = %self.key, viewer_id = self.viewer_id, "Viewer interactive");
    }

    /// Replace geometry, e.g. after a viewport or layout change. Zoom is kept
    /// and the pan re-clamped against the new image size unless `free_pan`.
    pub fn apply_placement(&mut self, placement: Placement, free_pan: bool) {
        self.frame = placement.frame;
        self.image = placement.image;
        self.object_fit = placement.object_fit;
        self.slot = placement.slot;
        self.pan = clamp_pan(self.pan, self.zoom_level, self.image, free_pan);
    }

    /// Pull a free viewer back inside a resized viewport.
    pub fn clamp_into(&mut self, viewport: Size) -> bool {
        let visible = self.visible_frame();
        let origin = clamp_to_viewport(visible.left, visible.top, visible.width, visible.height, viewport);
        if origin == self.frame.origin() {
            return false;
        }
        self.frame = self.frame.with_origin(origin);
        true
    }

    pub fn begin_close(&mut self) {
        self.gesture.reset();
        self.lifecycle = Lifecycle::Closing;
    }

    pub fn dispose(&mut self) {
        self.gesture.reset();
        self.lifecycle = Lifecycle::Disposed;
    }

    // ==================== Lock / Minimize ====================

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        if locked && self.gesture.is_dragging() {
            self.gesture.reset();
        }
    }

    /// Flip the minimized flag. On restore the window moves back on screen
    /// if its full-size box would extend past the viewport.
    pub fn toggle_minimize(&mut self, viewport: Size) -> bool {
        self.gesture.reset();
        self.minimized = !self.minimized;
        if !self.minimized {
            let origin = clamp_to_viewport(
                self.frame.left,
                self.frame.top,
                self.frame.width,
                self.frame.height,
                viewport,
            );
            self.frame = self.frame.with_origin(origin);
        }
        self.minimized
    }

    // ==================== Input ====================

    /// Single dispatch point for every gesture input.
    pub fn handle_input(&mut self, input: ViewerInput, ctx: &InteractionContext<'_>) -> InputResponse {
        if !self.lifecycle.is_interactive() {
            return InputResponse::NONE;
        }
        profile_scope!("viewer_input");

        match input {
            ViewerInput::PointerDown { pos, target, kind } => {
                self.on_pointer_down(pos, target, kind, ctx);
                InputResponse::NONE
            }
            ViewerInput::PointerMove { pos } => self.on_pointer_move(pos, ctx),
            ViewerInput::PointerUp => {
                if !self.gesture.is_idle() {
                    debug!(key = %self.key, gesture = self.gesture.name(), "Gesture ended");
                    self.gesture.reset();
                }
                InputResponse::NONE
            }
            ViewerInput::TwoTouchDown { a, b } => {
                let distance = pinch_distance(a, b);
                if ctx.settings.enable_zoom && distance > 0.0 {
                    self.gesture.start_pinching(distance, self.zoom_level);
                }
                InputResponse::NONE
            }
            ViewerInput::TwoTouchMove { a, b } => self.on_pinch_move(a, b, ctx),
            ViewerInput::Wheel { pos, delta_y } => self.on_wheel(pos, delta_y, ctx),
            ViewerInput::DoubleClick => self.reset_zoom(),
        }
    }

    fn on_pointer_down(
        &mut self,
        pos: Point,
        target: PointerTarget,
        kind: PointerKind,
        ctx: &InteractionContext<'_>,
    ) {
        match target {
            PointerTarget::ResizeHandle => {
                if self.is_slotted() || self.minimized {
                    return;
                }
                let kind = match kind {
                    PointerKind::Mouse => ResizeKind::Mouse,
                    PointerKind::Touch => ResizeKind::Touch,
                };
                self.gesture.start_resizing(kind, pos, self.frame.size());
            }
            PointerTarget::Image => {
                if ctx.settings.enable_zoom && self.zoom_level > MIN_ZOOM {
                    self.gesture.start_panning(pos, self.pan);
                } else if !self.locked {
                    self.gesture.start_dragging(pos, self.frame.origin());
                }
            }
        }
    }

    fn on_pointer_move(&mut self, pos: Point, ctx: &InteractionContext<'_>) -> InputResponse {
        match self.gesture {
            GestureState::Dragging {
                start_pointer,
                start_origin,
                last_valid,
            } => {
                let visible = self.visible_frame();
                let candidate = start_origin.offset(pos.delta_from(start_pointer));
                let clamped = clamp_to_viewport(
                    candidate.x,
                    candidate.y,
                    visible.width,
                    visible.height,
                    ctx.viewport,
                );
                let target = visible.with_origin(clamped);
                if ctx.prevent_overlap && ctx.others.any_overlap(&target, self.viewer_id) {
                    // Stay at the last accepted position
                    return InputResponse::NONE;
                }
                if clamped == last_valid {
                    return InputResponse::NONE;
                }
                self.frame = self.frame.with_origin(clamped);
                self.gesture = GestureState::Dragging {
                    start_pointer,
                    start_origin,
                    last_valid: clamped,
                };
                InputResponse::FRAME
            }
            GestureState::Panning {
                start_pointer,
                start_pan,
            } => {
                let pan = start_pan.offset(pos.delta_from(start_pointer));
                self.set_pan(clamp_pan(pan, self.zoom_level, self.image, ctx.settings.free_pan))
            }
            GestureState::Resizing {
                kind,
                start_pointer,
                start_size,
            } => {
                let delta = pos.delta_from(start_pointer);
                let delta = match kind {
                    ResizeKind::Mouse => delta.x,
                    ResizeKind::Touch => delta.x.max(delta.y),
                };
                self.resize(start_size, delta, ctx.settings.free_pan)
            }
            GestureState::Pinching { .. } | GestureState::Idle => InputResponse::NONE,
        }
    }

    fn resize(&mut self, start_size: Size, delta: f64, free_pan: bool) -> InputResponse {
        let Some(aspect) = self
            .natural
            .and_then(|n| n.aspect_ratio())
            .or_else(|| start_size.aspect_ratio())
        else {
            return InputResponse::NONE;
        };
        let max = self.natural.unwrap_or(start_size);
        let size = aspect_locked_resize(start_size, delta, aspect, MIN_RESIZE_PX, max);
        if size == self.frame.size() {
            return InputResponse::NONE;
        }
        self.frame = Rect::from_parts(self.frame.origin(), size);
        self.image = size;
        self.pan = clamp_pan(self.pan, self.zoom_level, self.image, free_pan);
        InputResponse::FRAME
    }

    fn on_pinch_move(&mut self, a: Point, b: Point, ctx: &InteractionContext<'_>) -> InputResponse {
        let GestureState::Pinching {
            initial_distance,
            initial_zoom,
        } = self.gesture
        else {
            return InputResponse::NONE;
        };
        let distance = pinch_distance(a, b);
        let zoom = (initial_zoom * distance / initial_distance).clamp(MIN_ZOOM, ctx.settings.max_zoom);
        self.zoom_to(zoom, pinch_center(a, b), ctx)
    }

    fn on_wheel(&mut self, pos: Point, delta_y: f64, ctx: &InteractionContext<'_>) -> InputResponse {
        if !ctx.settings.enable_zoom || delta_y == 0.0 {
            return InputResponse::NONE;
        }
        let step = if delta_y < 0.0 { ZOOM_STEP } else { -ZOOM_STEP };
        let zoom = (self.zoom_level + step).clamp(MIN_ZOOM, ctx.settings.max_zoom);
        self.zoom_to(zoom, pos, ctx)
    }

    /// Zoom keeping the image point under `focus` fixed, then clamp the pan.
    fn zoom_to(&mut self, zoom: f64, focus: Point, ctx: &InteractionContext<'_>) -> InputResponse {
        if zoom == self.zoom_level {
            return InputResponse::NONE;
        }
        let to_center = self.visible_frame().center().delta_from(focus);
        let pan = zoom_toward_point(self.zoom_level, zoom, self.pan, to_center);
        self.zoom_level = zoom;
        self.pan = clamp_pan(pan, zoom, self.image, ctx.settings.free_pan);
        InputResponse::TRANSFORM
    }

    fn reset_zoom(&mut self) -> InputResponse {
        if self.zoom_level == MIN_ZOOM && self.pan == Point::ZERO {
            return InputResponse::NONE;
        }
        self.gesture.reset();
        self.zoom_level = MIN_ZOOM;
        self.pan = Point::ZERO;
        InputResponse::TRANSFORM
    }

    fn set_pan(&mut self, pan: Point) -> InputResponse {
        if pan == self.pan {
            return InputResponse::NONE;
        }
        self.pan = pan;
        InputResponse::TRANSFORM
    }
}
