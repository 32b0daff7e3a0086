//! Interactive layout editor over the shared layout registry.
//!
//! Pointer moves are coalesced to one per animation frame: the host forwards
//! every move, schedules a frame only when asked to, and calls
//! [`LayoutBuilder::on_animation_frame`] from it.

use super::gesture::{EditConstraints, ResizeHandle, drag_slot_position, resize_slot};
use crate::constants::{DEFAULT_SLOT_Z_INDEX, MIN_SLOT_PERCENT};
use crate::error::{LayoutError, LayoutResult};
use crate::geometry::{Point, Size};
use crate::layout::{
    CollisionSettings, GridSettings, Layout, LayoutPatch, SharedLayouts, Slot, SlotPatch,
    SlotPosition, SlotSize,
};
use crate::notifications::{Notice, NoticeQueue};
use crate::profile_scope;
use tracing::{debug, info, warn};

/// Fallback edge length when a numeric input is blank or invalid (percent)
const INPUT_FALLBACK_SIZE: f64 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum BuilderGesture {
    Idle,
    Dragging {
        slot_id: u32,
        start_pointer: Point,
        start_pos: SlotPosition,
        start_size: SlotSize,
    },
    Resizing {
        slot_id: u32,
        handle: ResizeHandle,
        start_pointer: Point,
        start_pos: SlotPosition,
        start_size: SlotSize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Raw values of the slot inspector fields. Non-finite numbers count as blank.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotInputs {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: Option<i32>,
}

/// Slot geometry after a builder frame, for the host to redraw.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotFrame {
    pub slot_id: u32,
    pub position: SlotPosition,
    pub size: SlotSize,
}

pub struct LayoutBuilder {
    layouts: SharedLayouts,
    viewport: Size,
    max_instances: u32,
    open: bool,
    current: Option<String>,
    selected: Option<u32>,
    gesture: BuilderGesture,
    pending_pointer: Option<Point>,
    frame_requested: bool,
    notices: NoticeQueue,
}

impl LayoutBuilder {
    pub fn new(layouts: SharedLayouts, viewport: Size, max_instances: u32) -> Self {
        Self {
            layouts,
            viewport,
            max_instances: max_instances.max(1),
            open: false,
            current: None,
            selected: None,
            gesture: BuilderGesture::Idle,
            pending_pointer: None,
            frame_requested: false,
            notices: NoticeQueue::new(),
        }
    }

    // ==================== Open / Close ====================

    /// Show the builder, loading the first layout or creating `Default`.
    pub fn open(&mut self) -> String {
        self.open = true;
        let existing = self
            .current
            .clone()
            .filter(|id| self.layouts.read().get_layout(id).is_some())
            .or_else(|| self.first_layout_id());
        let id = match existing {
            Some(id) => {
                self.select_layout(&id);
                id
            }
            None => self.create_layout(),
        };
        info!(layout = %id, "Layout builder opened");
        id
    }

    pub fn close(&mut self) {
        self.cancel_gesture();
        self.open = false;
        debug!("Layout builder closed");
    }

    /// Make the edited layout active and close. Returns the applied id.
    pub fn apply_and_close(&mut self) -> Option<String> {
        let applied = self
            .current
            .clone()
            .filter(|id| self.layouts.write().set_active_layout(Some(id.as_str())));
        if applied.is_some() {
            self.notices.push(Notice::success("Layout applied"));
        }
        self.close();
        applied
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn set_viewport(&mut self, viewport: Size) {
        self.viewport = viewport;
    }

    pub fn set_max_instances(&mut self, max_instances: u32) {
        self.max_instances = max_instances.max(1);
    }

    pub fn current_layout_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    pub fn current_layout(&self) -> Option<Layout> {
        let id = self.current.as_deref()?;
        self.layouts.read().get_layout(id).cloned()
    }

    pub fn selected_slot(&self) -> Option<u32> {
        self.selected
    }

    /// Whether a drag or resize is in progress.
    pub fn is_editing(&self) -> bool {
        self.gesture != BuilderGesture::Idle
    }

    pub fn drain_notices(&mut self) -> Vec<Notice> {
        self.notices.drain()
    }

    // ==================== Layouts ====================

    /// Create `Default` (empty registry) or `Layout N` and load it.
    pub fn create_layout(&mut self) -> String {
        let id = {
            let mut layouts = self.layouts.write();
            let count = layouts.len();
            let name = if count == 0 {
                "Default".to_string()
            } else {
                format!("Layout {}", count + 1)
            };
            layouts.create_layout(name)
        };
        self.select_layout(&id);
        id
    }

    pub fn load_layout(&mut self, id: &str) -> LayoutResult<()> {
        if self.layouts.read().get_layout(id).is_none() {
            return Err(LayoutError::NotFound(id.to_string()));
        }
        self.select_layout(id);
        Ok(())
    }

    pub fn rename_layout(&mut self, name: &str) -> LayoutResult<()> {
        let id = self.require_layout()?;
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.layouts
            .write()
            .update_layout(&id, LayoutPatch::rename(name))?;
        self.notices
            .push(Notice::success(format!("Layout renamed to \"{name}\"")));
        Ok(())
    }

    /// Delete the edited layout and move to the first remaining one, or a
    /// fresh layout when none remain. Returns the id now being edited.
    pub fn delete_layout(&mut self) -> LayoutResult<String> {
        let id = self.require_layout()?;
        self.cancel_gesture();
        self.layouts.write().delete_layout(&id)?;
        self.current = None;
        self.selected = None;

        match self.first_layout_id() {
            Some(next) => {
                self.select_layout(&next);
                self.notices.push(Notice::success("Layout deleted"));
                Ok(next)
            }
            None => {
                let next = self.create_layout();
                self.notices
                    .push(Notice::success("Layout deleted. Created new layout."));
                Ok(next)
            }
        }
    }

    /// Rename (when `name` is non-blank) and write the registry.
    pub fn save(&mut self, name: Option<&str>) -> LayoutResult<()> {
        let id = self.require_layout()?;
        let mut layouts = self.layouts.write();
        if let Some(name) = name.map(str::trim).filter(|n| !n.is_empty()) {
            layouts.update_layout(&id, LayoutPatch::rename(name))?;
        }
        match layouts.persist() {
            Ok(()) => self.notices.push(Notice::success("Layout saved")),
            Err(e) => {
                warn!(error = %e, "Failed to save layout registry");
                self.notices.push(Notice::error("Failed to save layout"));
            }
        }
        Ok(())
    }

    pub fn update_grid_settings(&mut self, grid: GridSettings) -> LayoutResult<()> {
        let id = self.require_layout()?;
        self.layouts.write().update_layout(
            &id,
            LayoutPatch {
                grid_settings: Some(grid),
                ..LayoutPatch::default()
            },
        )
    }

    pub fn update_collision_settings(&mut self, collision: CollisionSettings) -> LayoutResult<()> {
        let id = self.require_layout()?;
        self.layouts.write().update_layout(
            &id,
            LayoutPatch {
                collision_settings: Some(collision),
                ..LayoutPatch::default()
            },
        )
    }

    // ==================== Slots ====================

    pub fn select_slot(&mut self, slot_id: u32) -> LayoutResult<()> {
        let id = self.require_layout()?;
        let exists = self
            .layouts
            .read()
            .get_layout(&id)
            .is_some_and(|layout| layout.slot(slot_id).is_some());
        if !exists {
            return Err(LayoutError::SlotNotFound {
                layout_id: id,
                slot_id,
            });
        }
        self.selected = Some(slot_id);
        Ok(())
    }

    pub fn add_slot(&mut self) -> LayoutResult<Slot> {
        let id = self.require_layout()?;
        let result = self.layouts.write().add_slot(&id, self.max_instances);
        match result {
            Ok(slot) => {
                self.selected = Some(slot.id);
                self.notices
                    .push(Notice::success(format!("Slot {} added", slot.id)));
                Ok(slot)
            }
            Err(e) => {
                if let LayoutError::CapacityExceeded { max } = e {
                    self.notices
                        .push(Notice::warning(format!("Maximum of {max} slots reached")));
                }
                Err(e)
            }
        }
    }

    pub fn remove_selected_slot(&mut self) -> LayoutResult<Slot> {
        let (id, slot_id) = self.require_slot()?;
        let result = self.layouts.write().remove_slot(&id, slot_id);
        match result {
            Ok(slot) => {
                self.selected = self.first_slot_id(&id);
                self.notices.push(Notice::success("Slot removed"));
                Ok(slot)
            }
            Err(e) => {
                if e == LayoutError::LastSlot {
                    self.notices
                        .push(Notice::warning("A layout needs at least one slot"));
                }
                Err(e)
            }
        }
    }

    /// Swap the selected slot with its neighbour, then renumber so ids follow
    /// the new order. Returns `false` at either end of the list.
    pub fn move_slot(&mut self, direction: MoveDirection) -> LayoutResult<bool> {
        let (id, slot_id) = self.require_slot()?;
        let mut layouts = self.layouts.write();
        let layout = layouts
            .get_layout(&id)
            .ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        let index = layout.slot_index(slot_id).ok_or_else(|| LayoutError::SlotNotFound {
            layout_id: id.clone(),
            slot_id,
        })?;
        let new_index = match direction {
            MoveDirection::Up => index.checked_sub(1),
            MoveDirection::Down => Some(index + 1).filter(|i| *i < layout.slots.len()),
        };
        let Some(new_index) = new_index else {
            return Ok(false);
        };

        layouts.reorder_slot(&id, slot_id, new_index)?;
        layouts.renumber_slots(&id)?;
        self.selected = layouts
            .get_layout(&id)
            .and_then(|layout| layout.slots.get(new_index))
            .map(|slot| slot.id);
        self.notices.push(Notice::info(format!(
            "Slot moved to position {}",
            new_index + 1
        )));
        Ok(true)
    }

    /// Commit the slot inspector fields to the selected slot.
    pub fn update_slot_from_inputs(&mut self, inputs: SlotInputs) -> LayoutResult<SlotFrame> {
        let (id, slot_id) = self.require_slot()?;
        let or_default = |value: f64, fallback: f64| {
            if value.is_finite() && value != 0.0 {
                value
            } else {
                fallback
            }
        };
        let width = or_default(inputs.width, INPUT_FALLBACK_SIZE).max(MIN_SLOT_PERCENT);
        let height = or_default(inputs.height, INPUT_FALLBACK_SIZE).max(MIN_SLOT_PERCENT);
        let x = or_default(inputs.x, 0.0).min(100.0 - width).max(0.0);
        let y = or_default(inputs.y, 0.0).min(100.0 - height).max(0.0);
        let z_index = inputs.z_index.unwrap_or(DEFAULT_SLOT_Z_INDEX);

        let position = SlotPosition::new(x, y);
        let size = SlotSize::new(width, height);
        self.layouts.write().update_slot(
            &id,
            slot_id,
            SlotPatch {
                z_index: Some(z_index),
                ..SlotPatch::geometry(position, size)
            },
        )?;
        Ok(SlotFrame {
            slot_id,
            position,
            size,
        })
    }

    // ==================== Pointer Gestures ====================

    pub fn begin_drag(&mut self, slot_id: u32, pointer: Point) -> LayoutResult<()> {
        let (start_pos, start_size) = self.slot_geometry(slot_id)?;
        self.selected = Some(slot_id);
        self.gesture = BuilderGesture::Dragging {
            slot_id,
            start_pointer: pointer,
            start_pos,
            start_size,
        };
        Ok(())
    }

    pub fn begin_resize(&mut self, slot_id: u32, handle: ResizeHandle, pointer: Point) -> LayoutResult<()> {
        let (start_pos, start_size) = self.slot_geometry(slot_id)?;
        self.selected = Some(slot_id);
        self.gesture = BuilderGesture::Resizing {
            slot_id,
            handle,
            start_pointer: pointer,
            start_pos,
            start_size,
        };
        Ok(())
    }

    /// Record a pointer move. Returns `true` when the host must request an
    /// animation frame; moves arriving before that frame only replace the
    /// pending position.
    pub fn pointer_move(&mut self, pointer: Point) -> bool {
        if !self.is_editing() {
            return false;
        }
        self.pending_pointer = Some(pointer);
        !std::mem::replace(&mut self.frame_requested, true)
    }

    /// Process the latest pointer position and preview it in the registry.
    pub fn on_animation_frame(&mut self) -> Option<SlotFrame> {
        self.frame_requested = false;
        let pointer = self.pending_pointer.take()?;
        profile_scope!("builder_frame");

        let frame = self.frame_for(pointer)?;
        let id = self.current.clone()?;
        let result = self.layouts.write().preview_slot(
            &id,
            frame.slot_id,
            SlotPatch::geometry(frame.position, frame.size),
        );
        match result {
            Ok(()) => Some(frame),
            Err(e) => {
                debug!(error = %e, "Dropping builder frame");
                self.cancel_gesture();
                None
            }
        }
    }

    /// End the gesture, applying any pending move, and persist the slot.
    pub fn pointer_up(&mut self) -> LayoutResult<Option<SlotFrame>> {
        if !self.is_editing() {
            return Ok(None);
        }
        let last = self.pending_pointer.take().and_then(|p| self.frame_for(p));
        let slot_id = match self.gesture {
            BuilderGesture::Dragging { slot_id, .. } | BuilderGesture::Resizing { slot_id, .. } => slot_id,
            BuilderGesture::Idle => return Ok(None),
        };
        self.cancel_gesture();

        let id = self.require_layout()?;
        let mut layouts = self.layouts.write();
        if let Some(frame) = last {
            layouts.preview_slot(&id, frame.slot_id, SlotPatch::geometry(frame.position, frame.size))?;
        }
        if let Err(e) = layouts.persist() {
            warn!(error = %e, "Failed to persist slot edit");
        }
        let slot = layouts
            .get_layout(&id)
            .and_then(|layout| layout.slot(slot_id))
            .map(|slot| SlotFrame {
                slot_id,
                position: slot.position,
                size: slot.size,
            });
        Ok(slot)
    }

    fn frame_for(&self, pointer: Point) -> Option<SlotFrame> {
        let constraints = self.constraints()?;
        match self.gesture {
            BuilderGesture::Idle => None,
            BuilderGesture::Dragging {
                slot_id,
                start_pointer,
                start_pos,
                start_size,
            } => {
                let delta = constraints.delta_percent(start_pointer, pointer);
                Some(SlotFrame {
                    slot_id,
                    position: drag_slot_position(start_pos, start_size, delta, &constraints),
                    size: start_size,
                })
            }
            BuilderGesture::Resizing {
                slot_id,
                handle,
                start_pointer,
                start_pos,
                start_size,
            } => {
                let delta = constraints.delta_percent(start_pointer, pointer);
                let (position, size) = resize_slot(handle, start_pos, start_size, delta, &constraints);
                Some(SlotFrame {
                    slot_id,
                    position,
                    size,
                })
            }
        }
    }

    // ==================== Helpers ====================

    fn cancel_gesture(&mut self) {
        self.gesture = BuilderGesture::Idle;
        self.pending_pointer = None;
        self.frame_requested = false;
    }

    fn select_layout(&mut self, id: &str) {
        self.cancel_gesture();
        self.current = Some(id.to_string());
        self.selected = self.first_slot_id(id);
    }

    fn first_layout_id(&self) -> Option<String> {
        self.layouts
            .read()
            .list_layouts()
            .into_iter()
            .next()
            .map(|summary| summary.id)
    }

    fn first_slot_id(&self, id: &str) -> Option<u32> {
        self.layouts
            .read()
            .get_layout(id)
            .and_then(|layout| layout.slots.first())
            .map(|slot| slot.id)
    }

    fn require_layout(&self) -> LayoutResult<String> {
        self.current.clone().ok_or(LayoutError::NoSelection)
    }

    fn require_slot(&self) -> LayoutResult<(String, u32)> {
        let id = self.require_layout()?;
        let slot_id = self.selected.ok_or(LayoutError::NoSelection)?;
        Ok((id, slot_id))
    }

    fn slot_geometry(&self, slot_id: u32) -> LayoutResult<(SlotPosition, SlotSize)> {
        let id = self.require_layout()?;
        let layouts = self.layouts.read();
        let layout = layouts
            .get_layout(&id)
            .ok_or_else(|| LayoutError::NotFound(id.clone()))?;
        let slot = layout.slot(slot_id).ok_or_else(|| LayoutError::SlotNotFound {
            layout_id: id.clone(),
            slot_id,
        })?;
        Ok((slot.position, slot.size))
    }

    fn constraints(&self) -> Option<EditConstraints> {
        let id = self.current.as_deref()?;
        let layouts = self.layouts.read();
        let layout = layouts.get_layout(id)?;
        Some(EditConstraints {
            grid: layout.grid_settings,
            collision: layout.collision_settings,
            viewport: self.viewport,
        })
    }
}

impl std::fmt::Debug for LayoutBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutBuilder")
            .field("open", &self.open)
            .field("current", &self.current)
            .field("selected", &self.selected)
            .field("gesture", &self.gesture)
            .finish_non_exhaustive()
    }
}
