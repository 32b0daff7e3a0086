//! Layout builder - visual slot editor.
//!
//! - `gesture` - drag/resize math, resize handles, snapping order
//! - `controller` - toolbar actions and frame-throttled pointer handling

mod controller;
mod gesture;

pub use controller::{LayoutBuilder, MoveDirection, SlotFrame, SlotInputs};
pub use gesture::{EditConstraints, ResizeHandle, drag_slot_position, resize_slot};
