//! Viewer instance state machine.
//!
//! - `state` - lifecycle and gesture enums
//! - `input` - normalized pointer / touch / wheel events
//! - `instance` - one viewer window and its input dispatcher
//! - `placement` - where a viewer goes, with or without a layout slot

mod input;
mod instance;
mod placement;
mod state;

pub use input::{PointerKind, PointerTarget, ViewerInput};
pub use instance::{InputResponse, InstanceKey, InteractionContext, ViewerInstance};
pub use placement::{Placement, PlacementRequest, SlotBinding, compute_placement};
pub use state::{GestureState, Lifecycle, ResizeKind};
