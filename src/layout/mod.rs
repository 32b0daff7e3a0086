//! Layout model - named sets of percent-based slots that viewers snap into.
//!
//! - `model` - layout, slot, grid and collision types plus patch structs
//! - `manager` - the registry: CRUD, active layout, viewer-to-slot lookup

mod manager;
mod model;

pub use manager::{LayoutManager, SharedLayouts};
pub use model::{
    Borders, CollisionSettings, GridSettings, Layout, LayoutPatch, LayoutScope, LayoutSummary,
    Slot, SlotPatch, SlotPosition, SlotSize, SnapMode, ViewerConfig,
};
