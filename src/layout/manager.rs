//! Layout registry - CRUD over layouts and slots, active layout tracking,
//! viewer-to-slot resolution.

use super::model::{
    Layout, LayoutPatch, LayoutSummary, Slot, SlotPatch, SlotPosition, SlotSize, ViewerConfig,
};
use crate::constants::{DEFAULT_ADDED_SLOT_SIZE, DEFAULT_LAYOUT_SLOT_SIZE};
use crate::error::{LayoutError, LayoutResult, StorageResult};
use crate::geometry::Size;
use crate::storage::LayoutStore;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Registry handle shared by the viewer pool and the layout builder.
/// Edits are user-paced, so the last writer wins.
pub type SharedLayouts = Arc<RwLock<LayoutManager>>;

/// Owns every user-authored layout and the active layout pointer.
///
/// Mutations persist to the durable store immediately (except
/// [`LayoutManager::preview_slot`]). A failed persist is logged and the
/// in-memory change is kept.
#[derive(Debug, Default)]
pub struct LayoutManager {
    layouts: BTreeMap<String, Layout>,
    active: Option<String>,
    store: Option<LayoutStore>,
}

impl LayoutManager {
    /// Load the registry from `store`.
    pub fn new(store: LayoutStore) -> Self {
        let layouts = store.load();
        info!(count = layouts.len(), "Layout registry ready");
        Self {
            layouts,
            active: None,
            store: Some(store),
        }
    }

    /// A registry with no durable backing.
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedLayouts {
        Arc::new(RwLock::new(self))
    }

    /// Write the registry now. Used by explicit "save" actions.
    pub fn persist(&mut self) -> StorageResult<()> {
        match self.store.as_mut() {
            Some(store) => store.save(&self.layouts),
            None => Ok(()),
        }
    }

    fn persist_soft(&mut self) {
        if let Err(e) = self.persist() {
            warn!(error = %e, "Failed to persist layout registry");
        }
    }

    fn layout_mut(&mut self, id: &str) -> LayoutResult<&mut Layout> {
        self.layouts
            .get_mut(id)
            .ok_or_else(|| LayoutError::NotFound(id.to_string()))
    }

    // ==================== Layouts ====================

    /// Create a layout with a single default slot. Returns the new id.
    pub fn create_layout(&mut self, name: impl Into<String>) -> String {
        let id = Uuid::new_v4().to_string();
        let name = name.into();
        let (width, height) = DEFAULT_LAYOUT_SLOT_SIZE;
        let slot = Slot::new(
            1,
            SlotPosition::staggered(self.layouts.len() as u32),
            SlotSize::new(width, height),
        );
        self.layouts
            .insert(id.clone(), Layout::new(id.clone(), name.clone(), slot));
        info!(%id, %name, "Created layout");
        self.persist_soft();
        id
    }

    pub fn get_layout(&self, id: &str) -> Option<&Layout> {
        self.layouts.get(id)
    }

    pub fn list_layouts(&self) -> Vec<LayoutSummary> {
        self.layouts.values().map(Layout::summary).collect()
    }

    pub fn len(&self) -> usize {
        self.layouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.layouts.is_empty()
    }

    pub fn update_layout(&mut self, id: &str, patch: LayoutPatch) -> LayoutResult<()> {
        let layout = self.layout_mut(id)?;
        layout.apply(patch);
        layout.touch();
        self.persist_soft();
        Ok(())
    }

    /// Remove a layout. Clears the active pointer if it pointed here.
    pub fn delete_layout(&mut self, id: &str) -> LayoutResult<Layout> {
        let removed = self
            .layouts
            .remove(id)
            .ok_or_else(|| LayoutError::NotFound(id.to_string()))?;
        if self.active.as_deref() == Some(id) {
            self.active = None;
        }
        info!(%id, "Deleted layout");
        self.persist_soft();
        Ok(removed)
    }

    /// Point at a layout. Unknown ids leave no layout active.
    /// Returns whether a layout is active afterwards.
    pub fn set_active_layout(&mut self, id: Option<&str>) -> bool {
        self.active = id
            .filter(|id| self.layouts.contains_key(*id))
            .map(str::to_string);
        if id.is_some() && self.active.is_none() {
            debug!(requested = ?id, "Active layout not found");
        }
        self.active.is_some()
    }

    pub fn active_layout_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_layout(&self) -> Option<&Layout> {
        self.active.as_deref().and_then(|id| self.layouts.get(id))
    }

    // ==================== Slots ====================

    /// Append a slot with the smallest unused id in `[1, max_instances]`.
    pub fn add_slot(&mut self, id: &str, max_instances: u32) -> LayoutResult<Slot> {
        let layout = self.layout_mut(id)?;
        if layout.slots.len() >= max_instances as usize {
            return Err(LayoutError::CapacityExceeded { max: max_instances });
        }
        let slot_id = (1..=max_instances)
            .find(|candidate| layout.slot(*candidate).is_none())
            .ok_or(LayoutError::CapacityExceeded { max: max_instances })?;

        let (width, height) = DEFAULT_ADDED_SLOT_SIZE;
        let slot = Slot::new(
            slot_id,
            SlotPosition::staggered(layout.slots.len() as u32),
            SlotSize::new(width, height),
        );
        layout.slots.push(slot.clone());
        layout.touch();
        debug!(layout = %id, slot = slot_id, "Added slot");
        self.persist_soft();
        Ok(slot)
    }

    /// Remove a slot. The last slot of a layout cannot be removed.
    pub fn remove_slot(&mut self, id: &str, slot_id: u32) -> LayoutResult<Slot> {
        let layout = self.layout_mut(id)?;
        let index = layout.slot_index(slot_id).ok_or_else(|| LayoutError::SlotNotFound {
            layout_id: id.to_string(),
            slot_id,
        })?;
        if layout.slots.len() <= 1 {
            return Err(LayoutError::LastSlot);
        }
        let removed = layout.slots.remove(index);
        layout.touch();
        self.persist_soft();
        Ok(removed)
    }

    pub fn update_slot(&mut self, id: &str, slot_id: u32, patch: SlotPatch) -> LayoutResult<()> {
        self.preview_slot(id, slot_id, patch)?;
        self.persist_soft();
        Ok(())
    }

    /// Like [`LayoutManager::update_slot`] but without persisting. Used for
    /// live preview while a builder gesture is in progress.
    pub fn preview_slot(&mut self, id: &str, slot_id: u32, patch: SlotPatch) -> LayoutResult<()> {
        let layout = self.layout_mut(id)?;
        let slot = layout.slot_mut(slot_id).ok_or_else(|| LayoutError::SlotNotFound {
            layout_id: id.to_string(),
            slot_id,
        })?;
        slot.apply(patch);
        layout.touch();
        Ok(())
    }

    /// Move a slot to array position `new_index`, shifting the others.
    pub fn reorder_slot(&mut self, id: &str, slot_id: u32, new_index: usize) -> LayoutResult<()> {
        let layout = self.layout_mut(id)?;
        let len = layout.slots.len();
        if new_index >= len {
            return Err(LayoutError::IndexOutOfRange {
                index: new_index,
                len,
            });
        }
        let index = layout.slot_index(slot_id).ok_or_else(|| LayoutError::SlotNotFound {
            layout_id: id.to_string(),
            slot_id,
        })?;
        let slot = layout.slots.remove(index);
        layout.slots.insert(new_index, slot);
        layout.touch();
        self.persist_soft();
        Ok(())
    }

    /// Reassign slot ids to `1..=n` in array order.
    pub fn renumber_slots(&mut self, id: &str) -> LayoutResult<()> {
        let layout = self.layout_mut(id)?;
        for (index, slot) in layout.slots.iter_mut().enumerate() {
            slot.id = index as u32 + 1;
        }
        layout.touch();
        self.persist_soft();
        Ok(())
    }

    // ==================== Viewer Resolution ====================

    /// Slot bound to a 1-based viewer id in the active layout.
    pub fn get_slot_for_viewer(&self, viewer_id: u32) -> Option<&Slot> {
        let index = (viewer_id as usize).checked_sub(1)?;
        self.active_layout()?.slots.get(index)
    }

    /// Pixel geometry of a viewer's slot against the current viewport.
    pub fn get_viewer_config(&self, viewer_id: u32, viewport: Size) -> Option<ViewerConfig> {
        let slot = self.get_slot_for_viewer(viewer_id)?;
        let rect = slot.to_pixels(viewport);
        Some(ViewerConfig {
            left: rect.left,
            top: rect.top,
            width: rect.width,
            height: rect.height,
            z_index: slot.z_index,
            aspect_ratio: slot.aspect_ratio,
            borders: slot.borders.clone(),
        })
    }
}
