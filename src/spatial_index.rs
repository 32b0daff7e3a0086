//! Spatial Index Module
//!
//! R-tree over the on-screen frames of active viewers. Drag handlers query it
//! to reject positions that would overlap another viewer.

use crate::geometry::{Rect, rects_overlap};
use rstar::{AABB, RTree, RTreeObject};
use std::collections::HashMap;

/// A viewer frame stored in the tree.
#[derive(Debug, Clone, Copy)]
pub struct SpatialEntry {
    pub viewer_id: u32,
    pub rect: Rect,
}

impl RTreeObject for SpatialEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_corners(
            [self.rect.left, self.rect.top],
            [self.rect.right(), self.rect.bottom()],
        )
    }
}

impl PartialEq for SpatialEntry {
    fn eq(&self, other: &Self) -> bool {
        self.viewer_id == other.viewer_id
    }
}

/// Frames of all active viewers, keyed by viewer id.
#[derive(Debug)]
pub struct SpatialIndex {
    tree: RTree<SpatialEntry>,
    entries: HashMap<u32, SpatialEntry>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self {
            tree: RTree::new(),
            entries: HashMap::new(),
        }
    }

    /// Insert or move a viewer's frame.
    pub fn upsert(&mut self, viewer_id: u32, rect: Rect) {
        if let Some(old_entry) = self.entries.remove(&viewer_id) {
            self.tree.remove(&old_entry);
        }
        let entry = SpatialEntry { viewer_id, rect };
        self.tree.insert(entry);
        self.entries.insert(viewer_id, entry);
    }

    pub fn remove(&mut self, viewer_id: u32) -> bool {
        if let Some(entry) = self.entries.remove(&viewer_id) {
            self.tree.remove(&entry);
            true
        } else {
            false
        }
    }

    pub fn get(&self, viewer_id: u32) -> Option<Rect> {
        self.entries.get(&viewer_id).map(|e| e.rect)
    }

    /// Viewers other than `exclude` whose frames overlap `rect`.
    ///
    /// The R-tree query also returns frames that merely touch; those are
    /// filtered out.
    pub fn overlapping(&self, rect: &Rect, exclude: u32) -> Vec<u32> {
        let envelope = AABB::from_corners([rect.left, rect.top], [rect.right(), rect.bottom()]);
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .filter(|entry| entry.viewer_id != exclude && rects_overlap(&entry.rect, rect))
            .map(|entry| entry.viewer_id)
            .collect()
    }

    pub fn any_overlap(&self, rect: &Rect, exclude: u32) -> bool {
        !self.overlapping(rect, exclude).is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree = RTree::new();
        self.entries.clear();
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::new()
    }
}
