//! Session-scoped viewer state: remembered geometry and locked viewer ids.

use super::KeyValueStore;
use crate::constants::{LAST_POSITION_KEY, LAYOUT_POSITIONS_KEY, LOCKED_VIEWERS_KEY};
use crate::error::StorageResult;
use crate::geometry::Rect;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::{BTreeMap, BTreeSet};
use tracing::warn;

/// Typed access to the session keys. Read and write failures are logged and
/// swallowed; a broken backend just means nothing is remembered.
pub struct SessionStore {
    backend: Box<dyn KeyValueStore>,
}

impl SessionStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    pub fn in_memory() -> Self {
        Self::new(Box::new(super::MemoryStore::new()))
    }

    pub fn last_position(&self) -> Option<Rect> {
        self.read(LAST_POSITION_KEY)
    }

    pub fn save_last_position(&mut self, rect: Rect) {
        self.write(LAST_POSITION_KEY, &rect);
    }

    pub fn layout_positions(&self) -> BTreeMap<u32, Rect> {
        self.read(LAYOUT_POSITIONS_KEY).unwrap_or_default()
    }

    pub fn layout_position(&self, viewer_id: u32) -> Option<Rect> {
        self.layout_positions().remove(&viewer_id)
    }

    /// Record geometry for one viewer id, keeping the other entries.
    pub fn save_layout_position(&mut self, viewer_id: u32, rect: Rect) {
        let mut positions = self.layout_positions();
        positions.insert(viewer_id, rect);
        self.write(LAYOUT_POSITIONS_KEY, &positions);
    }

    pub fn locked_ids(&self) -> BTreeSet<u32> {
        self.read::<Vec<u32>>(LOCKED_VIEWERS_KEY)
            .map(|ids| ids.into_iter().collect())
            .unwrap_or_default()
    }

    pub fn save_locked_ids(&mut self, ids: &BTreeSet<u32>) {
        let ids: Vec<u32> = ids.iter().copied().collect();
        self.write(LOCKED_VIEWERS_KEY, &ids);
    }

    fn read<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        match self.try_read(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Session read failed");
                None
            }
        }
    }

    fn try_read<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Option<T>> {
        let Some(json) = self.backend.get(key)? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_str(&json)?))
    }

    fn write<T: Serialize>(&mut self, key: &str, value: &T) {
        let result = serde_json::to_string(value)
            .map_err(Into::into)
            .and_then(|json| self.backend.set(key, &json));
        if let Err(e) = result {
            warn!(key, error = %e, "Session write failed");
        }
    }
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

/// Locked viewer ids. Outlives any single viewer instance: a lock belongs to
/// the viewer id, so the next viewer admitted with that id starts locked.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LockRegistry {
    ids: BTreeSet<u32>,
}

impl LockRegistry {
    pub fn load(session: &SessionStore) -> Self {
        Self {
            ids: session.locked_ids(),
        }
    }

    pub fn is_locked(&self, viewer_id: u32) -> bool {
        self.ids.contains(&viewer_id)
    }

    pub fn set_locked(&mut self, viewer_id: u32, locked: bool, session: &mut SessionStore) {
        let changed = if locked {
            self.ids.insert(viewer_id)
        } else {
            self.ids.remove(&viewer_id)
        };
        if changed {
            session.save_locked_ids(&self.ids);
        }
    }

    pub fn ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.ids.iter().copied()
    }
}
