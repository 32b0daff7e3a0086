//! Durable, versioned layout registry storage.

use super::KeyValueStore;
use crate::constants::{LAYOUT_REGISTRY_KEY, LAYOUT_REGISTRY_VERSION};
use crate::error::StorageResult;
use crate::layout::Layout;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// On-disk shape of the registry: `{version, layouts: {id -> Layout}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegistryFile {
    pub version: u32,
    pub layouts: BTreeMap<String, Layout>,
}

impl Default for RegistryFile {
    fn default() -> Self {
        Self {
            version: LAYOUT_REGISTRY_VERSION,
            layouts: BTreeMap::new(),
        }
    }
}

#[derive(Serialize)]
struct RegistryFileRef<'a> {
    version: u32,
    layouts: &'a BTreeMap<String, Layout>,
}

pub struct LayoutStore {
    backend: Box<dyn KeyValueStore>,
}

impl LayoutStore {
    pub fn new(backend: Box<dyn KeyValueStore>) -> Self {
        Self { backend }
    }

    /// Load the registry. Unreadable data or a foreign version yields an
    /// empty registry. Layouts stored without any slot are dropped.
    pub fn load(&self) -> BTreeMap<String, Layout> {
        let json = match self.backend.get(LAYOUT_REGISTRY_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => return BTreeMap::new(),
            Err(e) => {
                warn!(error = %e, "Layout registry unavailable");
                return BTreeMap::new();
            }
        };

        match serde_json::from_str::<RegistryFile>(&json) {
            Ok(file) if file.version == LAYOUT_REGISTRY_VERSION => {
                let mut layouts = file.layouts;
                layouts.retain(|id, layout| {
                    let keep = !layout.slots.is_empty();
                    if !keep {
                        warn!(layout_id = %id, "Dropping stored layout without slots");
                    }
                    keep
                });
                debug!(count = layouts.len(), "Loaded layout registry");
                layouts
            }
            Ok(file) => {
                warn!(version = file.version, "Discarding layout registry with unknown version");
                BTreeMap::new()
            }
            Err(e) => {
                warn!(error = %e, "Discarding unreadable layout registry");
                BTreeMap::new()
            }
        }
    }

    pub fn save(&mut self, layouts: &BTreeMap<String, Layout>) -> StorageResult<()> {
        let json = serde_json::to_string(&RegistryFileRef {
            version: LAYOUT_REGISTRY_VERSION,
            layouts,
        })?;
        self.backend.set(LAYOUT_REGISTRY_KEY, &json)
    }
}

impl std::fmt::Debug for LayoutStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LayoutStore").finish_non_exhaustive()
    }
}
