//! Persistence adapter.
//!
//! Two scopes share one backend trait:
//! - `session` - last position, per-viewer positions, locked ids (session storage)
//! - `registry` - versioned layout registry (durable storage)
//!
//! Backends are plain string key-value stores. Failures are reported as
//! [`StorageError`] and callers treat them as soft: the operation continues
//! without persistence.

mod file;
mod registry;
mod session;

pub use file::{FileStore, default_store_path};
pub use registry::{LayoutStore, RegistryFile};
pub use session::{LockRegistry, SessionStore};

use crate::error::{StorageError, StorageResult};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// String key-value storage, the shape of browser local/session storage.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> StorageResult<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> StorageResult<()>;
    fn remove(&mut self, key: &str) -> StorageResult<()>;
}

/// In-memory store. Clones share the same map, so a test can keep a handle
/// to a store it moved into a manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, String>>>,
    unavailable: Arc<AtomicBool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate a backend that throws on every access (quota, private mode).
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    fn check(&self) -> StorageResult<()> {
        if self.unavailable.load(Ordering::Relaxed) {
            Err(StorageError::Unavailable("memory store disabled".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.check()?;
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> StorageResult<()> {
        self.check()?;
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> StorageResult<()> {
        self.check()?;
        self.entries.lock().remove(key);
        Ok(())
    }
}
