//! File-backed persistence and registry versioning.

use floating_viewer::constants::LAYOUT_REGISTRY_KEY;
use floating_viewer::geometry::Rect;
use floating_viewer::layout::LayoutManager;
use floating_viewer::storage::{FileStore, KeyValueStore, LayoutStore, MemoryStore, SessionStore};

#[test]
fn test_file_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("store.json");

    let mut store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("k").unwrap(), None);
    store.set("k", "v1").unwrap();
    store.set("other", "v2").unwrap();
    store.remove("other").unwrap();

    let reopened = FileStore::open(&path).unwrap();
    assert_eq!(reopened.get("k").unwrap().as_deref(), Some("v1"));
    assert_eq!(reopened.get("other").unwrap(), None);
    assert_eq!(reopened.path(), path.as_path());
}

#[test]
fn test_file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "[1, 2").unwrap();
    assert!(FileStore::open(&path).is_err());
}

#[test]
fn test_empty_file_is_empty_store() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "  \n").unwrap();
    let store = FileStore::open(&path).unwrap();
    assert_eq!(store.get("anything").unwrap(), None);
}

#[test]
fn test_layout_registry_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let id = {
        let store = FileStore::open(&path).unwrap();
        let mut manager = LayoutManager::new(LayoutStore::new(Box::new(store)));
        let id = manager.create_layout("Disk");
        manager.add_slot(&id, 4).unwrap();
        id
    };

    let store = FileStore::open(&path).unwrap();
    let manager = LayoutManager::new(LayoutStore::new(Box::new(store)));
    let layout = manager.get_layout(&id).unwrap();
    assert_eq!(layout.name, "Disk");
    assert_eq!(layout.slots.len(), 2);
}

#[test]
fn test_unknown_registry_version_is_discarded() {
    let mut backend = MemoryStore::new();
    backend
        .set(LAYOUT_REGISTRY_KEY, r#"{"version": 99, "layouts": {}}"#)
        .unwrap();
    let manager = LayoutManager::new(LayoutStore::new(Box::new(backend)));
    assert!(manager.is_empty());
}

#[test]
fn test_unreadable_registry_is_discarded() {
    let mut backend = MemoryStore::new();
    backend.set(LAYOUT_REGISTRY_KEY, "not json").unwrap();
    let manager = LayoutManager::new(LayoutStore::new(Box::new(backend)));
    assert!(manager.is_empty());
}

#[test]
fn test_stored_layouts_without_slots_are_dropped() {
    let mut backend = MemoryStore::new();
    let mut manager = LayoutManager::new(LayoutStore::new(Box::new(backend.clone())));
    let kept = manager.create_layout("Kept");
    let emptied = manager.create_layout("Emptied");

    let json = backend.get(LAYOUT_REGISTRY_KEY).unwrap().unwrap();
    let mut value: serde_json::Value = serde_json::from_str(&json).unwrap();
    value["layouts"][&emptied]["slots"] = serde_json::json!([]);
    backend
        .set(LAYOUT_REGISTRY_KEY, &value.to_string())
        .unwrap();

    let mut reloaded = LayoutManager::new(LayoutStore::new(Box::new(backend)));
    assert_eq!(reloaded.len(), 1);
    assert!(reloaded.get_layout(&kept).is_some());
    assert!(!reloaded.set_active_layout(Some(emptied.as_str())));
    assert!(reloaded.active_layout().is_none());
}

#[test]
fn test_registry_format_is_versioned() {
    let backend = MemoryStore::new();
    let mut manager = LayoutManager::new(LayoutStore::new(Box::new(backend.clone())));
    let id = manager.create_layout("Versioned");

    let json = backend.get(LAYOUT_REGISTRY_KEY).unwrap().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["version"], 1);
    assert_eq!(value["layouts"][&id]["name"], "Versioned");
    assert_eq!(value["layouts"][&id]["slots"][0]["zIndex"], 500);
}

#[test]
fn test_last_and_per_viewer_positions_are_separate() {
    let backend = MemoryStore::new();
    let mut session = SessionStore::new(Box::new(backend.clone()));
    session.save_last_position(Rect::new(1.0, 2.0, 300.0, 200.0));
    session.save_layout_position(2, Rect::new(5.0, 5.0, 100.0, 100.0));

    let session = SessionStore::new(Box::new(backend));
    assert_eq!(session.last_position(), Some(Rect::new(1.0, 2.0, 300.0, 200.0)));
    assert_eq!(session.layout_position(1), None);
    assert_eq!(session.layout_position(2), Some(Rect::new(5.0, 5.0, 100.0, 100.0)));
}
