//! Layout registry invariants.

use crate::helpers::approx;
use floating_viewer::LayoutError;
use floating_viewer::geometry::Size;
use floating_viewer::layout::{LayoutManager, LayoutPatch, LayoutScope, SlotPatch};

fn manager_with_slots(count: u32) -> (LayoutManager, String) {
    let mut manager = LayoutManager::in_memory();
    let id = manager.create_layout("Grid");
    for _ in 1..count {
        manager.add_slot(&id, count).unwrap();
    }
    (manager, id)
}

fn slot_ids(manager: &LayoutManager, id: &str) -> Vec<u32> {
    manager
        .get_layout(id)
        .unwrap()
        .slots
        .iter()
        .map(|slot| slot.id)
        .collect()
}

#[test]
fn test_renumber_matches_array_order() {
    let (mut manager, id) = manager_with_slots(5);
    manager.remove_slot(&id, 2).unwrap();
    manager.reorder_slot(&id, 5, 0).unwrap();
    manager.reorder_slot(&id, 1, 3).unwrap();
    assert_eq!(slot_ids(&manager, &id), vec![5, 3, 4, 1]);

    manager.renumber_slots(&id).unwrap();
    assert_eq!(slot_ids(&manager, &id), vec![1, 2, 3, 4]);
}

#[test]
fn test_slot_for_viewer_is_positional() {
    let (mut manager, id) = manager_with_slots(3);
    manager.reorder_slot(&id, 3, 0).unwrap();
    manager.set_active_layout(Some(&id));

    let layout = manager.get_layout(&id).unwrap().clone();
    for k in 1..=3u32 {
        assert_eq!(manager.get_slot_for_viewer(k), layout.slots.get(k as usize - 1));
    }
    assert!(manager.get_slot_for_viewer(0).is_none());
    assert!(manager.get_slot_for_viewer(4).is_none());
}

#[test]
fn test_no_active_layout_resolves_nothing() {
    let (manager, _) = manager_with_slots(2);
    assert!(manager.get_slot_for_viewer(1).is_none());
    assert!(manager.get_viewer_config(1, Size::new(1000.0, 800.0)).is_none());
}

#[test]
fn test_viewer_config_tracks_viewport() {
    let (mut manager, id) = manager_with_slots(1);
    manager.set_active_layout(Some(&id));
    manager
        .update_slot(&id, 1, SlotPatch {
            z_index: Some(7),
            aspect_ratio: Some(Some(1.5)),
            ..SlotPatch::default()
        })
        .unwrap();

    // First slot sits at 5%,5% with a 40%x60% box
    let small = manager.get_viewer_config(1, Size::new(1000.0, 800.0)).unwrap();
    assert!(approx(small.left, 50.0) && approx(small.top, 40.0));
    assert!(approx(small.width, 400.0) && approx(small.height, 480.0));
    assert_eq!(small.z_index, 7);
    assert_eq!(small.aspect_ratio, Some(1.5));

    let large = manager.get_viewer_config(1, Size::new(2000.0, 1000.0)).unwrap();
    assert!(approx(large.width, 800.0) && approx(large.height, 600.0));
}

#[test]
fn test_listing_reports_summaries() {
    let mut manager = LayoutManager::in_memory();
    let a = manager.create_layout("One");
    let b = manager.create_layout("Two");
    manager.add_slot(&b, 4).unwrap();
    manager
        .update_layout(&a, LayoutPatch {
            scope: Some(LayoutScope::Chat),
            ..LayoutPatch::default()
        })
        .unwrap();

    let list = manager.list_layouts();
    assert_eq!(list.len(), 2);
    let one = list.iter().find(|s| s.id == a).unwrap();
    let two = list.iter().find(|s| s.id == b).unwrap();
    assert_eq!((one.name.as_str(), one.slot_count, one.scope), ("One", 1, LayoutScope::Chat));
    assert_eq!((two.name.as_str(), two.slot_count), ("Two", 2));
}

#[test]
fn test_rejected_mutations_leave_registry_unchanged() {
    let (mut manager, id) = manager_with_slots(2);
    let before = manager.get_layout(&id).unwrap().clone();

    assert_eq!(manager.add_slot(&id, 2), Err(LayoutError::CapacityExceeded { max: 2 }));
    assert!(matches!(
        manager.update_slot(&id, 9, SlotPatch::default()),
        Err(LayoutError::SlotNotFound { slot_id: 9, .. })
    ));
    assert_eq!(
        manager.reorder_slot(&id, 1, 2),
        Err(LayoutError::IndexOutOfRange { index: 2, len: 2 })
    );
    assert_eq!(manager.get_layout(&id).unwrap(), &before);

    assert!(matches!(
        manager.delete_layout("missing"),
        Err(LayoutError::NotFound(_))
    ));
}

#[test]
fn test_new_layouts_stagger_first_slot() {
    let mut manager = LayoutManager::in_memory();
    let a = manager.create_layout("A");
    let b = manager.create_layout("B");
    let first = manager.get_layout(&a).unwrap().slots[0].position;
    let second = manager.get_layout(&b).unwrap().slots[0].position;
    assert_ne!(first, second);
}
