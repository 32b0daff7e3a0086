//! Gestures driven through the pool.

use crate::helpers::{TestPoolBuilder, approx, pointer_down};
use floating_viewer::constants::{MINIMIZED_HEIGHT, Z_TIER_LOW};
use floating_viewer::geometry::{Point, Size};
use floating_viewer::pool::RenderCommand;
use floating_viewer::settings::Settings;
use floating_viewer::storage::SessionStore;
use floating_viewer::viewer::{PointerTarget, ViewerInput};

#[test]
fn test_drag_is_clamped_to_viewport() {
    let mut test = TestPoolBuilder::new()
        .with_viewport(Size::new(1200.0, 800.0))
        .build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    assert_eq!(test.pool.viewer(key).unwrap().frame().origin(), Point::new(400.0, 250.0));

    test.drag_by(key, Point::new(-450.0, 500.0));
    assert_eq!(test.pool.viewer(key).unwrap().frame().origin(), Point::new(0.0, 500.0));
}

#[test]
fn test_overlapping_drag_holds_last_valid_position() {
    let settings = Settings {
        multi_image: true,
        max_instances: 2,
        prevent_overlap: true,
        ..Settings::default()
    };
    let mut test = TestPoolBuilder::new().with_settings(settings).build();
    let first = test.open_loaded("a.png", Size::new(200.0, 200.0));
    let second = test.open_loaded("b.png", Size::new(200.0, 200.0));
    assert_eq!(test.pool.viewer(first).unwrap().frame().origin(), Point::new(400.0, 300.0));

    test.drag_by(second, Point::new(500.0, 0.0));
    let parked = test.pool.viewer(second).unwrap().frame().origin();
    assert_eq!(parked, Point::new(800.0, 330.0));

    test.drag_by(second, Point::new(-350.0, 0.0));
    assert_eq!(test.pool.viewer(second).unwrap().frame().origin(), parked);
}

#[test]
fn test_wheel_zoom_stays_in_bounds() {
    let mut test = TestPoolBuilder::new().build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    let off_center = Point::new(320.0, 260.0);

    for _ in 0..50 {
        test.pool
            .handle_input(key, ViewerInput::Wheel { pos: off_center, delta_y: -120.0 })
            .unwrap();
        let viewer = test.pool.viewer(key).unwrap();
        assert!((100.0..=400.0).contains(&viewer.zoom_level()));
    }
    assert_eq!(test.pool.viewer(key).unwrap().zoom_level(), 400.0);

    for _ in 0..50 {
        test.pool
            .handle_input(key, ViewerInput::Wheel { pos: off_center, delta_y: 120.0 })
            .unwrap();
    }
    let viewer = test.pool.viewer(key).unwrap();
    assert_eq!(viewer.zoom_level(), 100.0);
    assert_eq!(viewer.pan(), Point::ZERO);
}

#[test]
fn test_zoomed_pointer_pans_instead_of_dragging() {
    let mut test = TestPoolBuilder::new().build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    let frame = test.pool.viewer(key).unwrap().frame();
    let center = frame.center();

    for _ in 0..10 {
        test.pool
            .handle_input(key, ViewerInput::Wheel { pos: center, delta_y: -1.0 })
            .unwrap();
    }
    assert_eq!(test.pool.viewer(key).unwrap().zoom_level(), 200.0);

    test.drag_by(key, Point::new(1000.0, 0.0));
    let viewer = test.pool.viewer(key).unwrap();
    assert_eq!(viewer.frame(), frame);
    // Half of the 400px overflow at 200%
    assert!(approx(viewer.pan().x, 200.0));

    test.pool.handle_input(key, ViewerInput::DoubleClick).unwrap();
    let viewer = test.pool.viewer(key).unwrap();
    assert_eq!(viewer.zoom_level(), 100.0);
    assert_eq!(viewer.pan(), Point::ZERO);
}

#[test]
fn test_disabled_zoom_ignores_wheel() {
    let settings = Settings {
        enable_zoom: false,
        ..Settings::default()
    };
    let mut test = TestPoolBuilder::new().with_settings(settings).build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    let response = test
        .pool
        .handle_input(key, ViewerInput::Wheel { pos: Point::ZERO, delta_y: -1.0 })
        .unwrap();
    assert!(!response.changed());
}

#[test]
fn test_mouse_resize_is_aspect_locked_and_bounded() {
    let mut test = TestPoolBuilder::new()
        .with_viewport(Size::new(1200.0, 800.0))
        .build();
    let key = test.open_loaded("wide.png", Size::new(800.0, 400.0));
    let placed = test.pool.viewer(key).unwrap().frame().size();
    assert!(approx(placed.width, 720.0) && approx(placed.height, 360.0));

    let handle = Point::new(0.0, 0.0);
    test.pool
        .handle_input(key, pointer_down(handle, PointerTarget::ResizeHandle))
        .unwrap();
    test.pool
        .handle_input(key, ViewerInput::PointerMove { pos: Point::new(-1000.0, 0.0) })
        .unwrap();
    assert_eq!(test.pool.viewer(key).unwrap().frame().size(), Size::new(200.0, 100.0));

    test.pool
        .handle_input(key, ViewerInput::PointerMove { pos: Point::new(1000.0, 0.0) })
        .unwrap();
    assert_eq!(test.pool.viewer(key).unwrap().frame().size(), Size::new(800.0, 400.0));
    test.pool.handle_input(key, ViewerInput::PointerUp).unwrap();
    assert!(test.pool.viewer(key).unwrap().gesture().is_idle());
}

#[test]
fn test_lock_blocks_drag_and_follows_viewer_id() {
    let mut test = TestPoolBuilder::new().build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    let origin = test.pool.viewer(key).unwrap().frame().origin();

    assert_eq!(test.pool.toggle_lock(key), Ok(true));
    test.drag_by(key, Point::new(50.0, 50.0));
    assert_eq!(test.pool.viewer(key).unwrap().frame().origin(), origin);
    assert!(test.pool.viewer_style(key).unwrap().locked);

    let stored = SessionStore::new(Box::new(test.session_backend.clone()));
    assert!(stored.locked_ids().contains(&1));

    // A later viewer with the same id starts locked
    let next = test.open_loaded("b.png", Size::new(400.0, 300.0));
    assert!(test.pool.viewer(next).unwrap().is_locked());

    assert_eq!(test.pool.toggle_lock(next), Ok(false));
    let stored = SessionStore::new(Box::new(test.session_backend.clone()));
    assert!(stored.locked_ids().is_empty());
}

#[test]
fn test_minimize_collapses_height() {
    let mut test = TestPoolBuilder::new().build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));

    assert_eq!(test.pool.toggle_minimize(key), Ok(true));
    let style = test.pool.viewer_style(key).unwrap();
    assert!(style.minimized);
    assert_eq!(style.height, MINIMIZED_HEIGHT);
    assert_eq!(style.width, 400.0);

    assert_eq!(test.pool.toggle_minimize(key), Ok(false));
    assert_eq!(test.pool.viewer_style(key).unwrap().height, 300.0);
}

#[test]
fn test_host_panel_lowers_z_tier() {
    let mut test = TestPoolBuilder::new().build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    test.pool.drain_commands();

    test.pool.set_host_panel_open(true);
    let commands = test.pool.drain_commands();
    assert!(matches!(
        commands.as_slice(),
        [RenderCommand::Apply { key: k, style }] if *k == key && style.z_index == Z_TIER_LOW + 1
    ));

    // Reporting the same visibility again is a no-op
    test.pool.set_host_panel_open(true);
    assert!(test.pool.drain_commands().is_empty());
}

#[test]
fn test_viewport_shrink_pulls_viewer_back() {
    let mut test = TestPoolBuilder::new().build();
    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    test.drag_by(key, Point::new(300.0, 250.0));
    assert_eq!(test.pool.viewer(key).unwrap().frame().origin(), Point::new(600.0, 500.0));

    test.pool.set_viewport(Size::new(800.0, 600.0));
    let frame = test.pool.viewer(key).unwrap().frame();
    assert_eq!(frame.origin(), Point::new(400.0, 300.0));
}

#[test]
fn test_unavailable_session_store_is_soft() {
    let settings = Settings {
        remember_position: true,
        ..Settings::default()
    };
    let mut test = TestPoolBuilder::new().with_settings(settings).build();
    test.session_backend.set_unavailable(true);

    let key = test.open_loaded("a.png", Size::new(400.0, 300.0));
    assert_eq!(test.pool.toggle_lock(key), Ok(true));
    test.pool.close(key).unwrap();

    test.session_backend.set_unavailable(false);
    assert!(test.session_backend.is_empty());
}
