//! Snapshot tests for the JSON shapes the host reads.
//!
//! Run `cargo insta review` after intentional format changes.

use crate::helpers::TestPoolBuilder;
use floating_viewer::geometry::Size;
use floating_viewer::layout::LayoutManager;
use floating_viewer::pool::RenderCommand;
use floating_viewer::settings::Settings;
use floating_viewer::viewer::InstanceKey;
use insta::assert_json_snapshot;

#[test]
fn test_default_settings_snapshot() {
    assert_json_snapshot!(Settings::default(), @r###"
    {
      "enabled": true,
      "interceptAvatars": true,
      "interceptGallery": true,
      "rememberPosition": false,
      "rememberLayout": false,
      "defaultSize": 60.0,
      "enableZoom": true,
      "maxZoom": 400.0,
      "freePan": false,
      "multiImage": false,
      "maxInstances": 4,
      "layoutEnabled": false,
      "activeLayoutId": null,
      "fitMode": "classic",
      "preventOverlap": false
    }
    "###);
}

#[test]
fn test_new_layout_snapshot() {
    let mut manager = LayoutManager::in_memory();
    let id = manager.create_layout("Default");
    let layout = manager.get_layout(&id).unwrap();

    assert_json_snapshot!(layout, {
        ".id" => "[id]",
        ".createdAt" => "[timestamp]",
        ".modifiedAt" => "[timestamp]",
    }, @r###"
    {
      "id": "[id]",
      "name": "Default",
      "createdAt": "[timestamp]",
      "modifiedAt": "[timestamp]",
      "scope": "global",
      "theme": "default",
      "slots": [
        {
          "id": 1,
          "position": {
            "x": 5.0,
            "y": 5.0
          },
          "size": {
            "width": 40.0,
            "height": 60.0
          },
          "zIndex": 500,
          "aspectRatio": null,
          "borders": {
            "enabled": false,
            "width": 2.0,
            "color": "#ffffff",
            "radius": 8.0
          }
        }
      ],
      "gridSettings": {
        "enabled": false,
        "size": 20,
        "snap": false,
        "snapMode": "grid"
      },
      "collisionSettings": {
        "preventOffscreen": true,
        "preventOverlap": false
      }
    }
    "###);
}

#[test]
fn test_viewer_style_snapshot() {
    let mut test = TestPoolBuilder::new().build();
    let key = test.open_loaded("avatar.png", Size::new(400.0, 300.0));

    assert_json_snapshot!(test.pool.viewer_style(key).unwrap(), @r###"
    {
      "left": 300.0,
      "top": 250.0,
      "width": 400.0,
      "height": 300.0,
      "zIndex": 10001,
      "imageWidth": 400.0,
      "imageHeight": 300.0,
      "objectFit": "fill",
      "zoomLevel": 100.0,
      "panX": 0.0,
      "panY": 0.0,
      "minimized": false,
      "locked": false,
      "borders": null
    }
    "###);
}

#[test]
fn test_render_command_snapshot() {
    let command = RenderCommand::BeginClose {
        key: InstanceKey(3),
        fade_ms: 200,
    };
    assert_json_snapshot!(command, @r###"
    {
      "type": "beginClose",
      "key": 3,
      "fadeMs": 200
    }
    "###);
}

#[test]
fn test_open_sequence_snapshot() {
    let mut test = TestPoolBuilder::new().build();
    test.pool
        .handle_trigger(floating_viewer::OpenTrigger::gallery("cat.png"))
        .unwrap();

    assert_json_snapshot!(test.pool.drain_commands(), @r###"
    [
      {
        "type": "mount",
        "key": 1,
        "viewerId": 1
      },
      {
        "type": "loadImage",
        "key": 1,
        "url": "cat.png"
      },
      {
        "type": "bind",
        "key": 1,
        "touch": false
      }
    ]
    "###);
}
