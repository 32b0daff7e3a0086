//! Settings snapshot read by the core on every operation.
//!
//! The settings panel and its persistence live in the host. The core only
//! receives a JSON blob (camelCase keys, every field optional) and clamps it
//! into range before use.

use crate::constants::{
    DEFAULT_MAX_INSTANCES, DEFAULT_MAX_ZOOM, DEFAULT_SIZE_PERCENT, MAX_INSTANCES_LIMIT,
    MAX_ZOOM_LIMIT, MIN_DEFAULT_SIZE_PERCENT, MIN_ZOOM,
};
use crate::geometry::FitMode;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Settings {
    pub enabled: bool,
    pub intercept_avatars: bool,
    pub intercept_gallery: bool,
    pub remember_position: bool,
    /// Remember geometry per viewer id instead of a single last position
    pub remember_layout: bool,
    /// Default image size, percent of the viewport
    pub default_size: f64,
    pub enable_zoom: bool,
    /// Upper zoom bound, percent
    pub max_zoom: f64,
    /// Allow panning past the image edges
    pub free_pan: bool,
    pub multi_image: bool,
    pub max_instances: u32,
    pub layout_enabled: bool,
    pub active_layout_id: Option<String>,
    pub fit_mode: FitMode,
    pub prevent_overlap: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            enabled: true,
            intercept_avatars: true,
            intercept_gallery: true,
            remember_position: false,
            remember_layout: false,
            default_size: DEFAULT_SIZE_PERCENT,
            enable_zoom: true,
            max_zoom: DEFAULT_MAX_ZOOM,
            free_pan: false,
            multi_image: false,
            max_instances: DEFAULT_MAX_INSTANCES,
            layout_enabled: false,
            active_layout_id: None,
            fit_mode: FitMode::default(),
            prevent_overlap: false,
        }
    }
}

impl Settings {
    /// Clamp numeric fields into their supported ranges.
    pub fn validated(mut self) -> Self {
        self.default_size = if self.default_size.is_finite() {
            self.default_size.clamp(MIN_DEFAULT_SIZE_PERCENT, 100.0)
        } else {
            DEFAULT_SIZE_PERCENT
        };
        self.max_zoom = if self.max_zoom.is_finite() {
            self.max_zoom.clamp(MIN_ZOOM, MAX_ZOOM_LIMIT)
        } else {
            DEFAULT_MAX_ZOOM
        };
        self.max_instances = self.max_instances.clamp(1, MAX_INSTANCES_LIMIT);
        if self.active_layout_id.as_deref().is_some_and(|id| id.trim().is_empty()) {
            self.active_layout_id = None;
        }
        self
    }

    /// Parse a settings blob. Missing keys take their defaults.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str::<Settings>(json).map(Settings::validated)
    }

    /// Load a settings blob exported by the host.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading settings from {}", path.display()))?;
        Self::from_json(&json).with_context(|| format!("parsing settings in {}", path.display()))
    }

    /// Whether this snapshot lets the given trigger open a viewer.
    pub fn intercepts(&self, kind: crate::pool::TriggerKind) -> bool {
        use crate::pool::TriggerKind;
        self.enabled
            && match kind {
                TriggerKind::AvatarOpened => self.intercept_avatars,
                TriggerKind::GalleryOpened => self.intercept_gallery,
            }
    }
}
