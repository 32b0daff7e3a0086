//! Layout data model - layouts, slots, grid and collision settings.
//!
//! Slot geometry is stored in percent of the viewport so a layout keeps its
//! shape across window sizes. Conversion to pixels happens on demand.

use crate::constants::{
    DEFAULT_BORDER_COLOR, DEFAULT_BORDER_RADIUS, DEFAULT_BORDER_WIDTH, DEFAULT_GRID_SIZE,
    DEFAULT_SLOT_Z_INDEX, SLOT_STAGGER_PERCENT, SLOT_STAGGER_WRAP,
};
use crate::geometry::{Rect, Size};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch.
pub(crate) fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

/// Slot origin in percent of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotPosition {
    pub x: f64,
    pub y: f64,
}

impl SlotPosition {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Default position for the `index`-th slot, stepping diagonally so new
    /// slots don't stack exactly on top of each other.
    pub fn staggered(index: u32) -> Self {
        let offset = SLOT_STAGGER_PERCENT * (1 + index % SLOT_STAGGER_WRAP) as f64;
        Self::new(offset, offset)
    }
}

/// Slot size in percent of the viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SlotSize {
    pub width: f64,
    pub height: f64,
}

impl SlotSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Borders {
    pub enabled: bool,
    pub width: f64,
    pub color: String,
    pub radius: f64,
}

impl Default for Borders {
    fn default() -> Self {
        Self {
            enabled: false,
            width: DEFAULT_BORDER_WIDTH,
            color: DEFAULT_BORDER_COLOR.to_string(),
            radius: DEFAULT_BORDER_RADIUS,
        }
    }
}

/// A fixed region of a layout. `id` doubles as the 1-based viewer ordinal
/// the slot is bound to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: u32,
    pub position: SlotPosition,
    pub size: SlotSize,
    #[serde(default = "default_slot_z_index")]
    pub z_index: i32,
    #[serde(default)]
    pub aspect_ratio: Option<f64>,
    #[serde(default)]
    pub borders: Borders,
}

fn default_slot_z_index() -> i32 {
    DEFAULT_SLOT_Z_INDEX
}

impl Slot {
    pub fn new(id: u32, position: SlotPosition, size: SlotSize) -> Self {
        Self {
            id,
            position,
            size,
            z_index: DEFAULT_SLOT_Z_INDEX,
            aspect_ratio: None,
            borders: Borders::default(),
        }
    }

    /// Slot box in pixels for the given viewport.
    pub fn to_pixels(&self, viewport: Size) -> Rect {
        Rect::new(
            self.position.x / 100.0 * viewport.width,
            self.position.y / 100.0 * viewport.height,
            self.size.width / 100.0 * viewport.width,
            self.size.height / 100.0 * viewport.height,
        )
    }

    pub(crate) fn apply(&mut self, patch: SlotPatch) {
        if let Some(position) = patch.position {
            self.position = position;
        }
        if let Some(size) = patch.size {
            self.size = size;
        }
        if let Some(z_index) = patch.z_index {
            self.z_index = z_index;
        }
        if let Some(aspect_ratio) = patch.aspect_ratio {
            self.aspect_ratio = aspect_ratio;
        }
        if let Some(borders) = patch.borders {
            self.borders = borders;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapMode {
    /// Snap to the grid size
    #[default]
    Grid,
    /// Snap to whole pixels
    Pixel,
    /// Snap to whole percents
    Percent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GridSettings {
    pub enabled: bool,
    /// Grid cell size in pixels
    pub size: u32,
    pub snap: bool,
    pub snap_mode: SnapMode,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            size: DEFAULT_GRID_SIZE,
            snap: false,
            snap_mode: SnapMode::Grid,
        }
    }
}

impl GridSettings {
    /// Snap increment in percent, per axis `(x, y)`.
    pub fn snap_increment(&self, viewport: Size) -> (f64, f64) {
        let per_axis = |px: f64| {
            let x = if viewport.width > 0.0 { px / viewport.width * 100.0 } else { 0.0 };
            let y = if viewport.height > 0.0 { px / viewport.height * 100.0 } else { 0.0 };
            (x, y)
        };
        match self.snap_mode {
            SnapMode::Pixel => per_axis(1.0),
            SnapMode::Percent => (1.0, 1.0),
            SnapMode::Grid => {
                let size = if self.size == 0 { DEFAULT_GRID_SIZE } else { self.size };
                per_axis(size as f64)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CollisionSettings {
    pub prevent_offscreen: bool,
    pub prevent_overlap: bool,
}

impl Default for CollisionSettings {
    fn default() -> Self {
        Self {
            prevent_offscreen: true,
            prevent_overlap: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayoutScope {
    #[default]
    Global,
    Chat,
    Character,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Layout {
    pub id: String,
    pub name: String,
    pub created_at: u64,
    pub modified_at: u64,
    #[serde(default)]
    pub scope: LayoutScope,
    #[serde(default = "default_theme")]
    pub theme: String,
    pub slots: Vec<Slot>,
    #[serde(default)]
    pub grid_settings: GridSettings,
    #[serde(default)]
    pub collision_settings: CollisionSettings,
}

fn default_theme() -> String {
    "default".to_string()
}

impl Layout {
    pub fn new(id: String, name: String, first_slot: Slot) -> Self {
        let now = now_millis();
        Self {
            id,
            name,
            created_at: now,
            modified_at: now,
            scope: LayoutScope::default(),
            theme: default_theme(),
            slots: vec![first_slot],
            grid_settings: GridSettings::default(),
            collision_settings: CollisionSettings::default(),
        }
    }

    pub fn slot(&self, slot_id: u32) -> Option<&Slot> {
        self.slots.iter().find(|s| s.id == slot_id)
    }

    pub(crate) fn slot_mut(&mut self, slot_id: u32) -> Option<&mut Slot> {
        self.slots.iter_mut().find(|s| s.id == slot_id)
    }

    pub fn slot_index(&self, slot_id: u32) -> Option<usize> {
        self.slots.iter().position(|s| s.id == slot_id)
    }

    pub fn summary(&self) -> LayoutSummary {
        LayoutSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            slot_count: self.slots.len(),
            scope: self.scope,
            theme: self.theme.clone(),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.modified_at = now_millis().max(self.modified_at);
    }

    pub(crate) fn apply(&mut self, patch: LayoutPatch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(scope) = patch.scope {
            self.scope = scope;
        }
        if let Some(theme) = patch.theme {
            self.theme = theme;
        }
        if let Some(grid) = patch.grid_settings {
            self.grid_settings = grid;
        }
        if let Some(collision) = patch.collision_settings {
            self.collision_settings = collision;
        }
    }
}

/// Registry listing entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayoutSummary {
    pub id: String,
    pub name: String,
    pub slot_count: usize,
    pub scope: LayoutScope,
    pub theme: String,
}

/// Shallow update of layout fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LayoutPatch {
    pub name: Option<String>,
    pub scope: Option<LayoutScope>,
    pub theme: Option<String>,
    pub grid_settings: Option<GridSettings>,
    pub collision_settings: Option<CollisionSettings>,
}

impl LayoutPatch {
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

/// Shallow update of slot fields. `aspect_ratio: Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SlotPatch {
    pub position: Option<SlotPosition>,
    pub size: Option<SlotSize>,
    pub z_index: Option<i32>,
    pub aspect_ratio: Option<Option<f64>>,
    pub borders: Option<Borders>,
}

impl SlotPatch {
    pub fn geometry(position: SlotPosition, size: SlotSize) -> Self {
        Self {
            position: Some(position),
            size: Some(size),
            ..Self::default()
        }
    }
}

/// A slot resolved to pixels for one viewer.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
    pub z_index: i32,
    pub aspect_ratio: Option<f64>,
    pub borders: Borders,
}

impl ViewerConfig {
    pub fn rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.width, self.height)
    }
}
