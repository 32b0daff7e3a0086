//! Application-wide constants.
//!
//! Centralizes magic numbers, storage keys and z-index tiers so the geometry
//! and state machine code stays free of literals.

// ============================================================================
// Zoom & Pan
// ============================================================================

/// Zoom level with no magnification (percent)
pub const MIN_ZOOM: f64 = 100.0;

/// Default upper zoom bound (percent)
pub const DEFAULT_MAX_ZOOM: f64 = 400.0;

/// Largest max-zoom setting accepted by validation (percent)
pub const MAX_ZOOM_LIMIT: f64 = 1000.0;

/// Zoom change per wheel event (percentage points)
pub const ZOOM_STEP: f64 = 10.0;

// ============================================================================
// Viewer Windows
// ============================================================================

/// Minimum viewer edge length during resize, in pixels
pub const MIN_RESIZE_PX: f64 = 100.0;

/// Default image size as a percentage of the viewport
pub const DEFAULT_SIZE_PERCENT: f64 = 60.0;

/// Image size on coarse-pointer (touch-first) devices
pub const COARSE_POINTER_SIZE_PERCENT: f64 = 85.0;

/// Smallest default-size setting accepted by validation
pub const MIN_DEFAULT_SIZE_PERCENT: f64 = 10.0;

/// Offset between successive unplaced viewers, in pixels
pub const STAGGER_OFFSET_PX: f64 = 30.0;

/// Height of a minimized viewer (title bar only), in pixels
pub const MINIMIZED_HEIGHT: f64 = 36.0;

/// Fade-out duration before a closing viewer is unmounted
pub const CLOSE_FADE_MS: u64 = 200;

// ============================================================================
// Instances
// ============================================================================

/// Default number of concurrently open viewers
pub const DEFAULT_MAX_INSTANCES: u32 = 4;

/// Largest max-instances setting accepted by validation
pub const MAX_INSTANCES_LIMIT: u32 = 10;

// ============================================================================
// Z-Index Tiers
// ============================================================================

/// Tier used while a host panel (drawer, settings, etc.) is open
pub const Z_TIER_LOW: i32 = 1_000;

/// Tier used otherwise, above the host's top bar
pub const Z_TIER_HIGH: i32 = 10_000;

/// Largest slot z-index offset added on top of a tier
pub const Z_TIER_SPAN: i32 = 999;

// ============================================================================
// Layouts
// ============================================================================

/// Minimum slot edge length in percent of the viewport
pub const MIN_SLOT_PERCENT: f64 = 5.0;

/// Default grid size in pixels
pub const DEFAULT_GRID_SIZE: u32 = 20;

/// Size of the first slot of a new layout (percent)
pub const DEFAULT_LAYOUT_SLOT_SIZE: (f64, f64) = (40.0, 60.0);

/// Size of slots added to an existing layout (percent)
pub const DEFAULT_ADDED_SLOT_SIZE: (f64, f64) = (30.0, 40.0);

/// Default slot z-index
pub const DEFAULT_SLOT_Z_INDEX: i32 = 500;

/// Step between staggered default slot positions (percent)
pub const SLOT_STAGGER_PERCENT: f64 = 5.0;

/// Number of staggered positions before wrapping back to the origin
pub const SLOT_STAGGER_WRAP: u32 = 8;

/// Default slot border color
pub const DEFAULT_BORDER_COLOR: &str = "#ffffff";

/// Default slot border width in pixels
pub const DEFAULT_BORDER_WIDTH: f64 = 2.0;

/// Default slot border radius in pixels
pub const DEFAULT_BORDER_RADIUS: f64 = 8.0;

// ============================================================================
// Storage
// ============================================================================

/// Session key: last single-viewer geometry
pub const LAST_POSITION_KEY: &str = "floatingViewer.lastPosition";

/// Session key: per-viewer-id geometry map
pub const LAYOUT_POSITIONS_KEY: &str = "floatingViewer.layoutPositions";

/// Session key: locked viewer ids
pub const LOCKED_VIEWERS_KEY: &str = "floatingViewer.lockedViewers";

/// Durable key: layout registry
pub const LAYOUT_REGISTRY_KEY: &str = "floatingViewer.layouts";

/// Current layout registry format version
pub const LAYOUT_REGISTRY_VERSION: u32 = 1;
