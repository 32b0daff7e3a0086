//! Error types for the viewer core.
//!
//! Every failure here is recoverable: callers get a typed value back and the
//! host page keeps running with the feature partially unavailable.

use thiserror::Error;

/// Errors from the key-value persistence backends.
#[derive(Error, Debug)]
pub enum StorageError {
    /// IO error from std::io
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encode/decode error from serde_json
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Backend refused the operation (quota, private mode, etc.)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Rejected layout registry mutations. The registry is left unchanged.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LayoutError {
    #[error("Layout not found: {0}")]
    NotFound(String),

    #[error("Slot {slot_id} not found in layout {layout_id}")]
    SlotNotFound { layout_id: String, slot_id: u32 },

    #[error("A layout must keep at least one slot")]
    LastSlot,

    #[error("Slot limit reached ({max})")]
    CapacityExceeded { max: u32 },

    #[error("Slot index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },

    /// Builder action with no layout or slot selected
    #[error("No layout or slot selected")]
    NoSelection,
}

/// Result type alias for layout operations
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Failures while opening or driving viewer windows.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ViewerError {
    /// The render template is not available
    #[error("Viewer template not available")]
    ResourceMissing,

    /// Every viewer id in the allowed range is taken
    #[error("No free viewer slot (max {max})")]
    CapacityExceeded { max: u32 },

    /// The image could not be loaded
    #[error("Failed to load image: {0}")]
    LoadFailed(String),

    /// No instance with this key is open
    #[error("Unknown viewer instance {0}")]
    UnknownInstance(u64),
}

/// Result type alias for viewer operations
pub type ViewerResult<T> = Result<T, ViewerError>;
