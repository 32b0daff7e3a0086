//! Floating image viewer core.
//!
//! Replaces a chat UI's image popups with floating, draggable, zoomable
//! viewer windows, optionally arranged into user-defined percent-based
//! layouts. The host owns the DOM: it feeds events in and applies the
//! [`pool::RenderCommand`]s and [`notifications::Notice`]s that come out.

pub mod builder;
pub mod constants;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod notifications;
pub mod perf;
pub mod pool;
pub mod settings;
pub mod spatial_index;
pub mod storage;
pub mod viewer;

pub use error::{LayoutError, StorageError, ViewerError};
pub use layout::{LayoutManager, SharedLayouts};
pub use pool::{OpenTrigger, RenderCommand, TriggerKind, ViewerPool};
pub use settings::Settings;
