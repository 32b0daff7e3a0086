//! User-facing notices (toasts) raised by the core.
//!
//! The core never renders these. The host drains the queue after each call
//! and shows them however it likes.

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeVariant {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub variant: NoticeVariant,
    pub message: String,
}

impl Notice {
    pub fn new(variant: NoticeVariant, message: impl Into<String>) -> Self {
        Self {
            variant,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeVariant::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeVariant::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeVariant::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeVariant::Error, message)
    }
}

/// Pending notices in the order they were raised.
#[derive(Debug, Clone, Default)]
pub struct NoticeQueue {
    notices: Vec<Notice>,
}

impl NoticeQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    /// Take every pending notice, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn pending(&self) -> &[Notice] {
        &self.notices
    }

    pub fn count(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }

    pub fn clear(&mut self) {
        self.notices.clear();
    }
}
