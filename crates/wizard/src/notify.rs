//! User-facing dialogs
//!
//! The wizard reports outcomes through `Notifier`. A UI shows them as
//! blocking dialogs; the CLI logs them.

use std::sync::Mutex;
use tracing::{error, info};

pub trait Notifier: Send + Sync {
    /// Blocking error dialog
    fn error(&self, title: &str, message: &str);

    /// Success dialog
    fn success(&self, title: &str, message: &str);
}

/// Writes every notice to the log
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn error(&self, title: &str, message: &str) {
        error!(title, message, "Wizard error");
    }

    fn success(&self, title: &str, message: &str) {
        info!(title, message, "Wizard success");
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Error { title: String, message: String },
    Success { title: String, message: String },
}

/// Keeps notices in memory for inspection
#[derive(Default)]
pub struct RecordingNotifier {
    notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }

    /// Message of the most recent error dialog
    pub fn last_error(&self) -> Option<String> {
        self.notices().into_iter().rev().find_map(|notice| match notice {
            Notice::Error { message, .. } => Some(message),
            Notice::Success { .. } => None,
        })
    }

    fn push(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

impl Notifier for RecordingNotifier {
    fn error(&self, title: &str, message: &str) {
        self.push(Notice::Error {
            title: title.to_string(),
            message: message.to_string(),
        });
    }

    fn success(&self, title: &str, message: &str) {
        self.push(Notice::Success {
            title: title.to_string(),
            message: message.to_string(),
        });
    }
}
