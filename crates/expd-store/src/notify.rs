//! Operator notifications ("toasts").

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

/// Severity of a notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToastLevel {
    /// A call went through.
    Success,
    /// Neutral information.
    Info,
    /// Something needs the operator's attention.
    Warning,
    /// A call was rejected or failed.
    Error,
}

/// One operator-facing message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Toast {
    /// Severity.
    pub level: ToastLevel,
    /// Text shown to the operator.
    pub message: String,
}

impl Toast {
    /// Success notification.
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Success,
            message: message.into(),
        }
    }

    /// Error notification.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ToastLevel::Error,
            message: message.into(),
        }
    }
}

/// Sink for notifications.
pub trait Notifier: Send + Sync + std::fmt::Debug {
    fn notify(&self, toast: Toast);
}

/// Writes notifications to the log.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNotifier;

impl Notifier for TracingNotifier {
    fn notify(&self, toast: Toast) {
        match toast.level {
            ToastLevel::Success | ToastLevel::Info => {
                tracing::info!(toast = %toast.message, "notification")
            }
            ToastLevel::Warning | ToastLevel::Error => {
                tracing::warn!(toast = %toast.message, "notification")
            }
        }
    }
}

/// Collects notifications in memory until drained.
#[derive(Debug, Default)]
pub struct ToastQueue {
    toasts: Mutex<Vec<Toast>>,
}

impl ToastQueue {
    /// Empty queue.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Toast> {
        std::mem::take(&mut *self.toasts.lock())
    }

    /// Most recent notification.
    pub fn last(&self) -> Option<Toast> {
        self.toasts.lock().last().cloned()
    }

    /// Number of queued notifications.
    pub fn len(&self) -> usize {
        self.toasts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for ToastQueue {
    fn notify(&self, toast: Toast) {
        self.toasts.lock().push(toast);
    }
}
