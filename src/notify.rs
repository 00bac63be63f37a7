//! The non-blocking notification channel that is the sole coupling between
//! the core and any GUI (§7). Grounded in
//! `ffui_core::engine::listeners` — a mutex-guarded `Vec` of
//! `Arc<dyn Fn(T) + Send + Sync>` rather than an async channel, since
//! listeners here are expected to be cheap (forward to a UI event bus) and
//! callers never need to await delivery.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

use crate::sync_ext::MutexExt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Info,
    Message,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    /// Wall-clock time the notification was raised, for display the way the
    /// teacher's activity log timestamps its entries.
    pub at: DateTime<Local>,
}

impl Notification {
    pub fn info(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Info, message: message.into(), at: Local::now() }
    }

    pub fn message(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Message, message: message.into(), at: Local::now() }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self { kind: NotificationKind::Error, message: message.into(), at: Local::now() }
    }
}

type Listener = Arc<dyn Fn(Notification) + Send + Sync>;

#[derive(Default)]
pub struct NotificationSink {
    listeners: Mutex<Vec<Listener>>,
}

impl NotificationSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, listener: impl Fn(Notification) + Send + Sync + 'static) {
        self.listeners.lock_unpoisoned().push(Arc::new(listener));
    }

    pub fn emit(&self, notification: Notification) {
        for listener in self.listeners.lock_unpoisoned().iter() {
            listener(notification.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    #[test]
    fn registered_listeners_all_receive_emitted_notifications() {
        let sink = NotificationSink::new();
        let count = Arc::new(AtomicUsize::new(0));

        for _ in 0..3 {
            let count = count.clone();
            sink.register(move |_| {
                count.fetch_add(1, Ordering::SeqCst);
            });
        }

        sink.emit(Notification::info("hello"));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
