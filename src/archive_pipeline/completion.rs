//! Pipeline-level error accumulation and the idempotent final notification
//! (§4.5 completion reporting, §7 propagation).

use std::sync::Mutex;

use crate::notify::{Notification, NotificationSink};
use crate::sync_ext::MutexExt;

#[derive(Default)]
struct Inner {
    errors: Vec<String>,
    notified: bool,
}

/// Tracks the de-duplicated pipeline error list and the single aggregated
/// notification fired once the whole `AM_<dvd_name>_` task group has
/// terminated. Dispatcher callbacks run on one thread (§4.1), so the
/// `notified` flag only needs the mutex for visibility, not for races.
pub struct PipelineState {
    inner: Mutex<Inner>,
}

impl PipelineState {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        let mut inner = self.inner.lock_unpoisoned();
        if !inner.errors.contains(&message) {
            inner.errors.push(message);
        }
    }

    pub fn has_errors(&self) -> bool {
        !self.inner.lock_unpoisoned().errors.is_empty()
    }

    /// Emits the aggregated report on `sink` exactly once.
    pub fn notify_once_complete(&self, sink: &NotificationSink, dvd_name: &str) {
        let mut inner = self.inner.lock_unpoisoned();
        if inner.notified {
            return;
        }
        inner.notified = true;
        let errors = inner.errors.clone();
        drop(inner);

        if errors.is_empty() {
            sink.emit(Notification::info(format!("{dvd_name}: build complete")));
        } else {
            sink.emit(Notification::error(format!(
                "{dvd_name}: build finished with {} error(s): {}",
                errors.len(),
                errors.join("; ")
            )));
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    #[test]
    fn duplicate_errors_are_not_recorded_twice() {
        let state = PipelineState::new();
        state.record_error("boom");
        state.record_error("boom");
        state.record_error("bang");
        assert!(state.has_errors());
        assert_eq!(state.inner.lock_unpoisoned().errors.len(), 2);
    }

    #[test]
    fn notify_fires_exactly_once() {
        let state = PipelineState::new();
        let sink = NotificationSink::new();
        let count = Arc::new(AtomicUsize::new(0));
        let count_clone = count.clone();
        sink.register(move |_| {
            count_clone.fetch_add(1, Ordering::SeqCst);
        });

        state.notify_once_complete(&sink, "Movie");
        state.notify_once_complete(&sink, "Movie");
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
