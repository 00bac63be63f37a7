//! Per-task cancellation signal.
//!
//! The legacy implementation kept one process-wide `Cancel_All_Tasks`
//! singleton. Per the re-architecture note in §9, cancellation here is an
//! explicitly owned handle per task; `WorkerPool::cancel_by_prefix` fans
//! out to every matching task's flag instead of flipping one global switch.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct CancellationFlag(Arc<AtomicBool>);

impl CancellationFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn request(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}
