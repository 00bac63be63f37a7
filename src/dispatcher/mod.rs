//! Multi-handler lifecycle hooks over `WorkerPool` (C4).
//!
//! Grounded in `background_task_manager.py::Task_Dispatcher` (dispatch
//! methods keyed by `"task_id|event|dispatch_name"`, invoked in ascending
//! lexical `dispatch_name` order, removed wholesale on a terminal event) and
//! in the teacher's `Vec<Arc<dyn Fn>>` listener pattern. Per the design note
//! in §9, the legacy open `dyn Fn(Any)` callable is replaced with a
//! tagged-variant `DispatchEvent`.

mod events;
mod registry;
mod routing;

pub use events::{DispatchEvent, DispatchMethod};
pub use registry::GroupStatus;

use std::sync::Arc;

use crate::foundation::{EventKind, TaskDef};
use crate::worker_pool::WorkerPool;

use registry::Registry;

pub struct TaskDispatcher {
    pool: WorkerPool,
    registry: Arc<Registry>,
}

impl TaskDispatcher {
    pub fn new(worker_threads: Option<usize>) -> Self {
        Self { pool: WorkerPool::new(worker_threads), registry: Arc::new(Registry::new()) }
    }

    /// Registers `dispatch_methods` for `task` and submits it to the pool.
    /// A duplicate `(task_id, event, dispatch_name)` key is a programming
    /// error and fails loudly rather than silently overwriting.
    pub fn submit<F>(
        &self,
        task: TaskDef,
        dispatch_methods: Vec<DispatchMethod>,
        worker: F,
    ) -> Result<String, crate::error::ArchiverError>
    where
        F: FnOnce(crate::worker_pool::WorkerHandle) -> crate::worker_pool::WorkerOutcome + Send + 'static,
    {
        routing::submit(&self.pool, &self.registry, task, dispatch_methods, worker)
    }

    pub fn cancel(&self, task_id: &str) -> bool {
        self.pool.cancel(task_id)
    }

    pub fn cancel_by_prefix(&self, prefix: &str) {
        self.pool.cancel_by_prefix(prefix);
    }

    pub fn wait_for_finished(&self) {
        self.pool.wait_for_finished();
    }

    /// `(pending, completed, errored, aborted)` counts for every task whose
    /// `task_prefix` starts with `prefix`.
    pub fn group_status(&self, prefix: &str) -> GroupStatus {
        self.registry.group_status(prefix)
    }

    /// Registers an event kind independent of (task_id, dispatch_name) —
    /// not part of the spec's contract, exposed only for callers that want
    /// to inspect the registry in tests.
    pub fn registered_event_kinds(&self, task_id: &str) -> Vec<EventKind> {
        self.registry.event_kinds_for(task_id)
    }
}
