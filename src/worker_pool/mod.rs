//! Bounded parallel executor with per-task cancellation flags (C3).
//!
//! Grounded in `ffui_core::engine::worker` (`spawner.rs`, `control.rs`,
//! `enqueue.rs`): a fixed pool of worker threads pulls queued tasks off a
//! `VecDeque` guarded by `Mutex` + `Condvar`, and exactly one dedicated
//! dispatcher thread drains a channel of pool events so every lifecycle
//! callback fires from a single thread (§4.1) — never from a worker thread,
//! so handler code can mutate caller-owned state without its own locking.
//!
//! `sync_ext::{MutexExt, CondvarExt}` (poison-recovery helpers copied
//! verbatim from the teacher) back every lock here: a worker panic must
//! never wedge the pool for everyone else.

mod control;
mod enqueue;
mod spawner;
mod state;

use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

pub use enqueue::{TaskCallbacks, WorkerFn, WorkerHandle, WorkerOutcome};
pub use state::{PoolEvent, TerminalKind};

use state::Shared;

pub struct WorkerPool {
    shared: Arc<Shared>,
    worker_handles: Vec<JoinHandle<()>>,
    dispatcher_handle: Option<JoinHandle<()>>,
}

impl WorkerPool {
    /// Sizes the pool by host parallelism when `worker_threads` is `None`,
    /// matching `std::thread::available_parallelism()`.
    pub fn new(worker_threads: Option<usize>) -> Self {
        let n = worker_threads
            .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(4))
            .max(1);

        let (event_tx, event_rx) = mpsc::channel::<PoolEvent>();
        let shared = Arc::new(Shared::new(event_tx));

        let worker_handles = (0..n)
            .map(|_| {
                let shared = shared.clone();
                std::thread::spawn(move || spawner::worker_loop(shared))
            })
            .collect();

        let dispatcher_shared = shared.clone();
        let dispatcher_handle = Some(std::thread::spawn(move || {
            spawner::dispatcher_loop(dispatcher_shared, event_rx);
        }));

        Self { shared, worker_handles, dispatcher_handle }
    }

    pub fn submit<F>(&self, task: crate::foundation::TaskDef, callbacks: TaskCallbacks, worker: F) -> String
    where
        F: FnOnce(WorkerHandle) -> WorkerOutcome + Send + 'static,
    {
        enqueue::submit(&self.shared, task, callbacks, worker)
    }

    pub fn cancel(&self, task_id: &str) -> bool {
        control::cancel(&self.shared, task_id)
    }

    pub fn cancel_by_prefix(&self, prefix: &str) {
        control::cancel_by_prefix(&self.shared, prefix);
    }

    pub fn active_tasks(&self) -> Vec<String> {
        control::active_tasks(&self.shared)
    }

    pub fn wait_for_finished(&self) {
        control::wait_for_finished(&self.shared);
    }

    pub fn shutdown(mut self) {
        self.shutdown_inner();
    }

    fn shutdown_inner(&mut self) {
        state::request_shutdown(&self.shared);
        for handle in self.worker_handles.drain(..) {
            let _ = handle.join();
        }
        let _ = self.shared.event_tx.send(PoolEvent::Shutdown);
        if let Some(handle) = self.dispatcher_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        self.shutdown_inner();
    }
}
