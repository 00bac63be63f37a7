use std::sync::mpsc::Sender;
use std::sync::Arc;

use crate::foundation::{CancellationFlag, TaskDef};
use crate::sync_ext::MutexExt;

use super::state::{ActiveEntry, PoolEvent, Shared};

pub type WorkerFn = dyn FnOnce(WorkerHandle) -> WorkerOutcome + Send + 'static;

/// The three exit modes a worker can signal (§4.1): a normal return, a
/// cooperative abort, or an unhandled failure. Panics inside the worker
/// closure are caught by the spawner and folded into `Failed` so one
/// worker panic can never wedge the pool.
#[derive(Debug, Clone)]
pub enum WorkerOutcome {
    Finished(String),
    Failed(String),
    Aborted(String),
}

#[derive(Clone)]
pub struct TaskCallbacks {
    pub started: Arc<dyn Fn(&str) + Send + Sync>,
    pub progress: Arc<dyn Fn(&str, f64, &str) + Send + Sync>,
    pub finished: Arc<dyn Fn(&str, &str) + Send + Sync>,
    pub error: Arc<dyn Fn(&str, &str) + Send + Sync>,
    pub aborted: Arc<dyn Fn(&str, &str) + Send + Sync>,
}

/// Handed to a worker closure so it can check for cooperative cancellation
/// and report progress. Progress reports are routed through the event
/// channel rather than calling the callback directly, since callback
/// delivery must happen on the single dispatcher thread.
pub struct WorkerHandle {
    task_id: String,
    cancel: CancellationFlag,
    event_tx: Sender<PoolEvent>,
}

impl WorkerHandle {
    pub fn cancel_flag(&self) -> &CancellationFlag {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_requested()
    }

    pub fn report_progress(&self, fraction: f64, message: impl Into<String>) {
        let _ = self.event_tx.send(PoolEvent::Progress {
            task_id: self.task_id.clone(),
            fraction,
            message: message.into(),
        });
    }

    pub(super) fn new(task_id: String, cancel: CancellationFlag, event_tx: Sender<PoolEvent>) -> Self {
        Self { task_id, cancel, event_tx }
    }
}

pub(super) struct QueuedTask {
    pub task_id: String,
    pub cancel: CancellationFlag,
    pub worker: Box<WorkerFn>,
}

pub(super) fn submit<F>(shared: &Shared, task: TaskDef, callbacks: TaskCallbacks, worker: F) -> String
where
    F: FnOnce(WorkerHandle) -> WorkerOutcome + Send + 'static,
{
    let task_id = task.task_id.clone();
    let cancel = CancellationFlag::new();

    let mut state = shared.state.lock_unpoisoned();
    state.active.insert(
        task_id.clone(),
        ActiveEntry { prefix: task.task_prefix.clone(), cancel: cancel.clone() },
    );
    state.callbacks.insert(task_id.clone(), callbacks);
    state.queue.push_back(QueuedTask { task_id: task_id.clone(), cancel, worker: Box::new(worker) });
    drop(state);

    shared.not_empty.notify_one();
    task_id
}
