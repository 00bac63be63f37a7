use std::sync::mpsc::Receiver;
use std::sync::Arc;

use crate::sync_ext::{CondvarExt, MutexExt};

use super::enqueue::{WorkerHandle, WorkerOutcome};
use super::state::{PoolEvent, Shared, TerminalKind};

pub(super) fn worker_loop(shared: Arc<Shared>) {
    loop {
        let mut state = shared.state.lock_unpoisoned();
        state = shared
            .not_empty
            .wait_while_unpoisoned(state, |inner| inner.queue.is_empty() && !inner.shutdown);

        let Some(queued) = state.queue.pop_front() else {
            // Empty queue and shutdown requested: nothing left to do.
            return;
        };
        drop(state);

        let task_id = queued.task_id;
        let _ = shared.event_tx.send(PoolEvent::Started { task_id: task_id.clone() });

        if queued.cancel.is_requested() {
            finalize(&shared, &task_id, TerminalKind::Aborted, "cancelled before start".to_string());
            continue;
        }

        let handle = WorkerHandle::new(task_id.clone(), queued.cancel.clone(), shared.event_tx.clone());
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| (queued.worker)(handle)));

        match result {
            Ok(WorkerOutcome::Finished(message)) => finalize(&shared, &task_id, TerminalKind::Finished, message),
            Ok(WorkerOutcome::Failed(message)) => finalize(&shared, &task_id, TerminalKind::Error, message),
            Ok(WorkerOutcome::Aborted(message)) => finalize(&shared, &task_id, TerminalKind::Aborted, message),
            Err(panic) => finalize(&shared, &task_id, TerminalKind::Error, panic_message(&panic)),
        }
    }
}

fn finalize(shared: &Shared, task_id: &str, kind: TerminalKind, message: String) {
    shared.finalize(task_id);
    let _ = shared.event_tx.send(PoolEvent::Terminal { task_id: task_id.to_string(), kind, message });
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        format!("worker panicked: {s}")
    } else if let Some(s) = panic.downcast_ref::<String>() {
        format!("worker panicked: {s}")
    } else {
        "worker panicked with a non-string payload".to_string()
    }
}

pub(super) fn dispatcher_loop(shared: Arc<Shared>, event_rx: Receiver<PoolEvent>) {
    for event in event_rx.iter() {
        match event {
            PoolEvent::Shutdown => break,
            PoolEvent::Started { task_id } => {
                if let Some(callbacks) = shared.clone_callbacks(&task_id) {
                    (callbacks.started)(&task_id);
                }
            }
            PoolEvent::Progress { task_id, fraction, message } => {
                if let Some(callbacks) = shared.clone_callbacks(&task_id) {
                    (callbacks.progress)(&task_id, fraction, &message);
                }
            }
            PoolEvent::Terminal { task_id, kind, message } => {
                if let Some(callbacks) = shared.take_callbacks(&task_id) {
                    match kind {
                        TerminalKind::Finished => (callbacks.finished)(&task_id, &message),
                        TerminalKind::Error => (callbacks.error)(&task_id, &message),
                        TerminalKind::Aborted => (callbacks.aborted)(&task_id, &message),
                    }
                }
            }
        }
    }
}
