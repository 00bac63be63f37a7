//! Wires `TaskDispatcher::submit` into `WorkerPool`'s four raw callbacks,
//! fanning each one out to every registered dispatch method for that
//! `(task_id, event)` pair in ascending `dispatch_name` order, and clearing
//! the registry for a task atomically once a terminal event has fired.

use std::sync::Arc;

use crate::error::ArchiverError;
use crate::foundation::TaskDef;
use crate::worker_pool::{TaskCallbacks, WorkerHandle, WorkerOutcome, WorkerPool};

use super::events::{DispatchEvent, DispatchMethod};
use super::registry::{Registry, StackSlot};

pub(super) fn submit<F>(
    pool: &WorkerPool,
    registry: &Arc<Registry>,
    task: TaskDef,
    dispatch_methods: Vec<DispatchMethod>,
    worker: F,
) -> Result<String, ArchiverError>
where
    F: FnOnce(WorkerHandle) -> WorkerOutcome + Send + 'static,
{
    let task_id = task.task_id.clone();
    registry.register_task(&task_id, &task.task_prefix);
    for method in dispatch_methods {
        registry.register_method(&task_id, method)?;
    }

    let reg_started = registry.clone();
    let reg_progress = registry.clone();
    let reg_finished = registry.clone();
    let reg_error = registry.clone();
    let reg_aborted = registry.clone();

    let callbacks = TaskCallbacks {
        started: Arc::new(move |task_id: &str| {
            invoke(&reg_started, task_id, DispatchEvent::Start { task_id: task_id.to_string() });
        }),
        progress: Arc::new(move |task_id: &str, fraction: f64, message: &str| {
            invoke(
                &reg_progress,
                task_id,
                DispatchEvent::Progress {
                    task_id: task_id.to_string(),
                    percentage: fraction * 100.0,
                    message: message.to_string(),
                },
            );
        }),
        finished: Arc::new(move |task_id: &str, result: &str| {
            reg_finished.transition(task_id, StackSlot::Completed);
            let result = annotate_if_group_complete(&reg_finished, task_id, result);
            invoke_terminal(&reg_finished, task_id, DispatchEvent::Finish { task_id: task_id.to_string(), result });
        }),
        error: Arc::new(move |task_id: &str, message: &str| {
            reg_error.transition(task_id, StackSlot::Errored);
            invoke_terminal(
                &reg_error,
                task_id,
                DispatchEvent::Error { task_id: task_id.to_string(), message: message.to_string() },
            );
        }),
        aborted: Arc::new(move |task_id: &str, message: &str| {
            reg_aborted.transition(task_id, StackSlot::Aborted);
            invoke_terminal(
                &reg_aborted,
                task_id,
                DispatchEvent::Abort { task_id: task_id.to_string(), message: message.to_string() },
            );
        }),
    };

    Ok(pool.submit(task, callbacks, worker))
}

fn invoke(registry: &Registry, task_id: &str, event: DispatchEvent) {
    for method in registry.methods_for(task_id, event.kind()) {
        (method.handler)(event.clone());
    }
}

fn invoke_terminal(registry: &Registry, task_id: &str, event: DispatchEvent) {
    invoke(registry, task_id, event);
    registry.clear_methods(task_id);
}

/// §4.2: "the dispatcher surfaces this by transforming the last `finish` of
/// a group's result tuple to `(1, "all done", worker_code, worker_message)`"
/// — once this finish made the group strictly complete (no errors or
/// aborts anywhere under the prefix), the result is annotated accordingly.
fn annotate_if_group_complete(registry: &Registry, task_id: &str, result: &str) -> String {
    let Some(prefix) = registry.prefix_of(task_id) else {
        return result.to_string();
    };
    if registry.group_status(&prefix).is_complete() {
        format!("all done: {result}")
    } else {
        result.to_string()
    }
}
