use crate::sync_ext::{CondvarExt, MutexExt};

use super::state::Shared;

pub(super) fn cancel(shared: &Shared, task_id: &str) -> bool {
    let state = shared.state.lock_unpoisoned();
    match state.active.get(task_id) {
        Some(entry) => {
            entry.cancel.request();
            true
        }
        None => false,
    }
}

pub(super) fn cancel_by_prefix(shared: &Shared, prefix: &str) {
    let state = shared.state.lock_unpoisoned();
    for entry in state.active.values().filter(|entry| entry.prefix.starts_with(prefix)) {
        entry.cancel.request();
    }
}

pub(super) fn active_tasks(shared: &Shared) -> Vec<String> {
    shared.state.lock_unpoisoned().active.keys().cloned().collect()
}

pub(super) fn wait_for_finished(shared: &Shared) {
    let state = shared.state.lock_unpoisoned();
    let _ = shared.idle.wait_while_unpoisoned(state, |inner| !inner.active.is_empty());
}
