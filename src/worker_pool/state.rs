use std::collections::{BTreeMap, VecDeque};
use std::sync::mpsc::Sender;
use std::sync::{Condvar, Mutex};

use crate::foundation::CancellationFlag;
use crate::sync_ext::{CondvarExt, MutexExt};

use super::enqueue::{QueuedTask, TaskCallbacks};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalKind {
    Finished,
    Error,
    Aborted,
}

pub enum PoolEvent {
    Started { task_id: String },
    Progress { task_id: String, fraction: f64, message: String },
    Terminal { task_id: String, kind: TerminalKind, message: String },
    Shutdown,
}

pub(super) struct ActiveEntry {
    pub prefix: String,
    pub cancel: CancellationFlag,
}

#[derive(Default)]
pub(super) struct Inner {
    pub queue: VecDeque<QueuedTask>,
    pub active: BTreeMap<String, ActiveEntry>,
    pub callbacks: BTreeMap<String, TaskCallbacks>,
    pub shutdown: bool,
}

pub struct Shared {
    pub(super) state: Mutex<Inner>,
    pub(super) not_empty: Condvar,
    pub(super) idle: Condvar,
    pub(super) event_tx: Sender<PoolEvent>,
}

impl Shared {
    pub fn new(event_tx: Sender<PoolEvent>) -> Self {
        Self {
            state: Mutex::new(Inner::default()),
            not_empty: Condvar::new(),
            idle: Condvar::new(),
            event_tx,
        }
    }

    pub(super) fn take_callbacks(&self, task_id: &str) -> Option<TaskCallbacks> {
        self.state.lock_unpoisoned().callbacks.remove(task_id)
    }

    pub(super) fn clone_callbacks(&self, task_id: &str) -> Option<TaskCallbacks> {
        self.state.lock_unpoisoned().callbacks.get(task_id).cloned()
    }

    pub(super) fn finalize(&self, task_id: &str) {
        let mut state = self.state.lock_unpoisoned();
        state.active.remove(task_id);
        if state.active.is_empty() {
            self.idle.notify_all();
        }
    }
}

pub(super) fn request_shutdown(shared: &Shared) {
    shared.state.lock_unpoisoned().shutdown = true;
    shared.not_empty.notify_all();
}
