//! The `(task_id, event, dispatch_name)`-keyed method registry plus the
//! four lifecycle stacks `TaskDispatcher` owns (§3 "Ownership").
//!
//! Two related-but-distinct notions of "complete" are tracked here, per an
//! open question this port had to resolve (recorded in DESIGN.md):
//! `GroupStatus::is_terminated` (every task under the prefix reached some
//! terminal state — used by `ArchivePipeline` to gate the archive task) and
//! `GroupStatus::is_complete`, the stricter reading of §4.2 ("group-complete
//! iff pending == errored == aborted == 0", i.e. nothing failed either).

use std::collections::BTreeMap;
use std::sync::Mutex;

use crate::foundation::EventKind;
use crate::sync_ext::MutexExt;

use super::events::DispatchMethod;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GroupStatus {
    pub pending: usize,
    pub completed: usize,
    pub errored: usize,
    pub aborted: usize,
}

impl GroupStatus {
    /// Every task under the prefix has reached a terminal state, whether or
    /// not it succeeded. This is what gates dependent work (§4.5).
    pub fn is_terminated(&self) -> bool {
        self.pending == 0
    }

    /// The literal §4.2 reading: no pending, errored, or aborted tasks
    /// remain for the prefix.
    pub fn is_complete(&self) -> bool {
        self.pending == 0 && self.errored == 0 && self.aborted == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum StackSlot {
    Pending,
    Completed,
    Errored,
    Aborted,
}

struct TaskEntry {
    prefix: String,
    slot: StackSlot,
}

#[derive(Default)]
struct Inner {
    tasks: BTreeMap<String, TaskEntry>,
    methods: BTreeMap<(String, EventKind, String), DispatchMethod>,
}

pub struct Registry {
    inner: Mutex<Inner>,
}

impl Registry {
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    pub fn register_task(&self, task_id: &str, prefix: &str) {
        let mut inner = self.inner.lock_unpoisoned();
        inner
            .tasks
            .insert(task_id.to_string(), TaskEntry { prefix: prefix.to_string(), slot: StackSlot::Pending });
    }

    /// Inserts a dispatch method, failing with `Internal` on a duplicate
    /// `(task_id, event, dispatch_name)` key per §4.2.
    pub fn register_method(&self, task_id: &str, method: DispatchMethod) -> Result<(), crate::error::ArchiverError> {
        let key = (task_id.to_string(), method.event, method.dispatch_name.clone());
        let mut inner = self.inner.lock_unpoisoned();
        if inner.methods.contains_key(&key) {
            return Err(crate::error::ArchiverError::Internal(format!(
                "duplicate dispatch method ({}, {:?}, {})",
                key.0, key.1, key.2
            )));
        }
        inner.methods.insert(key, method);
        Ok(())
    }

    /// Methods matching `(task_id, event, *)`, in ascending lexical order of
    /// `dispatch_name`.
    pub fn methods_for(&self, task_id: &str, event: EventKind) -> Vec<DispatchMethod> {
        let inner = self.inner.lock_unpoisoned();
        let mut methods: Vec<DispatchMethod> = inner
            .methods
            .iter()
            .filter(|((tid, ev, _), _)| tid == task_id && *ev == event)
            .map(|(_, method)| method.clone())
            .collect();
        methods.sort_by(|a, b| a.dispatch_name.cmp(&b.dispatch_name));
        methods
    }

    /// Removes every dispatch method for `task_id` atomically. Called after
    /// invoking a terminal event's handlers.
    pub fn clear_methods(&self, task_id: &str) {
        let mut inner = self.inner.lock_unpoisoned();
        inner.methods.retain(|(tid, _, _), _| tid != task_id);
    }

    pub(super) fn transition(&self, task_id: &str, slot: StackSlot) {
        let mut inner = self.inner.lock_unpoisoned();
        if let Some(entry) = inner.tasks.get_mut(task_id) {
            entry.slot = slot;
        }
    }

    pub fn prefix_of(&self, task_id: &str) -> Option<String> {
        self.inner.lock_unpoisoned().tasks.get(task_id).map(|entry| entry.prefix.clone())
    }

    pub fn group_status(&self, prefix: &str) -> GroupStatus {
        let inner = self.inner.lock_unpoisoned();
        let mut status = GroupStatus::default();
        for entry in inner.tasks.values().filter(|e| e.prefix.starts_with(prefix)) {
            match entry.slot {
                StackSlot::Pending => status.pending += 1,
                StackSlot::Completed => status.completed += 1,
                StackSlot::Errored => status.errored += 1,
                StackSlot::Aborted => status.aborted += 1,
            }
        }
        status
    }

    pub fn event_kinds_for(&self, task_id: &str) -> Vec<EventKind> {
        let inner = self.inner.lock_unpoisoned();
        inner
            .methods
            .keys()
            .filter(|(tid, _, _)| tid == task_id)
            .map(|(_, ev, _)| *ev)
            .collect()
    }
}
