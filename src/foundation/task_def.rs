//! `TaskDef`, the unit of work passed between `WorkerPool`, `TaskDispatcher`,
//! and `ArchivePipeline`.
//!
//! The legacy `cargo` bag doubled as both caller context and a dumping
//! ground for dispatcher-injected fields (`percentage`, `message`,
//! `result_tuple`). Per the design note, dispatcher-injected data now lives
//! in a typed `DispatchEvent` (see `dispatcher::events`); `cargo` survives
//! here only as the caller-supplied, open-ended extension point the spec's
//! data model names it as.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The five points in a task's lifecycle a dispatch method can hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    Start,
    Progress,
    Finish,
    Error,
    Abort,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskDef {
    /// Globally unique.
    pub task_id: String,
    /// Groups related tasks for bulk cancel and group-completion queries.
    pub task_prefix: String,
    #[serde(default)]
    pub cargo: BTreeMap<String, Value>,
}

impl TaskDef {
    pub fn new(task_id: impl Into<String>, task_prefix: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            task_prefix: task_prefix.into(),
            cargo: BTreeMap::new(),
        }
    }

    pub fn with_cargo(mut self, key: impl Into<String>, value: Value) -> Self {
        self.cargo.insert(key.into(), value);
        self
    }
}
