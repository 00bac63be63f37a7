//! Shared types depended on by `WorkerPool`, `CutEngine`, and
//! `ArchivePipeline` alike.
//!
//! The legacy codebase isolated these in a "break-circular" unit to work
//! around import cycles. There is no such cycle here: this is just the
//! foundation layer every higher component sits on (§9 design notes).

pub mod cancel;
pub mod runner;
pub mod task_def;

pub use cancel::CancellationFlag;
pub use runner::{run_cooperative, RunOutcome};
pub use task_def::{EventKind, TaskDef};
