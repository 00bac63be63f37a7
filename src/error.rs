//! Typed error model shared by every component.
//!
//! Mirrors the error *kinds* named in the specification rather than
//! tool-specific strings: callers never see a raw `ffmpeg` stderr blob,
//! only one of the variants below (§7 error handling design).

use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiverError {
    /// Path missing, not writeable, insufficient disk space, incompatible
    /// video standard, bad aspect ratio, non-monotonic edit cuts.
    #[error("preflight check failed: {0}")]
    Preflight(String),

    /// External tool exited non-zero (and not the ffmpeg `1` warning case).
    #[error("external tool failed (exit {exit_code}): {message}")]
    ToolFailure { exit_code: i32, message: String },

    /// A B-frame's packet position and PTS disagree about GOP ownership
    /// while scanning I-frame boundaries around a cut.
    #[error("open GOP detected while scanning for I-frame boundaries")]
    OpenGop,

    /// Destination hash did not match the source hash after a copy.
    #[error("checksum mismatch after copy: {path}")]
    CorruptionOnCopy { path: PathBuf },

    /// Cooperative cancellation observed; the task must terminate via
    /// `aborted`, never `finished`.
    #[error("task was cancelled")]
    Cancelled,

    /// Contract violation, e.g. a duplicate `(task_id, event, dispatch_name)`
    /// registration.
    #[error("internal contract violation: {0}")]
    Internal(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type ArchiverResult<T> = Result<T, ArchiverError>;
