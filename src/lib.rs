//! `dvdarchiver`: task dispatcher, archive pipeline, and frame-accurate cut
//! engine for DVD/video archival, built around three coupled subsystems
//! (`WorkerPool`, `TaskDispatcher`, `cut_engine`) plus their direct
//! collaborators (`media_tool`, `edit_store`, `video_copier`,
//! `archive_pipeline`).
//!
//! There is no GUI here; a GUI crate would sit on top of this one's public
//! API (`TaskDispatcher`, `ArchivePipeline`, `cut_engine::cut`, ...) the way
//! a desktop shell sits on top of a transcoding engine.

pub mod archive_pipeline;
pub mod config;
pub mod cut_engine;
pub mod dispatcher;
pub mod domain;
pub mod edit_store;
pub mod error;
pub mod foundation;
pub mod media_tool;
pub mod notify;
pub(crate) mod process_ext;
pub(crate) mod sync_ext;
pub mod video_copier;
pub mod worker_pool;

pub use archive_pipeline::{ArchivePipeline, BuildPlan, BuildRequest, MenuPlan, PreservationCodec};
pub use config::{ChecksumAlgorithm, Config};
pub use dispatcher::{DispatchEvent, DispatchMethod, GroupStatus, TaskDispatcher};
pub use edit_store::{EditStore, Visibility};
pub use error::{ArchiverError, ArchiverResult};
pub use foundation::{CancellationFlag, EventKind, TaskDef};
pub use media_tool::{FfmpegMediaTool, MediaTool};
pub use notify::{Notification, NotificationKind, NotificationSink};
pub use worker_pool::{WorkerHandle, WorkerOutcome, WorkerPool};

/// Installs a `tracing-subscriber` `fmt` layer honoring `RUST_LOG`,
/// defaulting to `info` when unset. Idempotent: a second call is a no-op
/// (matches `tracing_subscriber::fmt().try_init()`'s own guard), so both the
/// CLI and test harnesses can call it freely.
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}
