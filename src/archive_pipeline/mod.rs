//! `ArchivePipeline` (C7): orchestrates the streaming + transcode + archive
//! task graph across a menu layout and aggregates completion (§4.5).
//!
//! Grounded in `original_source/archive_management.py::Archive_Manager`.

mod completion;
mod naming;
mod pipeline;
mod plan;

pub use pipeline::ArchivePipeline;
pub use plan::{plan, BuildPlan, BuildRequest, MenuPlan, PreservationCodec};
