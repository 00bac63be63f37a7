//! `VideoRef` and the per-file settings attached to it.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::encoding_info::EncodingInfo;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoFileSettings {
    pub filters_enabled: Vec<String>,
    pub button_title: String,
    pub menu_button_frame: u64,
    pub menu_group: Option<String>,
}

/// A reference to a single source video within a menu. `id` is assigned at
/// ingest and survives renames within a session; `path` is re-validated at
/// plan time since the file may have moved or been deleted since ingest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoRef {
    pub id: String,
    pub path: PathBuf,
    pub encoding: EncodingInfo,
    pub settings: VideoFileSettings,
}
