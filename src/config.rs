//! Host policy configuration, loaded/saved with the same atomic
//! write-temp-then-rename pattern the teacher's `settings::io` module uses
//! so a crash mid-write never corrupts the file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArchiverError, ArchiverResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Worker pool size; `None` means size by host parallelism, matching
    /// `std::thread::available_parallelism()`.
    #[serde(default)]
    pub worker_threads: Option<usize>,

    #[serde(default = "default_checksum_algorithm")]
    pub checksum_algorithm: ChecksumAlgorithm,

    /// The `2 * frame_time` snap offset the legacy cutter hard-coded,
    /// exposed as a tunable per the open question in the design notes.
    #[serde(default = "default_snap_offset_frames")]
    pub cut_snap_offset_frames: f64,

    #[serde(default = "default_folder_size_gb_dvd")]
    pub default_folder_size_gb_dvd: f64,

    #[serde(default = "default_folder_size_gb_bd")]
    pub default_folder_size_gb_bd: f64,

    /// Whether `TaskDispatcher` persists and replays pending tasks across a
    /// restart (crash recovery).
    #[serde(default)]
    pub crash_recovery_enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChecksumAlgorithm {
    Sha256,
    Md5,
}

impl ChecksumAlgorithm {
    pub fn extension(self) -> &'static str {
        match self {
            ChecksumAlgorithm::Sha256 => "sha256",
            ChecksumAlgorithm::Md5 => "md5",
        }
    }
}

fn default_checksum_algorithm() -> ChecksumAlgorithm {
    ChecksumAlgorithm::Sha256
}

fn default_snap_offset_frames() -> f64 {
    2.0
}

fn default_folder_size_gb_dvd() -> f64 {
    4.0
}

fn default_folder_size_gb_bd() -> f64 {
    25.0
}

impl Default for Config {
    fn default() -> Self {
        Self {
            worker_threads: None,
            checksum_algorithm: default_checksum_algorithm(),
            cut_snap_offset_frames: default_snap_offset_frames(),
            default_folder_size_gb_dvd: default_folder_size_gb_dvd(),
            default_folder_size_gb_bd: default_folder_size_gb_bd(),
            crash_recovery_enabled: false,
        }
    }
}

pub fn read_json_file<T: serde::de::DeserializeOwned + Default>(path: &Path) -> ArchiverResult<T> {
    if !path.exists() {
        return Ok(T::default());
    }
    let bytes = fs::read(path)?;
    if bytes.is_empty() {
        return Ok(T::default());
    }
    Ok(serde_json::from_slice(&bytes)?)
}

pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> ArchiverResult<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let tmp_path = tmp_path_for(path);
    let bytes = serde_json::to_vec_pretty(value)?;
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path).map_err(|err| {
        ArchiverError::Internal(format!(
            "failed to atomically replace {}: {err}",
            path.display()
        ))
    })
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "config".to_string());
    name.push_str(".tmp");
    path.with_file_name(name)
}

impl Config {
    pub fn load(path: &Path) -> ArchiverResult<Self> {
        read_json_file(path)
    }

    pub fn save(&self, path: &Path) -> ArchiverResult<()> {
        write_json_file(path, self)
    }
}
