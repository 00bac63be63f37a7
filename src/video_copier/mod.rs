//! `VideoFileCopier` (C6): size-bounded folder splitting with per-file
//! checksum sidecars (§4.4).
//!
//! Grounded in `original_source/dvdarch_utils.py`'s folder-splitting copy
//! routine: files are consumed in ascending creation-time order so playback
//! order on the archived disks matches shooting order, oversized files are
//! routed through the cut engine's chunked splitter first, and every copy is
//! hash-verified before its sidecar is written.

mod checksum;
mod copier;

pub use checksum::{hash_file, sidecar_path};
pub use copier::{copy_folder_into_folders, verify_files_integrity, CopyReport};
