//! `copy_folder_into_folders` / `verify_files_integrity` (§4.4).

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::ChecksumAlgorithm;
use crate::cut_engine::split_large;
use crate::error::{ArchiverError, ArchiverResult};
use crate::foundation::CancellationFlag;
use crate::media_tool::MediaTool;

use super::checksum::{hash_file, sidecar_path};

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;
const MIN_FOLDER_SIZE_GB: f64 = 0.5;

#[derive(Debug, Default, Clone)]
pub struct CopyReport {
    pub disks_written: u32,
    pub files_copied: u32,
}

/// Copies every regular file directly under `src`, ordered by ascending
/// creation time, into `dest_root/<menu_title> - Disk_NN/` folders each
/// bounded by `folder_size_gb`. Oversized source files are chunked through
/// the cut engine first; the chunks replace the original in the copy queue
/// and are removed once copied.
pub fn copy_folder_into_folders(
    tool: &dyn MediaTool,
    src: &Path,
    dest_root: &Path,
    menu_title: &str,
    folder_size_gb: f64,
    hash_algorithm: ChecksumAlgorithm,
    cancel: &CancellationFlag,
) -> ArchiverResult<CopyReport> {
    if !src.exists() {
        return Err(ArchiverError::Preflight(format!("source folder {} does not exist", src.display())));
    }
    if src == dest_root {
        return Err(ArchiverError::Preflight("source and destination roots must differ".to_string()));
    }
    if folder_size_gb <= MIN_FOLDER_SIZE_GB {
        return Err(ArchiverError::Preflight(format!("folder_size_gb must be > {MIN_FOLDER_SIZE_GB}, got {folder_size_gb}")));
    }
    fs::create_dir_all(dest_root)?;

    let folder_size_bytes = folder_size_gb * BYTES_PER_GIB;
    let available = fs2::available_space(dest_root).map_err(|err| ArchiverError::Preflight(format!("could not read free space for {}: {err}", dest_root.display())))?;
    if (available as f64) < folder_size_bytes {
        return Err(ArchiverError::Preflight(format!(
            "destination {} has {available} bytes free, need at least {folder_size_bytes} for one disk folder",
            dest_root.display()
        )));
    }

    let mut entries = ordered_by_creation_time(src)?;
    let temp_dir = dest_root.join(format!(".{menu_title}_split_tmp"));
    let mut queue: Vec<PathBuf> = Vec::new();
    let mut temp_chunks: Vec<PathBuf> = Vec::new();

    for path in entries.drain(..) {
        let size = fs::metadata(&path)?.len() as f64;
        if size > folder_size_bytes {
            let chunks = split_large(tool, &path, &temp_dir, folder_size_gb, 2.0, cancel)?;
            temp_chunks.extend(chunks.iter().cloned());
            queue.extend(chunks);
        } else {
            queue.push(path);
        }
    }

    let mut disk_index: u32 = 1;
    let mut disk_dir = disk_folder(dest_root, menu_title, disk_index);
    fs::create_dir_all(&disk_dir)?;
    let mut disk_used: f64 = 0.0;
    let mut report = CopyReport { disks_written: 1, files_copied: 0 };

    for path in &queue {
        if cancel.is_requested() {
            return Err(ArchiverError::Cancelled);
        }
        let size = fs::metadata(path)?.len() as f64;
        if disk_used > 0.0 && disk_used + size > folder_size_bytes {
            disk_index += 1;
            disk_dir = disk_folder(dest_root, menu_title, disk_index);
            fs::create_dir_all(&disk_dir)?;
            disk_used = 0.0;
            report.disks_written += 1;
        }

        let file_name = path.file_name().ok_or_else(|| ArchiverError::Internal(format!("{} has no file name", path.display())))?;
        let dest_path = disk_dir.join(file_name);

        let source_hash = hash_file(path, hash_algorithm)?;
        fs::copy(path, &dest_path)?;
        copy_timestamps(path, &dest_path);

        let dest_hash = hash_file(&dest_path, hash_algorithm)?;
        if dest_hash != source_hash {
            return Err(ArchiverError::CorruptionOnCopy { path: dest_path });
        }
        fs::write(sidecar_path(&dest_path, hash_algorithm), &dest_hash)?;

        disk_used += size;
        report.files_copied += 1;
    }

    for chunk in &temp_chunks {
        if let Err(err) = fs::remove_file(chunk) {
            warn!(error = %err, path = %chunk.display(), "could not remove temp split chunk after copy");
        }
    }
    if temp_dir.exists() {
        let _ = fs::remove_dir(&temp_dir);
    }

    info!(disks = report.disks_written, files = report.files_copied, "copy_folder_into_folders finished");
    Ok(report)
}

/// Walks `folder` and returns the files lacking a matching checksum
/// sidecar, or whose sidecar digest does not match the file's current
/// content.
pub fn verify_files_integrity(folder: &Path, hash_algorithm: ChecksumAlgorithm) -> ArchiverResult<Vec<PathBuf>> {
    let mut failures = Vec::new();
    let ext = hash_algorithm.extension();
    visit_files(folder, &mut |path| {
        if path.extension().and_then(|e| e.to_str()) == Some(ext) {
            return Ok(());
        }
        let sidecar = sidecar_path(path, hash_algorithm);
        let Ok(expected) = fs::read_to_string(&sidecar) else {
            failures.push(path.to_path_buf());
            return Ok(());
        };
        let actual = hash_file(path, hash_algorithm)?;
        if actual != expected.trim() {
            failures.push(path.to_path_buf());
        }
        Ok(())
    })?;
    Ok(failures)
}

fn disk_folder(dest_root: &Path, menu_title: &str, index: u32) -> PathBuf {
    dest_root.join(format!("{menu_title} - Disk_{index:02}"))
}

fn ordered_by_creation_time(dir: &Path) -> ArchiverResult<Vec<PathBuf>> {
    let mut entries: Vec<(PathBuf, std::time::SystemTime)> = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let created = meta.created().or_else(|_| meta.modified()).unwrap_or(std::time::UNIX_EPOCH);
        entries.push((entry.path(), created));
    }
    entries.sort_by_key(|(_, created)| *created);
    Ok(entries.into_iter().map(|(path, _)| path).collect())
}

fn copy_timestamps(src: &Path, dest: &Path) {
    let Ok(meta) = fs::metadata(src) else { return };
    let mtime = filetime::FileTime::from_last_modification_time(&meta);
    if let Err(err) = filetime::set_file_mtime(dest, mtime) {
        warn!(error = %err, path = %dest.display(), "could not preserve mtime on copy");
    }
}

fn visit_files(dir: &Path, visitor: &mut impl FnMut(&Path) -> ArchiverResult<()>) -> ArchiverResult<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            visit_files(&path, visitor)?;
        } else {
            visitor(&path)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::domain::{EncodingInfo, Rational};
    use crate::media_tool::{FrameInfo, H26xOptions, MezzanineOptions};

    use super::*;

    struct NoopTool;
    impl MediaTool for NoopTool {
        fn probe(&self, _path: &Path) -> ArchiverResult<EncodingInfo> {
            unimplemented!()
        }
        fn probe_frames(&self, _path: &Path, _t_start: f64, _window_s: f64) -> ArchiverResult<Vec<FrameInfo>> {
            unimplemented!()
        }
        fn cut_stream_copy(&self, _input: &Path, _output: &Path, _t_start: f64, _t_end: f64, _cancel: &CancellationFlag) -> ArchiverResult<()> {
            unimplemented!()
        }
        fn reencode_segment(&self, _input: &Path, _output: &Path, _encoding: &EncodingInfo, _t_start: f64, _t_end: f64, _gop_size: u32, _cancel: &CancellationFlag) -> ArchiverResult<()> {
            unimplemented!()
        }
        fn transcode_h26x(&self, _input: &Path, _out_dir: &Path, _options: &H26xOptions, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn transcode_ffv1(&self, _input: &Path, _out_dir: &Path, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn transcode_dv(&self, _input: &Path, _out_dir: &Path, _frame_rate: Rational, _width: u32, _height: u32, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn transcode_mezzanine(&self, _input: &Path, _out_dir: &Path, _options: &MezzanineOptions, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn concatenate(&self, _files: &[PathBuf], _output: &Path, _transcode_format: Option<&str>, _delete_temps: bool, _cancel: &CancellationFlag) -> ArchiverResult<()> {
            unimplemented!()
        }
        fn make_iso(&self, _in_dir: &Path, _out_iso: &Path, _cancel: &CancellationFlag) -> ArchiverResult<()> {
            unimplemented!()
        }
    }

    #[test]
    fn copies_small_files_into_a_single_disk_folder_with_sidecars() {
        let src_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        std::fs::write(src_dir.path().join("01_button.mp4"), vec![0u8; 1024]).unwrap();
        std::fs::write(src_dir.path().join("02_button.mp4"), vec![1u8; 2048]).unwrap();

        let report = copy_folder_into_folders(
            &NoopTool,
            src_dir.path(),
            dest_dir.path(),
            "01_intro",
            1.0,
            ChecksumAlgorithm::Sha256,
            &CancellationFlag::new(),
        )
        .unwrap();

        assert_eq!(report.disks_written, 1);
        assert_eq!(report.files_copied, 2);

        let disk_dir = dest_dir.path().join("01_intro - Disk_01");
        assert!(disk_dir.join("01_button.mp4").exists());
        assert!(disk_dir.join("01_button.mp4.sha256").exists());

        let failures = verify_files_integrity(dest_dir.path(), ChecksumAlgorithm::Sha256).unwrap();
        assert!(failures.is_empty());
    }

    #[test]
    fn verify_flags_a_file_with_no_sidecar() {
        let dest_dir = tempfile::tempdir().unwrap();
        std::fs::write(dest_dir.path().join("orphan.mp4"), b"no sidecar here").unwrap();

        let failures = verify_files_integrity(dest_dir.path(), ChecksumAlgorithm::Sha256).unwrap();
        assert_eq!(failures.len(), 1);
    }

    #[test]
    fn rejects_folder_size_at_or_below_minimum() {
        let src_dir = tempfile::tempdir().unwrap();
        let dest_dir = tempfile::tempdir().unwrap();
        let err = copy_folder_into_folders(&NoopTool, src_dir.path(), dest_dir.path(), "x", 0.25, ChecksumAlgorithm::Sha256, &CancellationFlag::new());
        assert!(err.is_err());
    }
}
