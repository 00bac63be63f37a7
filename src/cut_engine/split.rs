//! `split_large(source, out_dir, chunk_gb)` (§4.3 secondary operation).
//!
//! Grounded in `original_source/dvdarch_utils.py::Split_Large_Video`: the
//! chunk count is the file-size-to-target-size ratio rounded up, then
//! incremented and retried until the *last* chunk's duration is at least
//! 180s, because a too-short final chunk is worse than slightly
//! over-splitting.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::ArchiverResult;
use crate::foundation::CancellationFlag;
use crate::media_tool::MediaTool;

use super::cut::{cut, CutDef};

const MIN_LAST_CHUNK_DURATION_S: f64 = 180.0;
const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn split_large(
    tool: &dyn MediaTool,
    source: &Path,
    out_dir: &Path,
    chunk_gb: f64,
    snap_offset_frames: f64,
    cancel: &CancellationFlag,
) -> ArchiverResult<Vec<PathBuf>> {
    let encoding = tool.probe(source)?;
    let file_size = fs::metadata(source)?.len() as f64;
    let fr = encoding.frame_rate.as_f64();

    let mut num_chunks = (file_size / (chunk_gb * BYTES_PER_GIB)).ceil().max(1.0) as u64;
    loop {
        let chunk_duration = encoding.duration / num_chunks as f64;
        let last_chunk_duration = encoding.duration - chunk_duration * (num_chunks - 1) as f64;
        if last_chunk_duration >= MIN_LAST_CHUNK_DURATION_S || num_chunks >= encoding.frame_count.max(1) {
            break;
        }
        num_chunks += 1;
    }

    fs::create_dir_all(out_dir)?;
    let chunk_duration = encoding.duration / num_chunks as f64;
    let stem = source.file_stem().and_then(|s| s.to_str()).unwrap_or("chunk");
    let ext = source.extension().and_then(|s| s.to_str()).unwrap_or("mkv");

    let mut chunks = Vec::with_capacity(num_chunks as usize);
    for i in 0..num_chunks {
        let start_frame = ((i as f64) * chunk_duration * fr).round() as u64;
        let end_frame = if i + 1 == num_chunks {
            encoding.frame_count
        } else {
            (((i + 1) as f64) * chunk_duration * fr).round() as u64
        };
        let output_path = out_dir.join(format!("{stem}_part{:02}.{ext}", i + 1));
        let def = CutDef {
            input_path: source.to_path_buf(),
            output_path: output_path.clone(),
            start_frame,
            end_frame,
            frame_rate: encoding.frame_rate,
            tag: Some(format!("split_{i}")),
        };
        cut(tool, &def, snap_offset_frames, cancel)?;
        chunks.push(output_path);
    }

    Ok(chunks)
}
