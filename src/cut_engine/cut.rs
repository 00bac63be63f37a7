//! `cut(CutDef)`: produce a cut whose first and last frames are exactly the
//! requested mark points, minimizing re-encoding (§4.3).

use std::path::PathBuf;

use tracing::{info, instrument};

use crate::error::{ArchiverError, ArchiverResult};
use crate::foundation::CancellationFlag;
use crate::media_tool::MediaTool;

use super::gop::{all_frames_are_i, locate_gop_boundaries};

#[derive(Debug, Clone)]
pub struct CutDef {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub start_frame: u64,
    pub end_frame: u64,
    pub frame_rate: crate::domain::Rational,
    pub tag: Option<String>,
}

#[instrument(skip(tool, cancel), fields(input = %def.input_path.display()))]
pub fn cut(tool: &dyn MediaTool, def: &CutDef, snap_offset_frames: f64, cancel: &CancellationFlag) -> ArchiverResult<()> {
    let encoding = tool.probe(&def.input_path)?;
    if !encoding.is_accepted_frame_rate() {
        return Err(ArchiverError::Preflight(format!(
            "frame rate {} is not an accepted video standard",
            encoding.frame_rate
        )));
    }

    let fr = def.frame_rate.as_f64();
    let frame_time = 1.0 / fr;
    let t_start = def.start_frame as f64 / fr;
    let t_end = def.end_frame as f64 / fr;
    let snap = snap_offset_frames * frame_time;

    let head = locate_gop_boundaries(tool, &def.input_path, t_start)?;
    let tail = locate_gop_boundaries(tool, &def.input_path, t_end)?;

    let scan_span = (tail.following_i_time - head.preceding_i_time).max(frame_time);
    let probed = tool.probe_frames(&def.input_path, head.preceding_i_time, scan_span)?;
    if all_frames_are_i(&probed) {
        info!("input is all-I; taking the stream-copy shortcut");
        tool.cut_stream_copy(&def.input_path, &def.output_path, t_start, t_end, cancel)?;
        return Ok(());
    }

    let temp_dir = std::env::temp_dir().join(format!(
        "dvdarchiver_cut_{}",
        def.tag.clone().unwrap_or_else(|| "segment".to_string())
    ));
    std::fs::create_dir_all(&temp_dir)?;

    let result = (|| -> ArchiverResult<()> {
        let mut segments: Vec<PathBuf> = Vec::new();

        if head.following_i_time > head.preceding_i_time {
            let head_path = temp_dir.join("head.mkv");
            tool.reencode_segment(&def.input_path, &head_path, &encoding, head.preceding_i_time, head.following_i_time, 1, cancel)?;
            segments.push(head_path);
        }

        let middle_start = (head.following_i_time - snap).max(0.0);
        let middle_end = (tail.preceding_i_time - snap).max(middle_start);
        if middle_end > middle_start {
            let middle_path = temp_dir.join("middle.mkv");
            tool.cut_stream_copy(&def.input_path, &middle_path, middle_start, middle_end, cancel)?;
            segments.push(middle_path);
        }

        if tail.following_i_time > tail.preceding_i_time {
            let tail_path = temp_dir.join("tail.mkv");
            tool.reencode_segment(&def.input_path, &tail_path, &encoding, tail.preceding_i_time, tail.following_i_time, 1, cancel)?;
            segments.push(tail_path);
        }

        let concat_path = temp_dir.join("concat.mkv");
        tool.concatenate(&segments, &concat_path, None, false, cancel)?;

        // §4.3 step 6: snap the final window to the head GOP's preceding
        // I-frame, offset by one frame time.
        let start_offset = (t_start - head.preceding_i_time) + frame_time;
        let window_end = start_offset + (t_end - t_start) + frame_time;
        tool.cut_stream_copy(&concat_path, &def.output_path, start_offset, window_end, cancel)
    })();

    match &result {
        Ok(()) => {
            if let Err(err) = std::fs::remove_dir_all(&temp_dir) {
                info!(error = %err, dir = %temp_dir.display(), "could not remove temp cut segments after success");
            }
        }
        Err(_) => {
            info!(dir = %temp_dir.display(), "cut failed; retaining temp segments for diagnostics");
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Mutex;

    use crate::domain::{EncodingInfo, Rational};
    use crate::media_tool::FrameInfo;

    use super::*;

    /// Scripted `MediaTool` double, standing in for real `ffmpeg`/`ffprobe`
    /// the way the teacher's mock-ffmpeg test harness does.
    struct MockTool {
        encoding: EncodingInfo,
        /// Answers every 5-second GOP-boundary probe from `locate_gop_boundaries`.
        frames: Vec<FrameInfo>,
        /// Answers the wider all-I shortcut probe spanning head-to-tail, which
        /// `locate_gop_boundaries` never requests at exactly 5 seconds.
        overview_frames: Vec<FrameInfo>,
        calls: Mutex<Vec<String>>,
    }

    fn i_frame(pts_time: f64) -> FrameInfo {
        FrameInfo {
            pict_type: "I".to_string(),
            key_frame: true,
            pts: (pts_time * 1000.0) as i64,
            pts_time,
            pkt_pos: (pts_time * 10_000.0) as i64,
            interlaced_frame: false,
            top_field_first: false,
        }
    }

    fn p_frame(pts_time: f64) -> FrameInfo {
        FrameInfo {
            pict_type: "P".to_string(),
            key_frame: false,
            pts: (pts_time * 1000.0) as i64,
            pts_time,
            pkt_pos: (pts_time * 10_000.0) as i64,
            interlaced_frame: false,
            top_field_first: false,
        }
    }

    impl MediaTool for MockTool {
        fn probe(&self, _path: &Path) -> ArchiverResult<EncodingInfo> {
            Ok(self.encoding.clone())
        }
        fn probe_frames(&self, _path: &Path, _t_start: f64, window_s: f64) -> ArchiverResult<Vec<FrameInfo>> {
            if window_s == 5.0 {
                Ok(self.frames.clone())
            } else {
                Ok(self.overview_frames.clone())
            }
        }
        fn cut_stream_copy(&self, _input: &Path, _output: &Path, _t_start: f64, _t_end: f64, _cancel: &CancellationFlag) -> ArchiverResult<()> {
            self.calls.lock().unwrap().push("cut_stream_copy".to_string());
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
            self.calls.lock().unwrap().push("reencode_segment".to_string());
            Ok(())
        }
        fn transcode_h26x(&self, _input: &Path, _out_dir: &Path, _options: &crate::media_tool::H26xOptions, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn transcode_ffv1(&self, _input: &Path, _out_dir: &Path, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn transcode_dv(&self, _input: &Path, _out_dir: &Path, _frame_rate: Rational, _width: u32, _height: u32, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn transcode_mezzanine(&self, _input: &Path, _out_dir: &Path, _options: &crate::media_tool::MezzanineOptions, _cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
            unimplemented!()
        }
        fn concatenate(&self, _files: &[PathBuf], _output: &Path, _transcode_format: Option<&str>, _delete_temps: bool, _cancel: &CancellationFlag) -> ArchiverResult<()> {
            self.calls.lock().unwrap().push("concatenate".to_string());
            Ok(())
        }
        fn make_iso(&self, _in_dir: &Path, _out_iso: &Path, _cancel: &CancellationFlag) -> ArchiverResult<()> {
            unimplemented!()
        }
    }

    fn pal_encoding(frame_count: u64) -> EncodingInfo {
        EncodingInfo {
            width: 720,
            height: 576,
            frame_rate: Rational::new(25, 1),
            frame_count,
            duration: frame_count as f64 / 25.0,
            codec: "h264".to_string(),
            pixel_format: "yuv420p".to_string(),
            scan_type: crate::domain::ScanType::Progressive,
            scan_order: None,
            standard: crate::domain::Standard::Pal,
            bitrate: 4_000_000,
            aspect_ratio: crate::domain::AspectRatio::FourThree,
            par: 1.0,
            dar: 4.0 / 3.0,
            audio_tracks: 1,
            audio_codec: Some("ac3".to_string()),
            audio_channels: Some(2),
            audio_sample_rate: Some(48_000),
            audio_bitrate: Some(192_000),
            error: String::new(),
            passthrough: Default::default(),
        }
    }

    #[test]
    fn all_i_input_takes_the_stream_copy_shortcut() {
        let tool = MockTool {
            encoding: pal_encoding(250),
            frames: vec![i_frame(0.0), i_frame(2.0), i_frame(4.0)],
            overview_frames: vec![i_frame(0.0), i_frame(2.0), i_frame(4.0)],
            calls: Mutex::new(Vec::new()),
        };
        let def = CutDef {
            input_path: PathBuf::from("in.dv"),
            output_path: PathBuf::from("out.dv"),
            start_frame: 50,
            end_frame: 150,
            frame_rate: Rational::new(25, 1),
            tag: None,
        };
        cut(&tool, &def, 2.0, &CancellationFlag::new()).unwrap();
        assert_eq!(*tool.calls.lock().unwrap(), vec!["cut_stream_copy".to_string()]);
    }

    #[test]
    fn hybrid_cut_reencodes_head_and_tail_and_concatenates() {
        let tool = MockTool {
            encoding: pal_encoding(250),
            frames: vec![i_frame(0.0), i_frame(0.6), i_frame(1.2), i_frame(4.0)],
            overview_frames: vec![i_frame(0.0), p_frame(0.04), i_frame(1.2), p_frame(3.0), i_frame(4.0)],
            calls: Mutex::new(Vec::new()),
        };
        let def = CutDef {
            input_path: PathBuf::from("in.mkv"),
            output_path: PathBuf::from("out.mkv"),
            start_frame: 20,
            end_frame: 100,
            frame_rate: Rational::new(25, 1),
            tag: Some("test".to_string()),
        };
        cut(&tool, &def, 2.0, &CancellationFlag::new()).unwrap();
        let calls = tool.calls.lock().unwrap();
        assert!(calls.contains(&"reencode_segment".to_string()));
        assert!(calls.contains(&"concatenate".to_string()));
    }

    #[test]
    fn unaccepted_frame_rate_is_rejected_before_any_tool_call() {
        let mut encoding = pal_encoding(240);
        encoding.frame_rate = Rational::new(24, 1);
        encoding.standard = crate::domain::Standard::Pal;
        let tool = MockTool { encoding, frames: vec![], overview_frames: vec![], calls: Mutex::new(Vec::new()) };
        let def = CutDef {
            input_path: PathBuf::from("in.mkv"),
            output_path: PathBuf::from("out.mkv"),
            start_frame: 0,
            end_frame: 100,
            frame_rate: Rational::new(24, 1),
            tag: None,
        };
        assert!(cut(&tool, &def, 2.0, &CancellationFlag::new()).is_err());
        assert!(tool.calls.lock().unwrap().is_empty());
    }
}
