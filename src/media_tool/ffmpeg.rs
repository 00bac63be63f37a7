//! Production `MediaTool` backed by real `ffmpeg`/`ffprobe`/`mkisofs`
//! binaries, invoked through the cooperative runner (§6.3 external process
//! protocol). Argument building follows
//! `ffui_core::engine::ffmpeg_args::builder` in spirit: explicit argument
//! vectors, no shell parsing, codec/container choices threaded straight
//! through from `EncodingInfo`/`H26xOptions` rather than templated strings.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::{debug, warn};

use crate::domain::EncodingInfo;
use crate::error::{ArchiverError, ArchiverResult};
use crate::foundation::{run_cooperative, CancellationFlag, RunOutcome};

use super::probe::parse_probe_json;
use super::frames::{parse_frames_json, FrameInfo};
use super::{Container, H26xOptions, MediaTool, MezzanineOptions};

pub struct FfmpegMediaTool {
    pub ffmpeg_path: PathBuf,
    pub ffprobe_path: PathBuf,
    pub mkisofs_path: PathBuf,
}

impl Default for FfmpegMediaTool {
    fn default() -> Self {
        Self {
            ffmpeg_path: PathBuf::from("ffmpeg"),
            ffprobe_path: PathBuf::from("ffprobe"),
            mkisofs_path: PathBuf::from("mkisofs"),
        }
    }
}

impl FfmpegMediaTool {
    pub fn new(ffmpeg_path: PathBuf, ffprobe_path: PathBuf, mkisofs_path: PathBuf) -> Self {
        Self { ffmpeg_path, ffprobe_path, mkisofs_path }
    }

    fn run(&self, cmd: Command, cancel: &CancellationFlag) -> ArchiverResult<String> {
        let program = cmd.get_program().to_string_lossy().into_owned();
        debug!(program = %program, "running external media tool");
        let outcome = run_cooperative(cmd, cancel)?;
        match outcome {
            RunOutcome::Success(stdout) => Ok(stdout),
            RunOutcome::Failed(message) => {
                warn!(program = %program, %message, "external tool failed");
                Err(ArchiverError::ToolFailure { exit_code: -1, message })
            }
            RunOutcome::Cancelled(_) => Err(ArchiverError::Cancelled),
        }
    }
}

impl MediaTool for FfmpegMediaTool {
    fn probe(&self, path: &Path) -> ArchiverResult<EncodingInfo> {
        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args(["-v", "error", "-show_format", "-show_streams", "-of", "json"]).arg(path);
        let stdout = self.run(cmd, &CancellationFlag::new())?;
        parse_probe_json(&stdout)
    }

    fn probe_frames(&self, path: &Path, t_start: f64, window_s: f64) -> ArchiverResult<Vec<FrameInfo>> {
        let interval = format!("{t_start}%+{window_s}");
        let mut cmd = Command::new(&self.ffprobe_path);
        cmd.args(["-v", "error", "-select_streams", "v:0", "-read_intervals", &interval])
            .args(["-show_entries", "frame=pict_type,key_frame,pts,pts_time,pkt_pos,interlaced_frame,top_field_first"])
            .args(["-of", "json"])
            .arg(path);
        let stdout = self.run(cmd, &CancellationFlag::new())?;
        parse_frames_json(&stdout)
    }

    fn cut_stream_copy(&self, input: &Path, output: &Path, t_start: f64, t_end: f64, cancel: &CancellationFlag) -> ArchiverResult<()> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-y", "-ss", &t_start.to_string(), "-to", &t_end.to_string(), "-i"])
            .arg(input)
            .args(["-c", "copy"])
            .arg(output);
        self.run(cmd, cancel).map(|_| ())
    }

    fn reencode_segment(
        &self,
        input: &Path,
        output: &Path,
        encoding: &EncodingInfo,
        t_start: f64,
        t_end: f64,
        gop_size: u32,
        cancel: &CancellationFlag,
    ) -> ArchiverResult<()> {
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-y", "-ss", &t_start.to_string(), "-to", &t_end.to_string(), "-i"])
            .arg(input)
            .args(["-c:v", &encoding.codec])
            .args(["-pix_fmt", &encoding.pixel_format])
            .args(["-g", &gop_size.to_string(), "-keyint_min", &gop_size.to_string()])
            .args(["-b:v", &encoding.bitrate.to_string()])
            .args(["-s", &format!("{}x{}", encoding.width, encoding.height)])
            .args(["-c:a", "copy"])
            .arg(output);
        self.run(cmd, cancel).map(|_| ())
    }

    fn transcode_h26x(&self, input: &Path, out_dir: &Path, options: &H26xOptions, cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
        let codec = if options.h265 { "libx265" } else { "libx264" };
        let ext = match options.container {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
        };
        let output = out_dir.join(format!("output.{ext}"));

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-y", "-i"]).arg(input).args(["-c:v", codec]);
        if options.iframe_only {
            cmd.args(["-g", "1", "-keyint_min", "1"]);
        }
        if options.ten_bit {
            cmd.args(["-pix_fmt", "yuv420p10le"]);
        }
        cmd.args(["-crf", if options.high_quality { "16" } else { "23" }]);
        cmd.args(["-c:a", "aac"]).arg(&output);

        self.run(cmd, cancel).map(|_| output)
    }

    fn transcode_ffv1(&self, input: &Path, out_dir: &Path, cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
        let output = out_dir.join("output.mkv");
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-y", "-i"])
            .arg(input)
            .args(["-c:v", "ffv1", "-level", "3", "-g", "1"])
            .args(["-c:a", "flac"])
            .arg(&output);
        self.run(cmd, cancel).map(|_| output)
    }

    fn transcode_dv(&self, input: &Path, out_dir: &Path, frame_rate: crate::domain::Rational, width: u32, height: u32, cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
        let output = out_dir.join("output.dv");
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-y", "-i"])
            .arg(input)
            .args(["-c:v", "dvvideo"])
            .args(["-r", &frame_rate.to_string()])
            .args(["-s", &format!("{width}x{height}")])
            .args(["-c:a", "pcm_s16le"])
            .arg(&output);
        self.run(cmd, cancel).map(|_| output)
    }

    fn transcode_mezzanine(&self, input: &Path, out_dir: &Path, options: &MezzanineOptions, cancel: &CancellationFlag) -> ArchiverResult<PathBuf> {
        let ext = match options.container {
            Container::Mp4 => "mp4",
            Container::Mkv => "mkv",
        };
        let output = out_dir.join(format!("mezzanine.{ext}"));
        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-y", "-i"]).arg(input).args(["-c:v", &options.codec]).arg(&output);
        self.run(cmd, cancel).map(|_| output)
    }

    fn concatenate(&self, files: &[PathBuf], output: &Path, transcode_format: Option<&str>, delete_temps: bool, cancel: &CancellationFlag) -> ArchiverResult<()> {
        let list_path = output.with_extension("concat.txt");
        let list_body: String = files
            .iter()
            .map(|f| format!("file '{}'\n", f.display()))
            .collect();
        std::fs::write(&list_path, list_body)?;

        let mut cmd = Command::new(&self.ffmpeg_path);
        cmd.args(["-y", "-f", "concat", "-safe", "0", "-i"]).arg(&list_path);
        match transcode_format {
            Some(format) => {
                cmd.args(["-c:v", format]);
            }
            None => {
                cmd.args(["-c", "copy"]);
            }
        }
        cmd.arg(output);

        let result = self.run(cmd, cancel).map(|_| ());

        let _ = std::fs::remove_file(&list_path);
        if delete_temps {
            for file in files {
                let _ = std::fs::remove_file(file);
            }
        }
        result
    }

    fn make_iso(&self, in_dir: &Path, out_iso: &Path, cancel: &CancellationFlag) -> ArchiverResult<()> {
        let mut cmd = Command::new(&self.mkisofs_path);
        cmd.args(["-dvd-video", "-o"]).arg(out_iso).arg(in_dir);
        self.run(cmd, cancel).map(|_| ())
    }
}
