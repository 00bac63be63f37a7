//! Thin CLI entry point driving the library end to end from a JSON
//! manifest. The GUI this spec excludes would consume the same public API
//! (`ArchivePipeline`, `cut_engine::cut`, `video_copier`) through a
//! different front door; this binary exists only so the crate has some
//! external surface to exercise manually and in integration tests.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use dvdarchiver::archive_pipeline::{BuildRequest, PreservationCodec};
use dvdarchiver::config::Config;
use dvdarchiver::cut_engine::{cut, CutDef};
use dvdarchiver::domain::{MenuLayout, Rational};
use dvdarchiver::media_tool::FfmpegMediaTool;
use dvdarchiver::video_copier::verify_files_integrity;
use dvdarchiver::{ArchivePipeline, CancellationFlag, MediaTool, Notification, NotificationSink, TaskDispatcher};

#[derive(Parser)]
#[command(name = "dvdarchiver", about = "DVD/video archival pipeline driver")]
struct Cli {
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Validates a build manifest and prints the resulting folder plan
    /// without copying or transcoding anything.
    Plan {
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Runs the full archive pipeline (stream + preservation transcode +
    /// disk-bounded archive copy) for a manifest and blocks until it
    /// terminates.
    Build {
        #[arg(long)]
        manifest: PathBuf,
    },
    /// Cuts a single file to the given frame range using the frame-accurate
    /// cut engine.
    Cut {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long)]
        start_frame: u64,
        #[arg(long)]
        end_frame: u64,
        #[arg(long, value_name = "NUM/DEN", default_value = "25/1")]
        frame_rate: String,
    },
    /// Checks every file under a folder against its checksum sidecar.
    Verify {
        #[arg(long)]
        folder: PathBuf,
    },
}

/// The on-disk shape of `--manifest`; a convenience wrapper around
/// `BuildRequest` since clap subcommands read plain flags, not nested
/// structs.
#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    dvd_name: String,
    dvd_source_folder: PathBuf,
    iso_source_folder: PathBuf,
    archive_root: PathBuf,
    streaming_root: PathBuf,
    menu_layout: MenuLayout,
    #[serde(default)]
    overwrite_existing: bool,
    #[serde(default = "default_codec")]
    preservation_codec: String,
    #[serde(default)]
    is_blu_ray: bool,
}

fn default_codec() -> String {
    "copy".to_string()
}

fn parse_codec(raw: &str) -> Result<PreservationCodec> {
    Ok(match raw {
        "none" => PreservationCodec::None,
        "copy" => PreservationCodec::Copy,
        "ffv1" => PreservationCodec::Ffv1,
        "h264_10bit_all_i" => PreservationCodec::H264TenBitAllI,
        "h265_10bit_all_i" => PreservationCodec::H265TenBitAllI,
        other => anyhow::bail!("unknown preservation_codec '{other}'"),
    })
}

fn load_manifest(path: &PathBuf) -> Result<BuildRequest> {
    let bytes = std::fs::read(path).with_context(|| format!("reading manifest {}", path.display()))?;
    let manifest: Manifest = serde_json::from_slice(&bytes).with_context(|| format!("parsing manifest {}", path.display()))?;
    Ok(BuildRequest {
        dvd_name: manifest.dvd_name,
        dvd_source_folder: manifest.dvd_source_folder,
        iso_source_folder: manifest.iso_source_folder,
        archive_root: manifest.archive_root,
        streaming_root: manifest.streaming_root,
        menu_layout: manifest.menu_layout,
        overwrite_existing: manifest.overwrite_existing,
        preservation_codec: parse_codec(&manifest.preservation_codec)?,
        is_blu_ray: manifest.is_blu_ray,
    })
}

fn parse_rational(raw: &str) -> Result<Rational> {
    match raw.split_once('/') {
        Some((num, den)) => Ok(Rational::new(num.parse()?, den.parse()?)),
        None => Ok(Rational::new(raw.parse()?, 1)),
    }
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => Config::load(path).with_context(|| format!("loading config {}", path.display())),
        None => Ok(Config::default()),
    }
}

fn main() -> Result<()> {
    dvdarchiver::init_tracing();
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Command::Plan { manifest } => {
            let request = load_manifest(&manifest)?;
            let plan = dvdarchiver::archive_pipeline::plan(&request)?;
            println!("{}", serde_json::to_string_pretty(&plan_summary(&plan))?);
        }
        Command::Build { manifest } => {
            let request = load_manifest(&manifest)?;
            let dispatcher = Arc::new(TaskDispatcher::new(config.worker_threads));
            let tool: Arc<dyn MediaTool> = Arc::new(FfmpegMediaTool::default());
            let sink = Arc::new(NotificationSink::new());
            sink.register(|notification: Notification| {
                println!("[{:?}] {}", notification.kind, notification.message);
            });

            let pipeline = ArchivePipeline::new(
                dispatcher.clone(),
                tool,
                sink,
                config.default_folder_size_gb_dvd,
                config.default_folder_size_gb_bd,
                config.checksum_algorithm,
            );
            pipeline.build(request)?;
            dispatcher.wait_for_finished();
        }
        Command::Cut { input, output, start_frame, end_frame, frame_rate } => {
            let frame_rate = parse_rational(&frame_rate)?;
            let tool = FfmpegMediaTool::default();
            let def = CutDef { input_path: input, output_path: output, start_frame, end_frame, frame_rate, tag: None };
            cut(&tool, &def, config.cut_snap_offset_frames, &CancellationFlag::new())?;
        }
        Command::Verify { folder } => {
            let failures = verify_files_integrity(&folder, config.checksum_algorithm)?;
            if failures.is_empty() {
                println!("all files verified");
            } else {
                for path in &failures {
                    println!("FAILED: {}", path.display());
                }
                anyhow::bail!("{} file(s) failed verification", failures.len());
            }
        }
    }

    Ok(())
}

/// A plain, serializable projection of `BuildPlan` for `plan`'s stdout
/// output (the real struct carries `PathBuf`s that round-trip fine through
/// serde already, but this keeps the CLI's printed shape decoupled from the
/// library type).
#[derive(serde::Serialize)]
struct PlanSummary {
    project_archive_dir: String,
    project_streaming_dir: String,
    menu_count: usize,
}

fn plan_summary(plan: &dvdarchiver::BuildPlan) -> PlanSummary {
    PlanSummary {
        project_archive_dir: plan.project_archive_dir.display().to_string(),
        project_streaming_dir: plan.project_streaming_dir.display().to_string(),
        menu_count: plan.menus.len(),
    }
}
