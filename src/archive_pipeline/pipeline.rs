//! `ArchivePipeline`: submits the per-button stream/transcode/archive task
//! graph, gates each menu's archive task behind its transcode group, and
//! fires one aggregated completion notification.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use crate::config::ChecksumAlgorithm;
use crate::dispatcher::{DispatchEvent, DispatchMethod, TaskDispatcher};
use crate::domain::VideoRef;
use crate::error::{ArchiverError, ArchiverResult};
use crate::foundation::{EventKind, TaskDef};
use crate::media_tool::{Container, H26xOptions, MediaTool};
use crate::notify::NotificationSink;
use crate::sync_ext::MutexExt;
use crate::video_copier::copy_folder_into_folders;
use crate::worker_pool::{WorkerHandle, WorkerOutcome};

use super::completion::PipelineState;
use super::naming::button_file_stem;
use super::plan::{plan, BuildPlan, BuildRequest, PreservationCodec};

struct MenuGate {
    archive_submitted: Mutex<bool>,
}

#[derive(Clone)]
struct ArchiveTaskCtx {
    dvd_name: String,
    menu_index: usize,
    menu_dir_name: String,
    temp_dir: PathBuf,
    final_dir: PathBuf,
    folder_size_gb: f64,
    hash_algorithm: ChecksumAlgorithm,
    state: Arc<PipelineState>,
}

#[derive(Clone)]
pub struct ArchivePipeline {
    dispatcher: Arc<TaskDispatcher>,
    tool: Arc<dyn MediaTool>,
    sink: Arc<NotificationSink>,
    folder_size_gb_dvd: f64,
    folder_size_gb_bd: f64,
    hash_algorithm: ChecksumAlgorithm,
}

impl ArchivePipeline {
    pub fn new(
        dispatcher: Arc<TaskDispatcher>,
        tool: Arc<dyn MediaTool>,
        sink: Arc<NotificationSink>,
        folder_size_gb_dvd: f64,
        folder_size_gb_bd: f64,
        hash_algorithm: ChecksumAlgorithm,
    ) -> Self {
        Self { dispatcher, tool, sink, folder_size_gb_dvd, folder_size_gb_bd, hash_algorithm }
    }

    /// Plans the build then submits every button's task graph. Returns the
    /// plan immediately; completion is reported asynchronously through the
    /// notification sink.
    pub fn build(&self, request: BuildRequest) -> ArchiverResult<BuildPlan> {
        let build_plan = plan(&request)?;
        let state = Arc::new(PipelineState::new());
        let dvd_name = request.dvd_name.clone();
        let folder_size_gb = if request.is_blu_ray { self.folder_size_gb_bd } else { self.folder_size_gb_dvd };

        for menu_plan in &build_plan.menus {
            let page = &request.menu_layout.pages[menu_plan.index];
            let gate = Arc::new(MenuGate { archive_submitted: Mutex::new(false) });

            for (button_index, video) in page.videos.iter().enumerate() {
                let button_stem = button_file_stem(button_index, &video.settings.button_title);

                self.submit_stream_task(&dvd_name, menu_plan.index, button_index, video, &menu_plan.streaming_dir, &button_stem, &state);

                let ctx = ArchiveTaskCtx {
                    dvd_name: dvd_name.clone(),
                    menu_index: menu_plan.index,
                    menu_dir_name: menu_plan.dir_name.clone(),
                    temp_dir: menu_plan.temp_dir.clone(),
                    final_dir: menu_plan.final_dir.clone(),
                    folder_size_gb,
                    hash_algorithm: self.hash_algorithm,
                    state: state.clone(),
                };

                self.submit_transcode_task(button_index, video, &button_stem, request.preservation_codec, ctx, gate.clone());
            }
        }

        Ok(build_plan)
    }

    fn submit_stream_task(
        &self,
        dvd_name: &str,
        menu_index: usize,
        button_index: usize,
        video: &VideoRef,
        streaming_dir: &std::path::Path,
        button_stem: &str,
        state: &Arc<PipelineState>,
    ) {
        let prefix = format!("AM_{dvd_name}_ST_{menu_index:03}_");
        let task_id = format!("{prefix}{button_index:03}");
        let task = TaskDef::new(task_id, prefix);

        let tool = self.tool.clone();
        let source = video.path.clone();
        let already_h264 = video.encoding.codec.eq_ignore_ascii_case("h264");
        let output = streaming_dir.join(format!("{button_stem}.mp4"));
        let out_dir = streaming_dir.to_path_buf();

        let dispatch_methods = vec![
            self.bookkeeping_method("am_stream_error", EventKind::Error, state.clone(), dvd_name.to_string()),
            self.bookkeeping_method("am_stream_abort", EventKind::Abort, state.clone(), dvd_name.to_string()),
            self.bookkeeping_method("am_stream_finish", EventKind::Finish, state.clone(), dvd_name.to_string()),
        ];

        let outcome = self.dispatcher.submit(
            task,
            dispatch_methods,
            run_as_task(move |handle: &WorkerHandle| {
                if already_h264 {
                    std::fs::copy(&source, &output)?;
                    Ok(format!("stream-copied {}", output.display()))
                } else {
                    let options = H26xOptions { h265: false, high_quality: true, iframe_only: false, ten_bit: false, container: Container::Mp4 };
                    let produced = tool.transcode_h26x(&source, &out_dir, &options, handle.cancel_flag())?;
                    rename_if_needed(&produced, &output)?;
                    Ok(format!("transcoded {}", output.display()))
                }
            }),
        );
        if let Err(err) = outcome {
            state.record_error(err.to_string());
        }
    }

    fn submit_transcode_task(
        &self,
        button_index: usize,
        video: &VideoRef,
        button_stem: &str,
        codec: PreservationCodec,
        ctx: ArchiveTaskCtx,
        gate: Arc<MenuGate>,
    ) {
        let prefix = format!("AM_{}_TR_{:03}_", ctx.dvd_name, ctx.menu_index);
        let task_id = format!("{prefix}{button_index:03}");
        let task = TaskDef::new(task_id, prefix);

        let tool = self.tool.clone();
        let source = video.path.clone();
        let temp_dir = ctx.temp_dir.clone();
        let output_ext = match codec {
            PreservationCodec::Ffv1 | PreservationCodec::H264TenBitAllI | PreservationCodec::H265TenBitAllI => "mkv".to_string(),
            PreservationCodec::None | PreservationCodec::Copy => source.extension().and_then(|e| e.to_str()).unwrap_or("mkv").to_string(),
        };
        let output = temp_dir.join(format!("{button_stem}.{output_ext}"));

        let dispatch_methods = vec![
            self.bookkeeping_method("am_transcode_error", EventKind::Error, ctx.state.clone(), ctx.dvd_name.clone()),
            self.bookkeeping_method("am_transcode_abort", EventKind::Abort, ctx.state.clone(), ctx.dvd_name.clone()),
            self.archive_gate_method(ctx.clone(), gate),
        ];

        let outcome = self.dispatcher.submit(
            task,
            dispatch_methods,
            run_as_task(move |handle: &WorkerHandle| {
                match codec {
                    PreservationCodec::None | PreservationCodec::Copy => {
                        std::fs::copy(&source, &output)?;
                    }
                    PreservationCodec::Ffv1 => {
                        let produced = tool.transcode_ffv1(&source, &temp_dir, handle.cancel_flag())?;
                        rename_if_needed(&produced, &output)?;
                    }
                    PreservationCodec::H264TenBitAllI | PreservationCodec::H265TenBitAllI => {
                        let options = H26xOptions {
                            h265: matches!(codec, PreservationCodec::H265TenBitAllI),
                            high_quality: true,
                            iframe_only: true,
                            ten_bit: true,
                            container: Container::Mkv,
                        };
                        let produced = tool.transcode_h26x(&source, &temp_dir, &options, handle.cancel_flag())?;
                        rename_if_needed(&produced, &output)?;
                    }
                }
                Ok(format!("preserved {}", output.display()))
            }),
        );
        if let Err(err) = outcome {
            ctx.state.record_error(err.to_string());
        }
    }

    fn submit_archive_task(&self, ctx: ArchiveTaskCtx) {
        let prefix = format!("AM_{}_AR_{:03}_", ctx.dvd_name, ctx.menu_index);
        let task_id = format!("{prefix}0");
        let task = TaskDef::new(task_id, prefix);

        let tool = self.tool.clone();
        let temp_dir = ctx.temp_dir.clone();
        let final_dir = ctx.final_dir.clone();
        let menu_dir_name = ctx.menu_dir_name.clone();
        let folder_size_gb = ctx.folder_size_gb;
        let hash_algorithm = ctx.hash_algorithm;

        let dispatch_methods = vec![
            self.bookkeeping_method("am_archive_error", EventKind::Error, ctx.state.clone(), ctx.dvd_name.clone()),
            self.bookkeeping_method("am_archive_abort", EventKind::Abort, ctx.state.clone(), ctx.dvd_name.clone()),
            self.bookkeeping_method("am_archive_finish", EventKind::Finish, ctx.state.clone(), ctx.dvd_name.clone()),
        ];

        let outcome = self.dispatcher.submit(
            task,
            dispatch_methods,
            run_as_task(move |handle: &WorkerHandle| {
                let report = copy_folder_into_folders(tool.as_ref(), &temp_dir, &final_dir, &menu_dir_name, folder_size_gb, hash_algorithm, handle.cancel_flag())?;
                Ok(format!("archived {} file(s) across {} disk folder(s)", report.files_copied, report.disks_written))
            }),
        );
        if let Err(err) = outcome {
            ctx.state.record_error(err.to_string());
        }
    }

    /// Records `Error`/`Abort` messages into the pipeline error list (a
    /// `Finish` registration is a no-op bookkeeping-wise) and rechecks
    /// whether the whole `AM_<dvd_name>_` group has terminated.
    fn bookkeeping_method(&self, dispatch_name: &str, event: EventKind, state: Arc<PipelineState>, dvd_name: String) -> DispatchMethod {
        let pipeline = self.clone();
        DispatchMethod::new(dispatch_name, "pipeline_bookkeeping", event, move |dispatch_event: DispatchEvent| {
            if let DispatchEvent::Error { message, .. } | DispatchEvent::Abort { message, .. } = &dispatch_event {
                state.record_error(message.clone());
            }
            pipeline.check_overall_completion(&dvd_name, &state);
        })
    }

    /// The scheduling rule from §4.5: on a transcode task's successful
    /// finish, check whether every transcode under the same menu has now
    /// finished successfully; if so, submit the archive task exactly once.
    fn archive_gate_method(&self, ctx: ArchiveTaskCtx, gate: Arc<MenuGate>) -> DispatchMethod {
        let pipeline = self.clone();
        let menu_transcode_prefix = format!("AM_{}_TR_{:03}_", ctx.dvd_name, ctx.menu_index);
        let dvd_name = ctx.dvd_name.clone();
        let state = ctx.state.clone();
        DispatchMethod::new("am_archive_gate", "archive_gate", EventKind::Finish, move |_event: DispatchEvent| {
            if pipeline.dispatcher.group_status(&menu_transcode_prefix).is_complete() {
                let mut submitted = gate.archive_submitted.lock_unpoisoned();
                if !*submitted {
                    *submitted = true;
                    drop(submitted);
                    pipeline.submit_archive_task(ctx.clone());
                }
            }
            pipeline.check_overall_completion(&dvd_name, &state);
        })
    }

    fn check_overall_completion(&self, dvd_name: &str, state: &Arc<PipelineState>) {
        let prefix = format!("AM_{dvd_name}_");
        if self.dispatcher.group_status(&prefix).is_terminated() {
            state.notify_once_complete(&self.sink, dvd_name);
        }
    }
}

fn rename_if_needed(produced: &std::path::Path, target: &std::path::Path) -> ArchiverResult<()> {
    if produced != target {
        std::fs::rename(produced, target)?;
    }
    Ok(())
}

fn run_as_task<F>(f: F) -> impl FnOnce(WorkerHandle) -> WorkerOutcome + Send + 'static
where
    F: FnOnce(&WorkerHandle) -> ArchiverResult<String> + Send + 'static,
{
    move |handle: WorkerHandle| {
        if handle.is_cancelled() {
            return WorkerOutcome::Aborted("cancelled before start".to_string());
        }
        match f(&handle) {
            Ok(result) => WorkerOutcome::Finished(result),
            Err(ArchiverError::Cancelled) => WorkerOutcome::Aborted("cancelled".to_string()),
            Err(err) => WorkerOutcome::Failed(err.to_string()),
        }
    }
}
