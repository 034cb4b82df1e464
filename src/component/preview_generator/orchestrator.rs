//! End-to-end preview generation for one video.
//!
//! Stages:
//! 1. Skip if the preview already exists
//! 2. Create a scratch workspace next to the output
//! 3. Read the duration
//! 4. Plan the cuts
//! 5. Transcode every cut into an animation
//! 6. Concatenate the animations and move the result into place

use super::animation_combiner::{AnimationCombiner, MagickCombiner};
use super::clip_transcoder::{ClipTask, ClipTranscoder, FfmpegClipTranscoder, create_clip_tasks};
use super::cut_planner::plan_cuts;
use super::duration_prober::{DurationProber, FfprobeDurationProber};
use super::error::{PipelineError, TranscodeError};
use crate::config::PreviewSettings;
use crate::tools::Workspace;
use log::{debug, error, info, warn};
use rayon::prelude::*;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Successful result of [`PreviewOrchestrator::generate_preview`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewOutcome {
    Generated { cuts: usize },
    /// The output was already present. Either nothing ran, or another
    /// writer published it first and this run's result was discarded.
    AlreadyExists,
}

pub struct PreviewOrchestrator {
    settings: PreviewSettings,
    prober: Box<dyn DurationProber>,
    transcoder: Box<dyn ClipTranscoder>,
    combiner: Box<dyn AnimationCombiner>,
    shutdown_signal: Arc<AtomicBool>,
}

impl PreviewOrchestrator {
    pub fn new(
        settings: PreviewSettings,
        prober: Box<dyn DurationProber>,
        transcoder: Box<dyn ClipTranscoder>,
        combiner: Box<dyn AnimationCombiner>,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        Self {
            settings,
            prober,
            transcoder,
            combiner,
            shutdown_signal,
        }
    }

    /// Orchestrator backed by ffprobe, ffmpeg and ImageMagick.
    #[must_use]
    pub fn with_external_tools(
        settings: PreviewSettings,
        shutdown_signal: Arc<AtomicBool>,
    ) -> Self {
        let prober = FfprobeDurationProber::new(&settings, Arc::clone(&shutdown_signal));
        let transcoder = FfmpegClipTranscoder::new(&settings, Arc::clone(&shutdown_signal));
        let combiner = MagickCombiner::new(&settings, Arc::clone(&shutdown_signal));
        Self::new(
            settings,
            Box::new(prober),
            Box::new(transcoder),
            Box::new(combiner),
            shutdown_signal,
        )
    }

    #[must_use]
    pub const fn settings(&self) -> &PreviewSettings {
        &self.settings
    }

    /// Build the preview of `input` at `output`.
    ///
    /// An existing `output` is never touched. On failure nothing is left at
    /// `output` and the workspace is gone.
    pub fn generate_preview(
        &self,
        input: &Path,
        output: &Path,
    ) -> Result<PreviewOutcome, PipelineError> {
        if fs::metadata(output).is_ok() {
            info!(
                "Preview already exists for {}: {}",
                input.display(),
                output.display()
            );
            return Ok(PreviewOutcome::AlreadyExists);
        }

        info!(
            "Generating preview for {} -> {}",
            input.display(),
            output.display()
        );

        let parent = output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let workspace = Workspace::create(input, parent).map_err(|source| {
            PipelineError::Workspace {
                path: parent.to_path_buf(),
                source,
            }
        })?;

        let result = self.run_stages(input, output, &workspace);
        drop(workspace);

        match result {
            Ok(outcome @ PreviewOutcome::Generated { cuts }) => {
                info!("Generated preview for {} ({cuts} cuts)", input.display());
                Ok(outcome)
            }
            Ok(PreviewOutcome::AlreadyExists) => {
                warn!(
                    "{} appeared while generating; kept it and discarded this run",
                    output.display()
                );
                Ok(PreviewOutcome::AlreadyExists)
            }
            Err(e) => {
                error!("Preview generation failed [{}]: {e}", e.stage());
                Err(e)
            }
        }
    }

    fn run_stages(
        &self,
        input: &Path,
        output: &Path,
        workspace: &Workspace,
    ) -> Result<PreviewOutcome, PipelineError> {
        self.ensure_running(input)?;

        let duration = self
            .prober
            .probe(input)
            .map_err(|e| self.cancelled_or(input, e.into()))?;

        let starts = plan_cuts(duration, self.settings.cut_length, self.settings.max_cuts);
        if starts.is_empty() {
            return Err(PipelineError::EmptyPlan {
                input: input.to_path_buf(),
                duration,
            });
        }
        debug!(
            "Planned {} cuts over {duration:.3}s for {}: {starts:?}",
            starts.len(),
            input.display()
        );

        let tasks = create_clip_tasks(input, &starts, self.settings.cut_length, workspace.path());
        self.transcode_all(input, &tasks)?;
        self.ensure_running(input)?;

        let clips: Vec<PathBuf> = tasks.into_iter().map(|t| t.output_path).collect();
        let staged = workspace.file(&staged_file_name(output));
        self.combiner.combine(&clips, &staged).map_err(|source| {
            self.cancelled_or(
                input,
                PipelineError::Combine {
                    input: input.to_path_buf(),
                    source,
                },
            )
        })?;

        let published = publish(&staged, output).map_err(|source| PipelineError::Persist {
            output: output.to_path_buf(),
            source,
        })?;

        if published {
            Ok(PreviewOutcome::Generated { cuts: clips.len() })
        } else {
            Ok(PreviewOutcome::AlreadyExists)
        }
    }

    fn transcode_all(&self, input: &Path, tasks: &[ClipTask]) -> Result<(), PipelineError> {
        let workers = self.settings.workers.max(1).min(tasks.len());
        if workers > 1 {
            match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                Ok(pool) => return pool.install(|| self.transcode_concurrently(input, tasks)),
                Err(e) => warn!(
                    "Cannot start {workers} transcode workers, running sequentially: {e}"
                ),
            }
        }

        for task in tasks {
            self.ensure_running(input)?;
            self.transcoder
                .transcode(task)
                .map_err(|e| self.cancelled_or(input, e.into()))?;
        }
        Ok(())
    }

    /// Runs inside a bounded pool. After the first failure no new cut starts;
    /// cuts already running finish, and the failure with the lowest cut index
    /// is reported.
    fn transcode_concurrently(
        &self,
        input: &Path,
        tasks: &[ClipTask],
    ) -> Result<(), PipelineError> {
        let abort = AtomicBool::new(false);

        let results: Vec<Option<Result<(), TranscodeError>>> = tasks
            .par_iter()
            .map(|task| {
                if abort.load(Ordering::SeqCst) || self.shutdown_signal.load(Ordering::SeqCst) {
                    return None;
                }
                let result = self.transcoder.transcode(task);
                if result.is_err() {
                    abort.store(true, Ordering::SeqCst);
                }
                Some(result)
            })
            .collect();

        let mut skipped = false;
        for result in results {
            match result {
                Some(Ok(())) => {}
                Some(Err(e)) => return Err(self.cancelled_or(input, e.into())),
                None => skipped = true,
            }
        }

        if skipped {
            return Err(PipelineError::Cancelled {
                input: input.to_path_buf(),
            });
        }
        Ok(())
    }

    fn ensure_running(&self, input: &Path) -> Result<(), PipelineError> {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            warn!(
                "Shutdown requested, abandoning preview for {}",
                input.display()
            );
            return Err(PipelineError::Cancelled {
                input: input.to_path_buf(),
            });
        }
        Ok(())
    }

    /// A step that failed because Ctrl-C killed its tool is a cancellation,
    /// not a tool error.
    fn cancelled_or(&self, input: &Path, err: PipelineError) -> PipelineError {
        if self.shutdown_signal.load(Ordering::SeqCst) {
            PipelineError::Cancelled {
                input: input.to_path_buf(),
            }
        } else {
            err
        }
    }
}

/// Put `staged` at `output` without ever replacing a file already there.
///
/// Returns `false` when `output` exists. A hard link publishes the complete
/// file in one step; filesystems without hard links get an exclusive-create copy.
fn publish(staged: &Path, output: &Path) -> io::Result<bool> {
    match fs::hard_link(staged, output) {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(false),
        Err(e) => {
            debug!("Cannot link {}: {e}; copying instead", output.display());
            copy_exclusive(staged, output)
        }
    }
}

fn copy_exclusive(staged: &Path, output: &Path) -> io::Result<bool> {
    let mut source = File::open(staged)?;
    let mut target = match OpenOptions::new().write(true).create_new(true).open(output) {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => return Ok(false),
        Err(e) => return Err(e),
    };

    if let Err(e) = io::copy(&mut source, &mut target).and_then(|_| target.sync_all()) {
        drop(target);
        if let Err(remove) = fs::remove_file(output) {
            warn!(
                "Cannot remove partial preview {}: {remove}",
                output.display()
            );
        }
        return Err(e);
    }
    Ok(true)
}

/// Name of the combined file inside the workspace; keeps the output's
/// extension so the combiner picks the same format.
fn staged_file_name(output: &Path) -> String {
    let extension = output
        .extension()
        .map_or_else(|| "gif".to_string(), |e| e.to_string_lossy().to_string());
    format!("combined.{extension}")
}
