use super::error::PipelineError;
use super::orchestrator::{PreviewOrchestrator, PreviewOutcome};
use crate::config::Config;
use crate::config::save::{remember_directories, save_settings};
use crate::tools::{
    VideoFileInfo, ensure_directory_exists, scan_video_files, validate_directory_exists,
    validate_file_exists,
};
use anyhow::{Context, Result};
use console::style;
use dialoguer::Input;
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use rust_i18n::t;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

const PREVIEW_EXTENSION: &str = "gif";
const PROGRESS_TEMPLATE: &str =
    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Tally of one batch run.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct GenerationResult {
    pub total_videos: usize,
    pub successful: usize,
    pub failed: usize,
    pub skipped: usize,
}

/// Interactive front end for the preview pipeline.
pub struct PreviewGenerator {
    config: Config,
    shutdown_signal: Arc<AtomicBool>,
}

impl PreviewGenerator {
    pub const fn new(config: Config, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            config,
            shutdown_signal,
        }
    }

    /// Hand back the config, including folders remembered by a batch run.
    #[must_use]
    pub fn into_config(self) -> Config {
        self.config
    }

    fn orchestrator(&self) -> PreviewOrchestrator {
        PreviewOrchestrator::with_external_tools(
            self.config.settings.preview.clone(),
            Arc::clone(&self.shutdown_signal),
        )
    }

    /// Prompt for one video and where to put its preview.
    pub fn run_single(&self) -> Result<()> {
        println!("{}", style(t!("preview.single_title")).cyan().bold());

        let input: String = Input::new()
            .with_prompt(t!("preview.prompt_video_file"))
            .interact_text()?;
        let input = PathBuf::from(input.trim());
        validate_file_exists(&input)?;

        let default_output = default_output_for(&input);
        let output: String = Input::new()
            .with_prompt(t!("preview.prompt_output_path"))
            .default(default_output.to_string_lossy().to_string())
            .interact_text()?;
        let output = PathBuf::from(output.trim());

        match self.orchestrator().generate_preview(&input, &output) {
            Ok(PreviewOutcome::Generated { cuts }) => println!(
                "{} {}",
                style("✓").green(),
                t!("preview.created", cuts = cuts, path = output.display())
            ),
            Ok(PreviewOutcome::AlreadyExists) => println!(
                "{} {}",
                style("⤳").dim(),
                t!("preview.exists", path = output.display())
            ),
            Err(e) => return Err(e).context(t!("preview.failed").to_string()),
        }

        Ok(())
    }

    /// Prompt for a video folder and an output folder, then preview every video.
    pub fn run_batch(&mut self) -> Result<()> {
        println!("{}", style(t!("preview.batch_title")).cyan().bold());

        let input_dir = self.prompt_directory(
            &t!("preview.prompt_video_folder"),
            self.config.settings.last_input_dir.clone(),
        )?;
        validate_directory_exists(&input_dir)?;

        let output_dir = self.prompt_directory(
            &t!("preview.prompt_output_folder"),
            self.config.settings.last_output_dir.clone(),
        )?;
        ensure_directory_exists(&output_dir)?;

        remember_directories(&mut self.config.settings, &input_dir, &output_dir);
        if let Err(e) = save_settings(&self.config.settings) {
            warn!("Could not remember folders: {e:#}");
        }

        println!("{}", style(t!("preview.scanning")).dim());
        let videos = scan_video_files(&input_dir, &self.config.file_type_table)?;

        if videos.is_empty() {
            println!("{}", style(t!("preview.no_videos")).yellow());
            return Ok(());
        }

        println!(
            "{}",
            style(t!("preview.found", count = videos.len())).green()
        );

        let result = process_videos(
            &self.orchestrator(),
            &videos,
            &output_dir,
            &self.shutdown_signal,
        )?;
        print_summary(&result);

        Ok(())
    }

    fn prompt_directory(&self, prompt: &str, last: Option<String>) -> Result<PathBuf> {
        let mut input = Input::<String>::new().with_prompt(prompt);
        if let Some(last) = last {
            input = input.default(last);
        }
        let path = input.interact_text()?;
        Ok(PathBuf::from(path.trim()))
    }
}

/// `movie.mp4` -> `movie.gif` in the same folder.
#[must_use]
pub fn default_output_for(input: &Path) -> PathBuf {
    input.with_extension(PREVIEW_EXTENSION)
}

/// Run `orchestrator` over `videos` one at a time; a failure is counted and the
/// batch moves on. Stops early once shutdown is requested.
pub fn process_videos(
    orchestrator: &PreviewOrchestrator,
    videos: &[VideoFileInfo],
    output_dir: &Path,
    shutdown_signal: &AtomicBool,
) -> Result<GenerationResult> {
    let mut result = GenerationResult {
        total_videos: videos.len(),
        ..GenerationResult::default()
    };

    let progress_bar = ProgressBar::new(videos.len() as u64);
    progress_bar.set_style(
        ProgressStyle::default_bar()
            .template(PROGRESS_TEMPLATE)?
            .progress_chars("#>-"),
    );

    for video in videos {
        if shutdown_signal.load(Ordering::SeqCst) {
            warn!("Shutdown requested, stopping batch");
            break;
        }

        let name = video
            .path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        progress_bar.set_message(name.clone());
        let output = output_dir.join(video.preview_file_name(PREVIEW_EXTENSION));

        match orchestrator.generate_preview(&video.path, &output) {
            Ok(PreviewOutcome::Generated { .. }) => result.successful += 1,
            Ok(PreviewOutcome::AlreadyExists) => result.skipped += 1,
            Err(PipelineError::Cancelled { .. }) => {
                result.failed += 1;
                progress_bar.inc(1);
                break;
            }
            Err(e) => {
                progress_bar.println(format!("{} {name}: {e}", style("✗").red()));
                result.failed += 1;
            }
        }
        progress_bar.inc(1);
    }

    progress_bar.finish_with_message(t!("preview.done").to_string());
    Ok(result)
}

pub fn print_summary(result: &GenerationResult) {
    println!();
    println!("{}", style(t!("preview.summary_title")).cyan().bold());
    println!(
        "  {}",
        t!("preview.summary_total", count = result.total_videos)
    );
    println!(
        "  {}",
        style(t!("preview.summary_generated", count = result.successful)).green()
    );

    if result.skipped > 0 {
        println!(
            "  {}",
            style(t!("preview.summary_skipped", count = result.skipped)).yellow()
        );
    }

    if result.failed > 0 {
        println!(
            "  {}",
            style(t!("preview.summary_failed", count = result.failed)).red()
        );
    }

    info!(
        "Preview batch finished - generated: {}, skipped: {}, failed: {}",
        result.successful, result.skipped, result.failed
    );
}
