use super::error::{ToolFailure, TranscodeError};
use crate::config::PreviewSettings;
use crate::tools::run_piped;
use log::debug;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Pre-roll for two-stage seek, in seconds.
const SEEK_MARGIN: f64 = 2.0;

/// One cut to turn into an intermediate animation.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipTask {
    pub video_path: PathBuf,
    pub start: f64,
    pub length: f64,
    pub output_path: PathBuf,
    pub index: usize,
}

/// Output shape shared by every clip of one preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClipFormat {
    pub fps: u32,
    pub width: u32,
    pub height: i32,
    pub frame_delay: u32,
}

impl ClipFormat {
    #[must_use]
    pub const fn from_settings(settings: &PreviewSettings) -> Self {
        Self {
            fps: settings.fps,
            width: settings.scale_width,
            height: settings.scale_height,
            frame_delay: settings.clip_frame_delay,
        }
    }

    /// ffmpeg filter chain, e.g. `fps=20,scale=320:-1:flags=lanczos`; a height
    /// of -1 lets ffmpeg keep the aspect ratio.
    #[must_use]
    pub fn filter(&self) -> String {
        format!(
            "fps={},scale={}:{}:flags=lanczos",
            self.fps, self.width, self.height
        )
    }
}

/// Turns one cut of a video into an animated image.
pub trait ClipTranscoder: Send + Sync {
    fn transcode(&self, task: &ClipTask) -> Result<(), TranscodeError>;
}

/// `ffmpeg ... -c:v pam -f image2pipe - | magick -delay N -loop 0 - out.gif`
pub struct FfmpegClipTranscoder {
    ffmpeg_program: String,
    magick_program: String,
    format: ClipFormat,
    shutdown_signal: Arc<AtomicBool>,
}

impl FfmpegClipTranscoder {
    #[must_use]
    pub fn new(settings: &PreviewSettings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            ffmpeg_program: settings.ffmpeg_program.clone(),
            magick_program: settings.magick_program.clone(),
            format: ClipFormat::from_settings(settings),
            shutdown_signal,
        }
    }

    fn ffmpeg_command(&self, task: &ClipTask) -> Command {
        let mut cmd = Command::new(&self.ffmpeg_program);
        cmd.args(build_ffmpeg_args(task, &self.format));
        cmd
    }

    fn magick_command(&self, task: &ClipTask) -> Command {
        let mut cmd = Command::new(&self.magick_program);
        cmd.args([
            "-delay".to_string(),
            self.format.frame_delay.to_string(),
            "-loop".to_string(),
            "0".to_string(),
            "-".to_string(),
        ])
        .arg(&task.output_path);
        cmd
    }
}

impl ClipTranscoder for FfmpegClipTranscoder {
    fn transcode(&self, task: &ClipTask) -> Result<(), TranscodeError> {
        debug!(
            "Transcoding cut {} of {}: start={:.3}s length={:.3}s -> {}",
            task.index,
            task.video_path.display(),
            task.start,
            task.length,
            task.output_path.display()
        );

        let fail = |cause: ToolFailure| TranscodeError {
            index: task.index,
            start: task.start,
            input: task.video_path.clone(),
            cause,
        };

        run_piped(
            self.ffmpeg_command(task),
            self.magick_command(task),
            &self.shutdown_signal,
        )
        .map_err(|e| fail(e.into()))?;

        if !task.output_path.exists() {
            return Err(fail(ToolFailure::MissingOutput(task.output_path.clone())));
        }
        Ok(())
    }
}

/// Arguments for the ffmpeg half of the pipe.
///
/// Two-stage seek: `-ss` before `-i` jumps to the nearest keyframe cheaply,
/// the second `-ss` after `-i` decodes forward to the exact start.
#[must_use]
pub fn build_ffmpeg_args(task: &ClipTask, format: &ClipFormat) -> Vec<String> {
    let coarse = (task.start - SEEK_MARGIN).max(0.0);
    let fine = task.start - coarse;

    let mut args = vec![
        "-hide_banner".to_string(),
        "-nostdin".to_string(),
        "-loglevel".to_string(),
        "error".to_string(),
    ];

    if coarse > 0.0 {
        args.push("-ss".to_string());
        args.push(format!("{coarse:.3}"));
    }

    args.push("-i".to_string());
    args.push(task.video_path.to_string_lossy().to_string());

    if fine > 0.0 {
        args.push("-ss".to_string());
        args.push(format!("{fine:.3}"));
    }

    args.extend([
        "-t".to_string(),
        format!("{:.3}", task.length),
        "-an".to_string(),
        "-sn".to_string(),
        "-dn".to_string(),
        "-vf".to_string(),
        format.filter(),
        "-c:v".to_string(),
        "pam".to_string(),
        "-f".to_string(),
        "image2pipe".to_string(),
        "-".to_string(),
    ]);

    args
}

/// One task per planned start, writing `clip_000.gif`, `clip_001.gif`, ...
#[must_use]
pub fn create_clip_tasks(
    video_path: &Path,
    starts: &[f64],
    length: f64,
    output_dir: &Path,
) -> Vec<ClipTask> {
    starts
        .iter()
        .enumerate()
        .map(|(i, &start)| ClipTask {
            video_path: video_path.to_path_buf(),
            start,
            length,
            output_path: output_dir.join(format!("clip_{i:03}.gif")),
            index: i,
        })
        .collect()
}
