use super::error::{CombineError, ToolFailure};
use crate::config::PreviewSettings;
use crate::tools::run_command;
use log::debug;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Concatenates intermediate animations, in the given order, into one file.
pub trait AnimationCombiner: Send + Sync {
    fn combine(&self, clips: &[PathBuf], output: &Path) -> Result<(), CombineError>;
}

/// `magick -delay N -loop 0 clip_000.gif clip_001.gif ... out.gif`
pub struct MagickCombiner {
    program: String,
    frame_delay: u32,
    shutdown_signal: Arc<AtomicBool>,
}

impl MagickCombiner {
    #[must_use]
    pub fn new(settings: &PreviewSettings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            program: settings.magick_program.clone(),
            frame_delay: settings.combine_frame_delay,
            shutdown_signal,
        }
    }
}

impl AnimationCombiner for MagickCombiner {
    fn combine(&self, clips: &[PathBuf], output: &Path) -> Result<(), CombineError> {
        debug!("Combining {} clips into {}", clips.len(), output.display());

        let fail = |cause: ToolFailure| CombineError {
            clips: clips.len(),
            output: output.to_path_buf(),
            cause,
        };

        let mut cmd = Command::new(&self.program);
        cmd.args(build_combine_args(clips, output, self.frame_delay));
        run_command(cmd, &self.shutdown_signal).map_err(|e| fail(e.into()))?;

        if !output.exists() {
            return Err(fail(ToolFailure::MissingOutput(output.to_path_buf())));
        }
        Ok(())
    }
}

/// Clip order on the command line is playback order in the result.
#[must_use]
pub fn build_combine_args(clips: &[PathBuf], output: &Path, frame_delay: u32) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec![
        "-delay".into(),
        frame_delay.to_string().into(),
        "-loop".into(),
        "0".into(),
    ];
    args.extend(clips.iter().map(|clip| clip.as_os_str().to_os_string()));
    args.push(output.as_os_str().to_os_string());
    args
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_combine_args_preserves_order() {
        let clips = vec![
            PathBuf::from("/ws/clip_000.gif"),
            PathBuf::from("/ws/clip_001.gif"),
            PathBuf::from("/ws/clip_002.gif"),
        ];
        let args = build_combine_args(&clips, Path::new("/ws/combined.gif"), 5);

        assert_eq!(
            args,
            [
                "-delay",
                "5",
                "-loop",
                "0",
                "/ws/clip_000.gif",
                "/ws/clip_001.gif",
                "/ws/clip_002.gif",
                "/ws/combined.gif",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_combine_requires_output_file() {
        // `true` exits 0 but writes nothing.
        let settings = PreviewSettings {
            magick_program: "true".to_string(),
            ..PreviewSettings::default()
        };
        let combiner = MagickCombiner::new(&settings, Arc::new(AtomicBool::new(false)));
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("out.gif");

        let err = combiner
            .combine(&[dir.path().join("clip_000.gif")], &output)
            .unwrap_err();
        assert!(matches!(err.cause, ToolFailure::MissingOutput(ref p) if *p == output));
        assert_eq!(err.clips, 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_combine_reports_tool_failure() {
        let settings = PreviewSettings {
            magick_program: "false".to_string(),
            ..PreviewSettings::default()
        };
        let combiner = MagickCombiner::new(&settings, Arc::new(AtomicBool::new(false)));
        let dir = tempfile::tempdir().unwrap();

        let err = combiner
            .combine(&[dir.path().join("a.gif")], &dir.path().join("out.gif"))
            .unwrap_err();
        assert!(matches!(err.cause, ToolFailure::Command(_)));
    }
}
