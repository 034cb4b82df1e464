use super::error::{ProbeCause, ProbeError};
use crate::config::PreviewSettings;
use crate::tools::run_command;
use log::debug;
use std::path::Path;
use std::process::Command;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

/// Source of a video's total duration in seconds.
pub trait DurationProber: Send + Sync {
    fn probe(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Reads the container duration with
/// `ffprobe -v error -show_entries format=duration -of default=noprint_wrappers=1:nokey=1`.
pub struct FfprobeDurationProber {
    program: String,
    shutdown_signal: Arc<AtomicBool>,
}

impl FfprobeDurationProber {
    #[must_use]
    pub fn new(settings: &PreviewSettings, shutdown_signal: Arc<AtomicBool>) -> Self {
        Self {
            program: settings.ffprobe_program.clone(),
            shutdown_signal,
        }
    }

    fn build_command(&self, path: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args([
            "-v",
            "error",
            "-show_entries",
            "format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ])
        .arg(path);
        cmd
    }
}

impl DurationProber for FfprobeDurationProber {
    fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        debug!("Probing duration: {}", path.display());

        let output = run_command(self.build_command(path), &self.shutdown_signal).map_err(
            |e| ProbeError {
                path: path.to_path_buf(),
                cause: e.into(),
            },
        )?;

        let duration =
            parse_duration_output(&String::from_utf8_lossy(&output.stdout)).map_err(|cause| {
                ProbeError {
                    path: path.to_path_buf(),
                    cause,
                }
            })?;

        debug!("Duration of {}: {duration:.3}s", path.display());
        Ok(duration)
    }
}

/// Parse the probe's stdout: a single base-10 number of seconds.
pub fn parse_duration_output(output: &str) -> Result<f64, ProbeCause> {
    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(ProbeCause::EmptyOutput);
    }
    trimmed.parse::<f64>().map_err(|source| ProbeCause::Parse {
        output: trimmed.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_duration_output_trims_whitespace() {
        let d = parse_duration_output("  1830.421000\n").unwrap();
        assert!((d - 1830.421).abs() < 1e-9);
    }

    #[test]
    fn test_parse_duration_output_empty() {
        assert!(matches!(
            parse_duration_output(" \n"),
            Err(ProbeCause::EmptyOutput)
        ));
        assert!(matches!(
            parse_duration_output(""),
            Err(ProbeCause::EmptyOutput)
        ));
    }

    #[test]
    fn test_parse_duration_output_not_a_number() {
        // ffprobe prints N/A for streams without a known duration.
        match parse_duration_output("N/A\n") {
            Err(ProbeCause::Parse { output, .. }) => assert_eq!(output, "N/A"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_build_command_args() {
        let prober = FfprobeDurationProber::new(
            &PreviewSettings::default(),
            Arc::new(AtomicBool::new(false)),
        );
        let cmd = prober.build_command(Path::new("/videos/a b.mp4"));

        assert_eq!(cmd.get_program(), "ffprobe");
        let args: Vec<_> = cmd
            .get_args()
            .map(|a| a.to_string_lossy().to_string())
            .collect();
        assert_eq!(
            args,
            [
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                "/videos/a b.mp4",
            ]
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_reports_failed_program() {
        let settings = PreviewSettings {
            ffprobe_program: "false".to_string(),
            ..PreviewSettings::default()
        };
        let prober = FfprobeDurationProber::new(&settings, Arc::new(AtomicBool::new(false)));

        let err = prober.probe(Path::new("missing.mp4")).unwrap_err();
        assert!(matches!(err.cause, ProbeCause::Command(_)));
        assert_eq!(err.path, Path::new("missing.mp4"));
    }
}
