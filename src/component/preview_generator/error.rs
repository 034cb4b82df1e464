//! Failure types for each stage of preview generation.

use crate::tools::CommandError;
use std::num::ParseFloatError;
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ProbeCause {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("probe printed no duration")]
    EmptyOutput,

    #[error("unparsable duration {output:?}: {source}")]
    Parse {
        output: String,
        source: ParseFloatError,
    },
}

#[derive(Debug, thiserror::Error)]
#[error("cannot read duration of {}: {cause}", .path.display())]
pub struct ProbeError {
    pub path: PathBuf,
    pub cause: ProbeCause,
}

/// Why an external step did not produce its artifact.
#[derive(Debug, thiserror::Error)]
pub enum ToolFailure {
    #[error(transparent)]
    Command(#[from] CommandError),

    #[error("{} was not created", .0.display())]
    MissingOutput(PathBuf),
}

impl ToolFailure {
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Command(e) if e.is_cancelled())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("cut #{index} at {start:.3}s of {} failed: {cause}", .input.display())]
pub struct TranscodeError {
    pub index: usize,
    pub start: f64,
    pub input: PathBuf,
    pub cause: ToolFailure,
}

#[derive(Debug, thiserror::Error)]
#[error("combining {clips} clips into {} failed: {cause}", .output.display())]
pub struct CombineError {
    pub clips: usize,
    pub output: PathBuf,
    pub cause: ToolFailure,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("cannot create workspace in {}: {source}", .path.display())]
    Workspace {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Probe(#[from] ProbeError),

    #[error("no cuts could be planned for {} (duration {duration:.3}s)", .input.display())]
    EmptyPlan { input: PathBuf, duration: f64 },

    #[error(transparent)]
    Transcode(#[from] TranscodeError),

    #[error("cannot assemble preview of {}: {source}", .input.display())]
    Combine {
        input: PathBuf,
        source: CombineError,
    },

    #[error("cannot move preview to {}: {source}", .output.display())]
    Persist {
        output: PathBuf,
        source: std::io::Error,
    },

    #[error("preview generation for {} was cancelled", .input.display())]
    Cancelled { input: PathBuf },
}

impl PipelineError {
    /// Short stage label for summaries and logs.
    #[must_use]
    pub const fn stage(&self) -> &'static str {
        match self {
            Self::Workspace { .. } => "workspace",
            Self::Probe(_) => "probe",
            Self::EmptyPlan { .. } => "plan",
            Self::Transcode(_) => "transcode",
            Self::Combine { .. } => "combine",
            Self::Persist { .. } => "persist",
            Self::Cancelled { .. } => "cancelled",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transcode_error_message_names_cut_and_file() {
        let err = PipelineError::from(TranscodeError {
            index: 2,
            start: 31.666_666,
            input: PathBuf::from("/videos/a.mp4"),
            cause: ToolFailure::Command(CommandError::Failed {
                program: "ffmpeg".to_string(),
                code: 1,
                stderr: "Invalid data found".to_string(),
            }),
        });

        let message = err.to_string();
        assert_eq!(err.stage(), "transcode");
        assert!(message.contains("cut #2 at 31.667s"));
        assert!(message.contains("/videos/a.mp4"));
        assert!(message.contains("ffmpeg failed (code 1): Invalid data found"));
    }

    #[test]
    fn test_combine_error_message_names_input() {
        let err = PipelineError::Combine {
            input: PathBuf::from("/videos/a.mp4"),
            source: CombineError {
                clips: 4,
                output: PathBuf::from("/out/.tmp_preview_a_1/combined.gif"),
                cause: ToolFailure::MissingOutput(PathBuf::from("combined.gif")),
            },
        };

        let message = err.to_string();
        assert_eq!(err.stage(), "combine");
        assert!(message.starts_with("cannot assemble preview of /videos/a.mp4: "));
        assert!(message.contains("combining 4 clips"));
    }

    #[test]
    fn test_probe_error_message() {
        let err = ProbeError {
            path: PathBuf::from("x.mkv"),
            cause: ProbeCause::EmptyOutput,
        };
        assert_eq!(
            err.to_string(),
            "cannot read duration of x.mkv: probe printed no duration"
        );
    }

    #[test]
    fn test_tool_failure_cancelled() {
        let cancelled = ToolFailure::Command(CommandError::Cancelled {
            program: "magick".to_string(),
        });
        assert!(cancelled.is_cancelled());
        assert!(!ToolFailure::MissingOutput(PathBuf::from("a.gif")).is_cancelled());
    }
}
