//! Animated GIF previews of videos.
//!
//! A preview is a handful of short, evenly spaced cuts of the video, each
//! turned into an animation and then concatenated in playback order:
//! probe duration -> plan cuts -> transcode cuts -> combine.

mod animation_combiner;
mod clip_transcoder;
mod cut_planner;
mod duration_prober;
mod error;
mod main;
mod orchestrator;
#[cfg(test)]
mod test_support;

pub use animation_combiner::{AnimationCombiner, MagickCombiner, build_combine_args};
pub use clip_transcoder::{
    ClipFormat, ClipTask, ClipTranscoder, FfmpegClipTranscoder, build_ffmpeg_args,
    create_clip_tasks,
};
pub use cut_planner::plan_cuts;
pub use duration_prober::{DurationProber, FfprobeDurationProber, parse_duration_output};
pub use error::{
    CombineError, PipelineError, ProbeCause, ProbeError, ToolFailure, TranscodeError,
};
pub use main::{
    GenerationResult, PreviewGenerator, default_output_for, print_summary, process_videos,
};
pub use orchestrator::{PreviewOrchestrator, PreviewOutcome};
