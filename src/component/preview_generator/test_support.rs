//! In-process stand-ins for the external tools, used by unit tests.

use super::animation_combiner::AnimationCombiner;
use super::clip_transcoder::{ClipTask, ClipTranscoder};
use super::duration_prober::DurationProber;
use super::error::{CombineError, ProbeCause, ProbeError, ToolFailure, TranscodeError};
use crate::config::PreviewSettings;
use crate::tools::CommandError;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

/// Ordered record of every external call made during a test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: String) {
        self.0.lock().unwrap().push(entry);
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }
}

fn failed(program: &str) -> CommandError {
    CommandError::Failed {
        program: program.to_string(),
        code: 1,
        stderr: "simulated failure".to_string(),
    }
}

pub struct FakeProber {
    pub duration: Option<f64>,
    pub log: CallLog,
}

impl DurationProber for FakeProber {
    fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        self.log.push(format!("probe {}", path.display()));
        self.duration.ok_or_else(|| ProbeError {
            path: path.to_path_buf(),
            cause: ProbeCause::Command(failed("ffprobe")),
        })
    }
}

#[derive(Default)]
pub struct FakeTranscoder {
    pub log: CallLog,
    /// Cut indices that fail.
    pub fail_at: Vec<usize>,
    /// Flip this flag when the given cut starts, simulating Ctrl-C mid-run.
    pub cancel_at: Option<(usize, Arc<AtomicBool>)>,
    pub delay: Option<Duration>,
}

impl ClipTranscoder for FakeTranscoder {
    fn transcode(&self, task: &ClipTask) -> Result<(), TranscodeError> {
        self.log.push(format!("transcode {} {:.2}", task.index, task.start));
        if let Some(delay) = self.delay {
            thread::sleep(delay);
        }

        if let Some((index, flag)) = &self.cancel_at {
            if *index == task.index {
                flag.store(true, Ordering::SeqCst);
                return Err(TranscodeError {
                    index: task.index,
                    start: task.start,
                    input: task.video_path.clone(),
                    cause: ToolFailure::Command(CommandError::Cancelled {
                        program: "ffmpeg".to_string(),
                    }),
                });
            }
        }

        if self.fail_at.contains(&task.index) {
            // Leave a half-written clip behind like a crashed encoder would.
            fs::write(&task.output_path, b"GIF8").unwrap();
            return Err(TranscodeError {
                index: task.index,
                start: task.start,
                input: task.video_path.clone(),
                cause: ToolFailure::Command(failed("ffmpeg")),
            });
        }

        fs::write(&task.output_path, format!("clip{}", task.index)).unwrap();
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeCombiner {
    pub log: CallLog,
    pub fail: bool,
    /// Report success without writing the combined file.
    pub write_nothing: bool,
    /// Another writer publishes this path while the combine is running.
    pub racing_output: Option<PathBuf>,
    /// Clip lists received, in call order.
    pub received: Arc<Mutex<Vec<Vec<PathBuf>>>>,
}

impl AnimationCombiner for FakeCombiner {
    fn combine(&self, clips: &[PathBuf], output: &Path) -> Result<(), CombineError> {
        self.log.push(format!("combine {}", clips.len()));
        self.received.lock().unwrap().push(clips.to_vec());

        if let Some(path) = &self.racing_output {
            fs::write(path, b"other preview").unwrap();
        }
        if self.write_nothing {
            return Ok(());
        }

        let mut joined = Vec::new();
        for clip in clips {
            joined.extend(fs::read(clip).unwrap());
            joined.push(b'|');
        }
        fs::write(output, &joined).unwrap();

        if self.fail {
            return Err(CombineError {
                clips: clips.len(),
                output: output.to_path_buf(),
                cause: ToolFailure::Command(failed("magick")),
            });
        }
        Ok(())
    }
}

pub fn settings(cut_length: f64, max_cuts: usize) -> PreviewSettings {
    PreviewSettings {
        cut_length,
        max_cuts,
        ..PreviewSettings::default()
    }
}

/// Entries of `dir` that look like leftover workspaces.
pub fn leftover_workspaces(dir: &Path) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().starts_with(".tmp_preview_"))
        .map(|e| e.path())
        .collect()
}
