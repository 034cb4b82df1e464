use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::Path;

/// `scale_height` value that keeps the source aspect ratio.
pub const KEEP_ASPECT_RATIO: i32 = -1;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileTypeTable {
    #[serde(rename = "VIDEO_FILE")]
    pub video_file: Vec<String>,
}

impl FileTypeTable {
    #[must_use]
    pub fn video_extensions_set(&self) -> HashSet<String> {
        self.video_file
            .iter()
            .map(|ext| ext.to_lowercase())
            .collect()
    }

    #[must_use]
    pub fn is_video_file(&self, path: &Path) -> bool {
        let video_extensions = self.video_extensions_set();
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| video_extensions.contains(&format!(".{}", ext.to_lowercase())))
    }
}

/// Shortest accepted cut, in seconds.
pub const MIN_CUT_LENGTH: f64 = 0.1;
/// Most cuts one preview may sample.
pub const MAX_CUTS: usize = 200;
/// Most concurrent transcodes per preview.
pub const MAX_WORKERS: usize = 64;

/// Parameters of the preview pipeline. Fixed once an orchestrator is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewSettings {
    /// Seconds per sampled window.
    pub cut_length: f64,
    /// Upper bound on the number of windows.
    pub max_cuts: usize,
    /// Frame rate of each clip animation.
    pub fps: u32,
    pub scale_width: u32,
    /// Pixel height, or [`KEEP_ASPECT_RATIO`].
    pub scale_height: i32,
    /// Frame delay (1/100 s) when a clip is turned into an animation.
    pub clip_frame_delay: u32,
    /// Frame delay (1/100 s) applied by the final concatenation.
    pub combine_frame_delay: u32,
    /// Concurrent clip transcodes per preview; 1 means strictly sequential.
    pub workers: usize,
    pub ffprobe_program: String,
    pub ffmpeg_program: String,
    pub magick_program: String,
}

impl Default for PreviewSettings {
    fn default() -> Self {
        Self {
            cut_length: 5.0,
            max_cuts: 10,
            fps: 20,
            scale_width: 320,
            scale_height: KEEP_ASPECT_RATIO,
            clip_frame_delay: 2,
            combine_frame_delay: 5,
            workers: 1,
            ffprobe_program: "ffprobe".to_string(),
            ffmpeg_program: "ffmpeg".to_string(),
            magick_program: "magick".to_string(),
        }
    }
}

impl PreviewSettings {
    pub fn validate(&self) -> Result<()> {
        if !self.cut_length.is_finite() || self.cut_length < MIN_CUT_LENGTH {
            bail!(
                "cut_length must be at least {MIN_CUT_LENGTH} seconds, got {}",
                self.cut_length
            );
        }
        if self.max_cuts == 0 || self.max_cuts > MAX_CUTS {
            bail!(
                "max_cuts must be between 1 and {MAX_CUTS}, got {}",
                self.max_cuts
            );
        }
        if self.fps == 0 {
            bail!("fps must be at least 1");
        }
        if self.scale_width == 0 {
            bail!("scale_width must be at least 1");
        }
        if self.scale_height == 0 || self.scale_height < KEEP_ASPECT_RATIO {
            bail!(
                "scale_height must be positive or {KEEP_ASPECT_RATIO}, got {}",
                self.scale_height
            );
        }
        if self.workers == 0 || self.workers > MAX_WORKERS {
            bail!(
                "workers must be between 1 and {MAX_WORKERS}, got {}",
                self.workers
            );
        }
        for (name, program) in [
            ("ffprobe_program", &self.ffprobe_program),
            ("ffmpeg_program", &self.ffmpeg_program),
            ("magick_program", &self.magick_program),
        ] {
            if program.trim().is_empty() {
                bail!("{name} must not be empty");
            }
        }
        Ok(())
    }
}

/// Interface language; the value is the locale name passed to `rust_i18n`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "en-US")]
    EnUs,
    #[serde(rename = "zh-TW")]
    ZhTw,
    #[serde(rename = "zh-CN")]
    ZhCn,
    #[serde(rename = "ja-JP")]
    JaJp,
}

impl Language {
    pub const ALL: [Self; 4] = [Self::EnUs, Self::ZhTw, Self::ZhCn, Self::JaJp];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
            Self::ZhCn => "zh-CN",
            Self::JaJp => "ja-JP",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::EnUs => "English",
            Self::ZhTw => "繁體中文",
            Self::ZhCn => "简体中文",
            Self::JaJp => "日本語",
        };
        write!(f, "{name}")
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub preview: PreviewSettings,
    pub last_input_dir: Option<String>,
    pub last_output_dir: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub file_type_table: FileTypeTable,
    pub settings: UserSettings,
}
