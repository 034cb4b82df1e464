pub mod load;
pub mod save;
pub mod types;

pub use load::SETTINGS_FILE;
pub use types::{
    Config, FileTypeTable, KEEP_ASPECT_RATIO, Language, MAX_CUTS, MAX_WORKERS, MIN_CUT_LENGTH,
    PreviewSettings, UserSettings,
};
