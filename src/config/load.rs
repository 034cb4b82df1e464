use crate::config::types::{Config, FileTypeTable, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::Path;

/// Settings file, resolved against the working directory.
pub const SETTINGS_FILE: &str = "settings.json";

/// Embedded at compile time so no external data file is needed.
const FILE_TYPE_TABLE_JSON: &str = include_str!("../data/file_type_table.json");

impl Config {
    pub fn new() -> Result<Self> {
        Self::load_from(Path::new(SETTINGS_FILE))
    }

    /// Load the embedded file table plus user settings from `settings_path`.
    ///
    /// A missing or unreadable settings file falls back to defaults; settings
    /// that parse but fail validation are an error.
    pub fn load_from(settings_path: &Path) -> Result<Self> {
        let file_type_table = Self::load_embedded_file_type_table()?;
        let settings = Self::load_settings(settings_path).unwrap_or_else(|e| {
            warn!("{e:#}; using default settings");
            UserSettings::default()
        });

        settings
            .preview
            .validate()
            .with_context(|| format!("Invalid preview settings in {}", settings_path.display()))?;

        Ok(Self {
            file_type_table,
            settings,
        })
    }

    fn load_settings(path: &Path) -> Result<UserSettings> {
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse settings from {}", path.display()))
    }

    fn load_embedded_file_type_table() -> Result<FileTypeTable> {
        serde_json::from_str(FILE_TYPE_TABLE_JSON)
            .context("Failed to parse embedded file type table")
    }
}
