use crate::config::load::SETTINGS_FILE;
use crate::config::types::UserSettings;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(settings: &UserSettings) -> Result<()> {
    save_settings_to(Path::new(SETTINGS_FILE), settings)
}

pub fn save_settings_to(path: &Path, settings: &UserSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("Failed to serialize settings")?;

    fs::write(path, content)
        .with_context(|| format!("Failed to write settings to {}", path.display()))?;

    Ok(())
}

/// Remember the folders of the last batch run so the prompts can default to them.
pub fn remember_directories(settings: &mut UserSettings, input_dir: &Path, output_dir: &Path) {
    settings.last_input_dir = Some(input_dir.to_string_lossy().to_string());
    settings.last_output_dir = Some(output_dir.to_string_lossy().to_string());
}
