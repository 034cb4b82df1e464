use crate::config::FileTypeTable;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Clone)]
pub struct VideoFileInfo {
    pub path: PathBuf,
    pub size: u64,
}

impl VideoFileInfo {
    /// Name used for the preview derived from this video, e.g. `movie.gif`.
    #[must_use]
    pub fn preview_file_name(&self, extension: &str) -> String {
        let stem = self
            .path
            .file_stem()
            .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());
        format!("{stem}.{extension}")
    }
}

/// Recursively collect video files under `directory`, smallest first.
///
/// Preview workspaces left behind by a crashed run are never descended into.
pub fn scan_video_files(
    directory: &Path,
    file_type_table: &FileTypeTable,
) -> Result<Vec<VideoFileInfo>> {
    let mut video_files = Vec::new();

    let walker = WalkDir::new(directory)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| {
            !entry
                .file_name()
                .to_str()
                .is_some_and(crate::tools::is_workspace_dir_name)
        });

    for entry in walker {
        let entry =
            entry.with_context(|| format!("Failed to scan directory {}", directory.display()))?;
        if !entry.file_type().is_file() || !file_type_table.is_video_file(entry.path()) {
            continue;
        }
        let Ok(metadata) = entry.metadata() else {
            continue;
        };
        video_files.push(VideoFileInfo {
            path: entry.into_path(),
            size: metadata.len(),
        });
    }

    video_files.sort_by_key(|file| file.size);
    Ok(video_files)
}
