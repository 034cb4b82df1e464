use log::{debug, warn};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use uuid::Uuid;

const WORKSPACE_PREFIX: &str = ".tmp_preview_";

/// Per-invocation scratch directory, removed when dropped.
///
/// The directory lives next to the final artifact so the finished preview
/// can be linked into place on the same filesystem. Parent directories that
/// had to be created for it are removed again on drop if they are still empty.
#[derive(Debug)]
pub struct Workspace {
    path: PathBuf,
    created_parents: Vec<PathBuf>,
}

impl Workspace {
    /// Create a fresh, uniquely named directory under `parent` for `source`.
    pub fn create(source: &Path, parent: &Path) -> io::Result<Self> {
        let stem = source
            .file_stem()
            .map_or_else(|| "video".to_string(), |s| s.to_string_lossy().to_string());

        let created_parents = missing_ancestors(parent);
        fs::create_dir_all(parent)?;
        let path = parent.join(format!(
            "{WORKSPACE_PREFIX}{stem}_{}",
            Uuid::new_v4().simple()
        ));
        // create_dir (not _all) fails if the name is somehow already taken.
        let mut workspace = Self {
            path,
            created_parents,
        };
        if let Err(e) = fs::create_dir(&workspace.path) {
            // Nothing to remove but the parents made above.
            workspace.path = PathBuf::new();
            return Err(e);
        }

        debug!("Created workspace: {}", workspace.path.display());
        Ok(workspace)
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn file(&self, name: &str) -> PathBuf {
        self.path.join(name)
    }
}

impl Drop for Workspace {
    fn drop(&mut self) {
        if !self.path.as_os_str().is_empty() && self.path.exists() {
            match fs::remove_dir_all(&self.path) {
                Ok(()) => debug!("Removed workspace: {}", self.path.display()),
                Err(e) => warn!("Cannot remove workspace {}: {e}", self.path.display()),
            }
        }

        // Deepest first; stops at the first directory something else now uses.
        for dir in &self.created_parents {
            if fs::remove_dir(dir).is_err() {
                break;
            }
            debug!("Removed empty output directory: {}", dir.display());
        }
    }
}

/// `dir` and each of its ancestors that does not exist yet, deepest first.
fn missing_ancestors(dir: &Path) -> Vec<PathBuf> {
    let mut missing = Vec::new();
    let mut current = Some(dir);
    while let Some(d) = current {
        if d.as_os_str().is_empty() || d.exists() {
            break;
        }
        missing.push(d.to_path_buf());
        current = d.parent();
    }
    missing
}

/// True if `name` looks like a directory created by [`Workspace::create`].
#[must_use]
pub fn is_workspace_dir_name(name: &str) -> bool {
    name.starts_with(WORKSPACE_PREFIX)
}
