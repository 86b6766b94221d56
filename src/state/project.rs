//! Project root discovery.
//!
//! State, logs and settings all live under `<root>/.toolwarden/`.

use std::path::{Path, PathBuf};

/// Name of the per-project data directory.
pub const DATA_DIR: &str = ".toolwarden";

/// Discovered project root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ProjectRoot {
    path: PathBuf,
}

impl ProjectRoot {
    /// Use `path` as the project root without searching.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Walk up from `start` looking for a project root.
    ///
    /// A directory containing `.toolwarden/` wins; otherwise the first
    /// directory containing `.git` is used.
    pub fn discover(start: &Path) -> Option<Self> {
        find_project_root(start).map(Self::new)
    }

    /// The root directory.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `<root>/.toolwarden`
    pub fn data_dir(&self) -> PathBuf {
        self.path.join(DATA_DIR)
    }

    /// `<root>/.toolwarden/state.json`
    pub fn state_file(&self) -> PathBuf {
        self.data_dir().join("state.json")
    }

    /// `<root>/.toolwarden/logs`
    pub fn logs_dir(&self) -> PathBuf {
        self.data_dir().join("logs")
    }

    /// `<root>/.toolwarden/config.yml`
    pub fn config_file(&self) -> PathBuf {
        self.data_dir().join("config.yml")
    }
}

/// Find the project root by walking up from `start`.
pub fn find_project_root(start: &Path) -> Option<PathBuf> {
    // .toolwarden anywhere up the tree beats a nearer .git
    if let Some(found) = start.ancestors().find(|dir| dir.join(DATA_DIR).is_dir()) {
        return Some(found.to_path_buf());
    }
    start
        .ancestors()
        .find(|dir| dir.join(".git").exists())
        .map(Path::to_path_buf)
}
