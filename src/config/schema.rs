//! Settings file schema.
//!
//! Maps `.toolwarden/config.yml`. Every field is optional.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Project settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(default)]
pub struct Settings {
    /// Catalog file replacing the built-in catalog. Relative paths are
    /// resolved against the project root.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog: Option<PathBuf>,

    /// Timeout for detection and prerequisite probes, in seconds.
    pub probe_timeout_secs: u64,

    /// Timeout for install and run commands, in seconds.
    pub command_timeout_secs: u64,

    /// Number of log entries shown by `toolwarden logs`.
    pub log_tail: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            catalog: None,
            probe_timeout_secs: 5,
            command_timeout_secs: 600,
            log_tail: 20,
        }
    }
}

impl Settings {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }

    /// The catalog path, made absolute against `root` when relative.
    pub fn catalog_path(&self, root: Option<&Path>) -> Option<PathBuf> {
        let path = self.catalog.as_ref()?;
        match root {
            Some(root) if path.is_relative() => Some(root.join(path)),
            _ => Some(path.clone()),
        }
    }
}
