//! File-backed tool status store.
//!
//! Every writer loads the whole document, changes one tool's record and
//! rewrites the file atomically. There is no cross-process locking: two
//! processes writing at once race and the last writer wins.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use super::project::ProjectRoot;
use super::status::{LastError, ToolStatus};
use crate::catalog::CommandLine;
use crate::error::{Result, ToolwardenError};

/// On-disk shape of the state file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateDocument {
    #[serde(default)]
    pub tools: BTreeMap<String, ToolStatus>,

    /// Top-level keys written by other programs; preserved on rewrite.
    #[serde(flatten)]
    pub other: serde_json::Map<String, serde_json::Value>,
}

/// Handle to a project's state file.
///
/// A store without a path (no project root) accepts every write as a no-op
/// and reads as empty.
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    path: Option<PathBuf>,
}

impl StateStore {
    /// Store for the given project, or a no-op store when there is none.
    pub fn for_project(root: Option<&ProjectRoot>) -> Self {
        Self {
            path: root.map(ProjectRoot::state_file),
        }
    }

    /// Store backed by an explicit file.
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// Store that persists nothing.
    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn is_enabled(&self) -> bool {
        self.path.is_some()
    }

    /// Read the whole document. A missing file reads as empty.
    pub fn load(&self) -> Result<StateDocument> {
        let Some(path) = &self.path else {
            return Ok(StateDocument::default());
        };
        if !path.exists() {
            return Ok(StateDocument::default());
        }

        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
        if content.trim().is_empty() {
            return Ok(StateDocument::default());
        }
        let mut doc: StateDocument = serde_json::from_str(&content)?;

        let now = Utc::now();
        for status in doc.tools.values_mut() {
            status.normalize(now);
        }
        Ok(doc)
    }

    /// Write the whole document via temp file and rename.
    fn save(&self, path: &Path, doc: &StateDocument) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        let content = serde_json::to_string_pretty(doc)?;
        let temp_path = path.with_extension("json.tmp");
        fs::write(&temp_path, content)
            .with_context(|| format!("Failed to write {:?}", temp_path))?;
        fs::rename(&temp_path, path)
            .with_context(|| format!("Failed to replace {:?}", path))?;
        Ok(())
    }

    /// Read-modify-write one tool's record.
    ///
    /// Records that end up empty are dropped from the document.
    pub fn update<T>(&self, tool_id: &str, f: impl FnOnce(&mut ToolStatus) -> T) -> Result<T> {
        let Some(path) = &self.path else {
            tracing::debug!("no project root; not persisting state for {}", tool_id);
            return Ok(f(&mut ToolStatus::default()));
        };

        let mut doc = self.load()?;
        let status = doc.tools.entry(tool_id.to_string()).or_default();
        let result = f(status);
        if status.is_empty() {
            doc.tools.remove(tool_id);
        }
        self.save(path, &doc)?;
        Ok(result)
    }

    /// Like [`update`](Self::update) but fails when there is no project root.
    pub fn update_required<T>(
        &self,
        tool_id: &str,
        f: impl FnOnce(&mut ToolStatus) -> T,
    ) -> Result<T> {
        if self.path.is_none() {
            return Err(ToolwardenError::StateStoreUnavailable);
        }
        self.update(tool_id, f)
    }

    // --- Writers ---

    pub fn mark_installed(&self, tool_id: &str) -> Result<()> {
        self.update(tool_id, |s| s.mark_installed(Utc::now()))
    }

    /// Returns whether the marker was removed (a custom command keeps it).
    pub fn clear_installation(&self, tool_id: &str) -> Result<bool> {
        self.update(tool_id, |s| s.clear_installation())
    }

    pub fn record_error(&self, tool_id: &str, message: &str) -> Result<()> {
        self.update(tool_id, |s| s.record_error(message, Utc::now()))
    }

    pub fn clear_error(&self, tool_id: &str) -> Result<()> {
        self.update(tool_id, |s| s.clear_error())
    }

    pub fn flag_detection_failed(&self, tool_id: &str) -> Result<()> {
        self.update(tool_id, |s| s.flag_detection_failed(Utc::now()))
    }

    pub fn clear_detection_failed(&self, tool_id: &str) -> Result<()> {
        self.update(tool_id, |s| s.clear_detection_failed())
    }

    pub fn set_custom_command(&self, tool_id: &str, command: CommandLine) -> Result<()> {
        self.update_required(tool_id, |s| s.set_custom_command(command, Utc::now()))
    }

    pub fn clear_custom_command(&self, tool_id: &str) -> Result<()> {
        self.update(tool_id, |s| s.clear_custom_command())
    }

    /// Forget everything about a tool.
    pub fn clear_tool(&self, tool_id: &str) -> Result<()> {
        self.update(tool_id, |s| *s = ToolStatus::default())
    }

    // --- Readers ---

    /// The tool's record, empty when nothing is stored.
    pub fn tool_status(&self, tool_id: &str) -> Result<ToolStatus> {
        Ok(self.load()?.tools.remove(tool_id).unwrap_or_default())
    }

    pub fn is_tool_marked_installed(&self, tool_id: &str) -> Result<bool> {
        Ok(self.tool_status(tool_id)?.is_installed())
    }

    pub fn is_detection_failed(&self, tool_id: &str) -> Result<bool> {
        Ok(self.tool_status(tool_id)?.is_detection_failed())
    }

    pub fn last_error(&self, tool_id: &str) -> Result<Option<LastError>> {
        Ok(self.tool_status(tool_id)?.last_error().cloned())
    }

    pub fn custom_command(&self, tool_id: &str) -> Result<Option<CommandLine>> {
        Ok(self.tool_status(tool_id)?.custom_command().cloned())
    }

    /// Read a tool's record, logging and ignoring read failures.
    pub fn tool_status_or_default(&self, tool_id: &str) -> ToolStatus {
        self.tool_status(tool_id).unwrap_or_else(|e| {
            tracing::warn!("could not read state for {}: {}", tool_id, e);
            ToolStatus::default()
        })
    }
}
