//! Per-tool action logs (JSONL).

use std::fs::{self, File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use super::entry::{ActionLogEntry, LogAction};
use crate::state::ProjectRoot;

/// Counts and latest entry of one tool's log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSummary {
    pub total: usize,
    pub installs: usize,
    pub runs: usize,
    pub errors: usize,
    pub last: Option<ActionLogEntry>,
    pub last_failure: Option<ActionLogEntry>,
}

/// Appends and reads action logs, one file per tool.
///
/// Without a project root every call is a no-op.
#[derive(Debug, Clone, Default)]
pub struct ActionLogger {
    dir: Option<PathBuf>,
}

impl ActionLogger {
    /// Logger for the given project.
    pub fn for_project(root: Option<&ProjectRoot>) -> Self {
        Self {
            dir: root.map(ProjectRoot::logs_dir),
        }
    }

    /// Logger writing into `dir`.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
        }
    }

    /// Logger that records nothing.
    pub fn disabled() -> Self {
        Self { dir: None }
    }

    /// Path of a tool's log file.
    pub fn log_path(&self, tool_id: &str) -> Option<PathBuf> {
        self.dir
            .as_ref()
            .map(|dir| dir.join(format!("{}.jsonl", file_stem(tool_id))))
    }

    /// Append one entry.
    pub fn append(&self, entry: &ActionLogEntry) -> Result<()> {
        let Some(path) = self.log_path(&entry.tool_id) else {
            return Ok(());
        };
        ensure_parent(&path)?;

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open {:?}", path))?;

        let json = serde_json::to_string(entry)?;
        writeln!(file, "{}", json)?;
        Ok(())
    }

    /// The most recent `limit` entries, oldest first.
    pub fn recent(&self, tool_id: &str, limit: usize) -> Result<Vec<ActionLogEntry>> {
        let mut entries = self.read_all(tool_id)?;
        let skip = entries.len().saturating_sub(limit);
        Ok(entries.split_off(skip))
    }

    /// Delete a tool's log.
    pub fn clear(&self, tool_id: &str) -> Result<()> {
        let Some(path) = self.log_path(tool_id) else {
            return Ok(());
        };
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {:?}", path)),
        }
    }

    /// Summarize a tool's log.
    pub fn summary(&self, tool_id: &str) -> Result<LogSummary> {
        let entries = self.read_all(tool_id)?;
        let count = |action: LogAction| entries.iter().filter(|e| e.action == action).count();

        Ok(LogSummary {
            total: entries.len(),
            installs: count(LogAction::Install),
            runs: count(LogAction::Run),
            errors: count(LogAction::Error),
            last_failure: entries.iter().rev().find(|e| e.is_failure()).cloned(),
            last: entries.last().cloned(),
        })
    }

    fn read_all(&self, tool_id: &str) -> Result<Vec<ActionLogEntry>> {
        let Some(path) = self.log_path(tool_id) else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = File::open(&path).with_context(|| format!("Failed to open {:?}", path))?;
        let reader = BufReader::new(file);
        let mut entries = Vec::new();

        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            // A torn line from a concurrent writer is skipped.
            match serde_json::from_str::<ActionLogEntry>(&line) {
                Ok(entry) => entries.push(entry),
                Err(e) => tracing::debug!("skipping malformed log line in {:?}: {}", path, e),
            }
        }

        Ok(entries)
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory {:?}", parent))?;
    }
    Ok(())
}

/// Tool ids become file names; anything outside `[A-Za-z0-9._-]` is replaced.
fn file_stem(tool_id: &str) -> String {
    tool_id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect()
}
