//! Action log entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Longest captured output kept in one entry, in bytes.
pub const MAX_OUTPUT_BYTES: usize = 16 * 1024;

/// What happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Install,
    Run,
    Error,
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogAction::Install => write!(f, "install"),
            LogAction::Run => write!(f, "run"),
            LogAction::Error => write!(f, "error"),
        }
    }
}

/// One line of a tool's action log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionLogEntry {
    pub timestamp: DateTime<Utc>,
    pub tool_id: String,
    pub action: LogAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
}

impl ActionLogEntry {
    /// Create an entry stamped now.
    pub fn new(tool_id: impl Into<String>, action: LogAction) -> Self {
        Self {
            timestamp: Utc::now(),
            tool_id: tool_id.into(),
            action,
            command: None,
            output: None,
            error: None,
            exit_code: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    /// Attach captured output, keeping only the tail of long output.
    pub fn with_output(mut self, output: impl Into<String>) -> Self {
        let output = output.into();
        if !output.trim().is_empty() {
            self.output = Some(truncate_tail(&output, MAX_OUTPUT_BYTES));
        }
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_exit_code(mut self, exit_code: Option<i32>) -> Self {
        self.exit_code = exit_code;
        self
    }

    /// Whether this entry records a failure.
    pub fn is_failure(&self) -> bool {
        self.action == LogAction::Error
            || self.error.is_some()
            || self.exit_code.is_some_and(|c| c != 0)
    }
}

/// Keep the last `max` bytes of `text`, cut at a char boundary.
fn truncate_tail(text: &str, max: usize) -> String {
    if text.len() <= max {
        return text.to_string();
    }
    let mut start = text.len() - max;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    format!("[...truncated]\n{}", &text[start..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_wire_shape() {
        let entry = ActionLogEntry::new("greenframe", LogAction::Install)
            .with_command("npm install --global greenframe")
            .with_exit_code(Some(0));

        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["toolId"], "greenframe");
        assert_eq!(json["action"], "install");
        assert_eq!(json["exitCode"], 0);
        assert!(json.get("error").is_none());
        assert!(json.get("output").is_none());
    }

    #[test]
    fn long_output_keeps_tail() {
        let long = format!("{}END", "x".repeat(MAX_OUTPUT_BYTES * 2));
        let entry = ActionLogEntry::new("t", LogAction::Run).with_output(long);

        let output = entry.output.unwrap();
        assert!(output.starts_with("[...truncated]"));
        assert!(output.ends_with("END"));
        assert!(output.len() < MAX_OUTPUT_BYTES + 32);
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        let text = "é".repeat(10);
        let cut = truncate_tail(&text, 5);
        assert!(cut.ends_with('é'));
    }

    #[test]
    fn failure_detection() {
        assert!(ActionLogEntry::new("t", LogAction::Error).is_failure());
        assert!(ActionLogEntry::new("t", LogAction::Run)
            .with_exit_code(Some(2))
            .is_failure());
        assert!(!ActionLogEntry::new("t", LogAction::Run)
            .with_exit_code(Some(0))
            .is_failure());
    }
}
