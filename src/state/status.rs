//! Per-tool persisted status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::CommandLine;

/// Optimistic installation marker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InstallationStatus {
    pub installed: bool,
    pub installed_at: DateTime<Utc>,
}

/// The most recent install or run failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LastError {
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Everything persisted about one tool.
///
/// Fields are private so that a custom command always implies an
/// installed tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolStatus {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    installation_status: Option<InstallationStatus>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_error: Option<LastError>,

    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    detection_failed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    detection_failed_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_execution_command: Option<CommandLine>,
}

impl ToolStatus {
    pub fn installation_status(&self) -> Option<&InstallationStatus> {
        self.installation_status.as_ref()
    }

    pub fn last_error(&self) -> Option<&LastError> {
        self.last_error.as_ref()
    }

    pub fn custom_command(&self) -> Option<&CommandLine> {
        self.custom_execution_command.as_ref()
    }

    pub fn detection_failed_at(&self) -> Option<DateTime<Utc>> {
        self.detection_failed_at
    }

    /// Whether the tool is believed installed.
    pub fn is_installed(&self) -> bool {
        self.installation_status.as_ref().is_some_and(|s| s.installed)
    }

    /// Whether live detection has contradicted the installed belief.
    pub fn is_detection_failed(&self) -> bool {
        self.detection_failed
    }

    /// Whether nothing is recorded.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Record a successful install. Also lifts a previous detection failure.
    pub fn mark_installed(&mut self, at: DateTime<Utc>) {
        self.installation_status = Some(InstallationStatus {
            installed: true,
            installed_at: at,
        });
        self.clear_detection_failed();
    }

    /// Drop the installation marker.
    ///
    /// Returns `false` and leaves the marker in place when a custom command
    /// is set.
    pub fn clear_installation(&mut self) -> bool {
        if self.custom_execution_command.is_some() {
            return false;
        }
        self.installation_status = None;
        true
    }

    pub fn record_error(&mut self, message: impl Into<String>, at: DateTime<Utc>) {
        self.last_error = Some(LastError {
            message: message.into(),
            timestamp: at,
        });
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn flag_detection_failed(&mut self, at: DateTime<Utc>) {
        self.detection_failed = true;
        self.detection_failed_at = Some(at);
    }

    pub fn clear_detection_failed(&mut self) {
        self.detection_failed = false;
        self.detection_failed_at = None;
    }

    /// Set a user override command. The tool counts as installed from now on,
    /// and any earlier detection failure is lifted.
    pub fn set_custom_command(&mut self, command: CommandLine, at: DateTime<Utc>) {
        self.custom_execution_command = Some(command);
        self.clear_detection_failed();
        if !self.is_installed() {
            self.installation_status = Some(InstallationStatus {
                installed: true,
                installed_at: at,
            });
        }
    }

    /// Remove the override. Installation status is left as is.
    pub fn clear_custom_command(&mut self) {
        self.custom_execution_command = None;
    }

    /// Restore the custom-command invariant on a record read from disk.
    pub(crate) fn normalize(&mut self, now: DateTime<Utc>) {
        if self.custom_execution_command.is_some() && !self.is_installed() {
            self.installation_status = Some(InstallationStatus {
                installed: true,
                installed_at: now,
            });
        }
        if !self.detection_failed {
            self.detection_failed_at = None;
        }
    }
}
