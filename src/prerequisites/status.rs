//! Prerequisite check results.

use crate::catalog::Prerequisite;

/// The result of checking one prerequisite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrerequisiteCheck {
    /// Whether the prerequisite is ready to use.
    pub available: bool,
    /// What is wrong and how to fix it, when unavailable.
    pub error: Option<String>,
}

impl PrerequisiteCheck {
    pub fn available() -> Self {
        Self {
            available: true,
            error: None,
        }
    }

    pub fn unavailable(error: impl Into<String>) -> Self {
        Self {
            available: false,
            error: Some(error.into()),
        }
    }
}

/// A prerequisite that failed its check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingPrerequisite {
    pub prerequisite: Prerequisite,
    pub error: String,
}

impl std::fmt::Display for MissingPrerequisite {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.prerequisite.name, self.error)
    }
}

/// Aggregate of checking several prerequisites.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrerequisiteReport {
    pub all_available: bool,
    /// Failed prerequisites, in the order they were given.
    pub missing: Vec<MissingPrerequisite>,
}

impl PrerequisiteReport {
    /// Build a report from checks paired with their prerequisites.
    pub fn from_checks(checks: impl IntoIterator<Item = (Prerequisite, PrerequisiteCheck)>) -> Self {
        let missing: Vec<MissingPrerequisite> = checks
            .into_iter()
            .filter(|(_, check)| !check.available)
            .map(|(prerequisite, check)| MissingPrerequisite {
                error: check
                    .error
                    .unwrap_or_else(|| prerequisite.remediation.clone()),
                prerequisite,
            })
            .collect();

        Self {
            all_available: missing.is_empty(),
            missing,
        }
    }

    /// Names of the missing prerequisites.
    pub fn missing_names(&self) -> Vec<&str> {
        self.missing
            .iter()
            .map(|m| m.prerequisite.name.as_str())
            .collect()
    }
}
