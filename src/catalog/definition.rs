//! Tool definition types.
//!
//! These mirror the catalog document format one-to-one and are immutable
//! once loaded.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::package_manager::PackageManager;
use crate::shell::ExecRequest;

/// A command given either as one whitespace-separated string or as argv.
///
/// ```
/// use toolwarden::catalog::CommandLine;
///
/// let line: CommandLine = serde_yaml::from_str("docker info").unwrap();
/// assert_eq!(line.argv(), vec!["docker", "info"]);
///
/// let argv: CommandLine = serde_yaml::from_str("[node, -e, 'console.log(1)']").unwrap();
/// assert_eq!(argv.argv().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum CommandLine {
    /// A command line split on whitespace.
    Line(String),
    /// An explicit argument vector.
    Argv(Vec<String>),
}

impl CommandLine {
    /// The command as an argument vector.
    pub fn argv(&self) -> Vec<String> {
        match self {
            CommandLine::Line(line) => line.split_whitespace().map(String::from).collect(),
            CommandLine::Argv(argv) => argv.clone(),
        }
    }

    /// Whether there is no program to run.
    pub fn is_empty(&self) -> bool {
        self.argv().first().is_none_or(|p| p.trim().is_empty())
    }

    /// Build an [`ExecRequest`]. Returns `None` when the command is empty.
    pub fn to_request(&self) -> Option<ExecRequest> {
        ExecRequest::from_argv(&self.argv())
    }
}

impl std::fmt::Display for CommandLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CommandLine::Line(line) => write!(f, "{}", line.trim()),
            CommandLine::Argv(argv) => write!(f, "{}", argv.join(" ")),
        }
    }
}

impl From<&str> for CommandLine {
    fn from(line: &str) -> Self {
        CommandLine::Line(line.to_string())
    }
}

/// Whether a tool ships with the host or is installed separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum ToolCategory {
    /// Bundled with the host application.
    BuiltIn,
    /// Installed independently by the user.
    #[default]
    External,
}

impl std::fmt::Display for ToolCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ToolCategory::BuiltIn => write!(f, "built-in"),
            ToolCategory::External => write!(f, "external"),
        }
    }
}

/// How a tool gets installed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "method", rename_all = "kebab-case")]
pub enum InstallDescriptor {
    /// Installed by a package manager.
    PackageManager {
        manager: PackageManager,
        /// Package (or space-separated packages) to install.
        package: String,
        /// Install globally rather than into the project.
        #[serde(default)]
        global: bool,
    },
    /// No automatic install; the user follows these instructions.
    Manual { instructions: String },
}

impl InstallDescriptor {
    /// Whether toolwarden can perform this install itself.
    pub fn is_automatic(&self) -> bool {
        matches!(self, InstallDescriptor::PackageManager { .. })
    }
}

fn default_true() -> bool {
    true
}

/// A command whose outcome tells whether a tool is present.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DetectionProbe {
    /// Command to run.
    pub command: CommandLine,

    /// Whether the command is expected to exit successfully.
    #[serde(default = "default_true")]
    pub expect_success: bool,

    /// Substring that must appear in the command's output.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_contains: Option<String>,

    /// Per-probe timeout overriding the configured probe timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl DetectionProbe {
    /// A probe expecting `command` to succeed.
    pub fn succeeds(command: impl Into<CommandLine>) -> Self {
        Self {
            command: command.into(),
            expect_success: true,
            output_contains: None,
            timeout_secs: None,
        }
    }
}

/// Extra validation applied to a prerequisite after its probe succeeds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum PrerequisiteKind {
    /// Probe success (and optional expected output) is enough.
    #[default]
    Generic,
    /// The CLI must be installed and its daemon must answer.
    ContainerDaemon,
    /// The probe prints a browser executable path that must exist on disk.
    BrowserRuntime,
}

/// An environment-level dependency of a tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Prerequisite {
    /// Display name (e.g. "docker").
    pub name: String,

    /// Probe command.
    pub command: CommandLine,

    /// Which extra validation applies.
    #[serde(default)]
    pub kind: PrerequisiteKind,

    /// Substring required in the probe output (generic kind).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_output: Option<String>,

    /// What the user should do when the check fails.
    pub remediation: String,

    /// Daemon status command for `container-daemon` (default `docker info`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_command: Option<CommandLine>,
}

/// A field surfaced from a tool's JSON output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct DisplayField {
    /// Dotted path into the output (e.g. `result.co2.total`).
    pub key: String,
    /// Human-readable label.
    pub label: String,
}

/// Everything toolwarden knows about one tool.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ToolDefinition {
    /// Unique id (e.g. "greenframe").
    pub id: String,

    /// Display name.
    pub name: String,

    /// One-line description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Built-in or external.
    #[serde(default)]
    pub category: ToolCategory,

    /// How to install the tool.
    pub install: InstallDescriptor,

    /// Probes that must all match for live detection to pass.
    pub detection: Vec<DetectionProbe>,

    /// Packages that must all be present (in order of installation).
    #[serde(default)]
    pub required_packages: Vec<String>,

    /// Environment dependencies checked after detection passes.
    #[serde(default)]
    pub prerequisites: Vec<Prerequisite>,

    /// Output fields to surface after a run.
    #[serde(default)]
    pub display: Vec<DisplayField>,

    /// Default command for running the tool.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run: Option<CommandLine>,
}

impl ToolDefinition {
    /// The package manager used for this tool's package queries.
    ///
    /// Manual installs fall back to npm for `required_packages`.
    pub fn package_manager(&self) -> (PackageManager, bool) {
        match &self.install {
            InstallDescriptor::PackageManager {
                manager, global, ..
            } => (*manager, *global),
            InstallDescriptor::Manual { .. } => (PackageManager::Npm, false),
        }
    }
}
