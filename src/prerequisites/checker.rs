//! Prerequisite checker.
//!
//! Each check runs the prerequisite's probe command with a short timeout and
//! then applies the extra validation selected by its [`PrerequisiteKind`].
//! Nothing here returns an error: every failure, including a probe that
//! cannot be spawned or times out, becomes an unavailable
//! [`PrerequisiteCheck`] carrying remediation text.

use std::path::Path;
use std::thread;
use std::time::Duration;

use crate::catalog::{CommandLine, Prerequisite, PrerequisiteKind};
use crate::prerequisites::status::{PrerequisiteCheck, PrerequisiteReport};
use crate::shell::{CommandRunner, ExecOutput};

/// Timeout for probe and daemon-status commands.
pub const DEFAULT_PROBE_TIMEOUT: Duration = Duration::from_secs(5);

/// Daemon-status command used when a container-daemon prerequisite names none.
pub const DEFAULT_STATUS_COMMAND: &str = "docker info";

/// Output fragments that mean the daemon is installed but not answering.
const DAEMON_DOWN_PATTERNS: &[&str] = &[
    "cannot connect",
    "is the docker daemon running",
    "connection refused",
    "error during connect",
];

/// Checks prerequisites through a [`CommandRunner`].
pub struct PrerequisiteChecker<'r> {
    runner: &'r dyn CommandRunner,
    timeout: Duration,
}

impl<'r> PrerequisiteChecker<'r> {
    /// Create a checker using the default 5s probe timeout.
    pub fn new(runner: &'r dyn CommandRunner) -> Self {
        Self {
            runner,
            timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Override the probe timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Check one prerequisite.
    pub fn check(&self, prerequisite: &Prerequisite) -> PrerequisiteCheck {
        let output = match self.probe(&prerequisite.command) {
            Ok(output) => output,
            Err(reason) => {
                tracing::debug!("prerequisite '{}' probe failed: {}", prerequisite.name, reason);
                return PrerequisiteCheck::unavailable(prerequisite.remediation.clone());
            }
        };

        if output.timed_out {
            return PrerequisiteCheck::unavailable(format!(
                "Checking {} timed out after {}s. {}",
                prerequisite.name,
                self.timeout.as_secs(),
                prerequisite.remediation
            ));
        }
        if output.is_command_not_found() {
            return PrerequisiteCheck::unavailable(prerequisite.remediation.clone());
        }
        if !output.success() {
            return PrerequisiteCheck::unavailable(format!(
                "{} ({})",
                prerequisite.remediation,
                output.error_text()
            ));
        }

        match prerequisite.kind {
            PrerequisiteKind::Generic => check_expected_output(prerequisite, &output),
            PrerequisiteKind::ContainerDaemon => self.check_daemon(prerequisite),
            PrerequisiteKind::BrowserRuntime => check_browser_binary(prerequisite, &output),
        }
    }

    /// Check several prerequisites concurrently.
    ///
    /// `missing` keeps the order of `prerequisites`.
    pub fn check_all(&self, prerequisites: &[Prerequisite]) -> PrerequisiteReport {
        let checks: Vec<PrerequisiteCheck> = thread::scope(|scope| {
            let handles: Vec<_> = prerequisites
                .iter()
                .map(|pre| scope.spawn(move || self.check(pre)))
                .collect();

            handles
                .into_iter()
                .zip(prerequisites)
                .map(|(handle, pre)| {
                    handle.join().unwrap_or_else(|_| {
                        PrerequisiteCheck::unavailable(format!(
                            "Checking {} failed unexpectedly. {}",
                            pre.name, pre.remediation
                        ))
                    })
                })
                .collect()
        });

        PrerequisiteReport::from_checks(prerequisites.iter().cloned().zip(checks))
    }

    fn check_daemon(&self, prerequisite: &Prerequisite) -> PrerequisiteCheck {
        let default_status = CommandLine::from(DEFAULT_STATUS_COMMAND);
        let status_command = prerequisite
            .status_command
            .as_ref()
            .unwrap_or(&default_status);

        let output = match self.probe(status_command) {
            Ok(output) => output,
            Err(reason) => {
                return PrerequisiteCheck::unavailable(format!(
                    "{} ({})",
                    prerequisite.remediation, reason
                ))
            }
        };

        if output.timed_out {
            return PrerequisiteCheck::unavailable(daemon_not_running(&prerequisite.name));
        }
        if output.success() {
            return PrerequisiteCheck::available();
        }

        let text = output.combined().to_lowercase();
        if DAEMON_DOWN_PATTERNS.iter().any(|p| text.contains(p)) {
            PrerequisiteCheck::unavailable(daemon_not_running(&prerequisite.name))
        } else {
            PrerequisiteCheck::unavailable(format!(
                "{} ({})",
                prerequisite.remediation,
                output.error_text()
            ))
        }
    }

    fn probe(&self, command: &CommandLine) -> std::result::Result<ExecOutput, String> {
        let request = command
            .to_request()
            .ok_or_else(|| "empty probe command".to_string())?
            .timeout(self.timeout);
        self.runner.run(&request).map_err(|e| e.to_string())
    }
}

fn check_expected_output(prerequisite: &Prerequisite, output: &ExecOutput) -> PrerequisiteCheck {
    match &prerequisite.expected_output {
        Some(expected) if !output.combined().contains(expected.as_str()) => {
            PrerequisiteCheck::unavailable(format!(
                "{} was found but its output did not contain '{}'. {}",
                prerequisite.name, expected, prerequisite.remediation
            ))
        }
        _ => PrerequisiteCheck::available(),
    }
}

/// The probe prints the resolved browser path; the file has to be there.
fn check_browser_binary(prerequisite: &Prerequisite, output: &ExecOutput) -> PrerequisiteCheck {
    let reported = output
        .stdout
        .lines()
        .map(str::trim)
        .rfind(|line| !line.is_empty());

    match reported {
        Some(path) if Path::new(path).is_file() => PrerequisiteCheck::available(),
        Some(path) => PrerequisiteCheck::unavailable(format!(
            "{} binary not found at {}. {}",
            prerequisite.name, path, prerequisite.remediation
        )),
        None => PrerequisiteCheck::unavailable(format!(
            "Could not resolve the {} binary path. {}",
            prerequisite.name, prerequisite.remediation
        )),
    }
}

fn daemon_not_running(name: &str) -> String {
    format!(
        "{name} is installed but its daemon is not running. Start {name} (for example, open Docker Desktop) and try again."
    )
}
