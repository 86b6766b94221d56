//! Installing catalog tools.
//!
//! Installs run through a [`CommandRunner`] (the isolated executor in
//! production). Every attempt is logged. A successful install marks the tool
//! installed right away without re-running detection. Failures writing
//! logs or state only produce warnings and never change the outcome.

use std::fmt::Display;
use std::path::Path;
use std::time::Duration;

use crate::catalog::{split_packages, InstallDescriptor, PackageManager, ToolCatalog, ToolDefinition};
use crate::detection::DetectionEngine;
use crate::error::{Result, ToolwardenError};
use crate::logs::{ActionLogEntry, ActionLogger, LogAction};
use crate::prerequisites::DEFAULT_PROBE_TIMEOUT;
use crate::shell::{CommandRunner, ExecRequest};
use crate::state::StateStore;

/// Default time allowed for an install command.
pub const DEFAULT_INSTALL_TIMEOUT: Duration = Duration::from_secs(600);

/// Result of an install attempt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InstallOutcome {
    pub success: bool,
    /// Captured error text when the install failed.
    pub error: Option<String>,
    /// The tool was already usable, so nothing ran.
    pub skipped: bool,
    /// The command that ran, if any.
    pub command: Option<String>,
}

impl InstallOutcome {
    fn skipped() -> Self {
        Self {
            success: true,
            skipped: true,
            ..Default::default()
        }
    }

    fn succeeded(command: String) -> Self {
        Self {
            success: true,
            command: Some(command),
            ..Default::default()
        }
    }

    fn failed(error: String, command: Option<String>) -> Self {
        Self {
            success: false,
            error: Some(error),
            command,
            ..Default::default()
        }
    }
}

/// Installs tools and records the outcome.
pub struct Installer<'a> {
    catalog: &'a ToolCatalog,
    state: &'a StateStore,
    logger: &'a ActionLogger,
    runner: &'a dyn CommandRunner,
    project_root: Option<&'a Path>,
    timeout: Duration,
    probe_timeout: Duration,
}

impl<'a> Installer<'a> {
    pub fn new(
        catalog: &'a ToolCatalog,
        state: &'a StateStore,
        logger: &'a ActionLogger,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            catalog,
            state,
            logger,
            runner,
            project_root: None,
            timeout: DEFAULT_INSTALL_TIMEOUT,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Project directory used for non-global package installs.
    pub fn with_project_root(mut self, root: Option<&'a Path>) -> Self {
        self.project_root = root;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Install a tool unless it is already usable.
    ///
    /// Only an unknown tool id is an `Err`; install failures come back as an
    /// unsuccessful [`InstallOutcome`].
    pub fn install(&self, tool_id: &str) -> Result<InstallOutcome> {
        let tool = self.catalog.get_tool(tool_id)?;

        let engine = DetectionEngine::new(self.catalog, self.state, self.runner)
            .with_project_root(self.project_root)
            .with_probe_timeout(self.probe_timeout);
        if engine.is_usable(&tool.id)?.is_usable() {
            tracing::info!("{} is already usable; skipping install", tool.id);
            return Ok(InstallOutcome::skipped());
        }

        let outcome = match &tool.install {
            InstallDescriptor::Manual { instructions } => {
                let message = format!(
                    "Automatic installation is not supported for {}. {}",
                    tool.name, instructions
                );
                self.log(
                    ActionLogEntry::new(&tool.id, LogAction::Install).with_error(message.clone()),
                );
                InstallOutcome::failed(message, None)
            }
            InstallDescriptor::PackageManager {
                manager,
                package,
                global,
            } => self.install_package(tool, *manager, package, *global),
        };

        match &outcome.error {
            None => {
                tracing::info!("installed {}", tool.id);
                report("mark installed", self.state.mark_installed(&tool.id));
                report("clear last error", self.state.clear_error(&tool.id));
            }
            Some(error) => {
                tracing::info!("install of {} failed: {}", tool.id, error);
                report("record error", self.state.record_error(&tool.id, error));
            }
        }

        Ok(outcome)
    }

    fn install_package(
        &self,
        tool: &ToolDefinition,
        manager: PackageManager,
        package: &str,
        global: bool,
    ) -> InstallOutcome {
        let packages = split_packages(package);
        let mut request = manager
            .install_request(&packages, global)
            .timeout(self.timeout);
        let command = request.display();

        if !global {
            match self.project_root {
                Some(root) => request = request.cwd(root),
                None => {
                    let message = install_failed(
                        tool,
                        "a local install needs a project directory, but none was found",
                    );
                    self.log(
                        ActionLogEntry::new(&tool.id, LogAction::Install)
                            .with_command(&command)
                            .with_error(message.clone()),
                    );
                    return InstallOutcome::failed(message, Some(command));
                }
            }
        }

        self.run_install(tool, &request, command)
    }

    fn run_install(&self, tool: &ToolDefinition, request: &ExecRequest, command: String) -> InstallOutcome {
        tracing::debug!("installing {} with '{}'", tool.id, command);
        let entry = ActionLogEntry::new(&tool.id, LogAction::Install).with_command(&command);

        match self.runner.run(request) {
            Ok(output) if output.success() => {
                self.log(
                    entry
                        .with_output(output.combined())
                        .with_exit_code(output.exit_code),
                );
                InstallOutcome::succeeded(command)
            }
            Ok(output) => {
                let message = install_failed(tool, &output.error_text());
                self.log(
                    entry
                        .with_output(output.combined())
                        .with_error(message.clone())
                        .with_exit_code(output.exit_code),
                );
                InstallOutcome::failed(message, Some(command))
            }
            Err(e) => {
                let message = install_failed(tool, &e.to_string());
                self.log(entry.with_error(message.clone()));
                InstallOutcome::failed(message, Some(command))
            }
        }
    }

    fn log(&self, entry: ActionLogEntry) {
        report("append action log", self.logger.append(&entry));
    }
}

fn install_failed(tool: &ToolDefinition, message: &str) -> String {
    ToolwardenError::InstallFailed {
        tool: tool.id.clone(),
        message: message.to_string(),
    }
    .to_string()
}

/// Report a bookkeeping failure without affecting the caller's result.
pub(crate) fn report<E: Display>(what: &str, result: std::result::Result<(), E>) {
    if let Err(e) = result {
        tracing::warn!("failed to {}: {}", what, e);
    }
}
