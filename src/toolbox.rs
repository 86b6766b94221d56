//! The caller-facing API.
//!
//! A [`Toolbox`] owns the catalog, the project's state store and action
//! logger, and the command runner, and wires them into the detection engine
//! and installer for each call.
//!
//! ```no_run
//! use toolwarden::{Toolbox, Usability};
//!
//! let toolbox = Toolbox::open(std::path::Path::new("."), None)?;
//! if toolbox.is_usable("semgrep")? != Usability::Usable {
//!     let outcome = toolbox.install("semgrep")?;
//!     println!("installed: {}", outcome.success);
//! }
//! # Ok::<(), toolwarden::ToolwardenError>(())
//! ```

use std::path::{Path, PathBuf};

use crate::catalog::{extract_display_values, CommandLine, DisplayValue, ToolCatalog, ToolDefinition};
use crate::config::{load_settings, Settings};
use crate::detection::{DetectionEngine, DetectionReport, FalsePositiveOutcome, Usability};
use crate::error::{Result, ToolwardenError};
use crate::installer::{report, InstallOutcome, Installer};
use crate::logs::{ActionLogEntry, ActionLogger, LogAction, LogSummary};
use crate::prerequisites::{PrerequisiteChecker, PrerequisiteReport};
use crate::sandbox::IsolatedExecutor;
use crate::shell::{CommandRunner, ExecOutput, ExecRequest};
use crate::state::{ProjectRoot, StateStore, ToolStatus};

/// Placeholder in run commands replaced by the project directory.
pub const PROJECT_PLACEHOLDER: &str = "{project}";

/// Result of [`Toolbox::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The tool ran and exited successfully.
    Completed {
        command: String,
        output: ExecOutput,
        /// Display fields found in the output.
        display: Vec<DisplayValue>,
    },
    /// The tool could not be started or exited with an error.
    Failed {
        command: Option<String>,
        error: String,
        /// Present when the failure triggered false-positive correction.
        correction: Option<FalsePositiveOutcome>,
    },
    /// The tool is not usable, so nothing ran.
    Blocked { usability: Usability },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Completed { .. })
    }
}

/// Entry point tying the lifecycle components together.
pub struct Toolbox<R: CommandRunner = IsolatedExecutor> {
    root: Option<ProjectRoot>,
    work_dir: PathBuf,
    settings: Settings,
    catalog: ToolCatalog,
    state: StateStore,
    logger: ActionLogger,
    runner: R,
}

impl Toolbox<IsolatedExecutor> {
    /// Open the toolbox for the project containing `start`.
    ///
    /// `catalog` replaces both the configured and the built-in catalog.
    /// Without a project root, state and logs are not persisted.
    pub fn open(start: &Path, catalog: Option<&Path>) -> Result<Self> {
        let root = ProjectRoot::discover(start);
        match &root {
            Some(root) => tracing::debug!("project root: {}", root.path().display()),
            None => tracing::debug!("no project root above {}; state is not persisted", start.display()),
        }

        let settings = load_settings(root.as_ref())?;
        let catalog = match catalog
            .map(Path::to_path_buf)
            .or_else(|| settings.catalog_path(root.as_ref().map(ProjectRoot::path)))
        {
            Some(path) => ToolCatalog::from_file(&path)?,
            None => ToolCatalog::builtin()?,
        };

        let runner = IsolatedExecutor::new().with_default_timeout(settings.command_timeout());
        Ok(Self::with_runner(root, start, settings, catalog, runner))
    }

    /// Remove the sandbox directory. Safe to call more than once.
    pub fn cleanup(&self) {
        self.runner.cleanup();
    }
}

impl<R: CommandRunner> Toolbox<R> {
    /// Assemble a toolbox from parts.
    pub fn with_runner(
        root: Option<ProjectRoot>,
        work_dir: &Path,
        settings: Settings,
        catalog: ToolCatalog,
        runner: R,
    ) -> Self {
        Self {
            state: StateStore::for_project(root.as_ref()),
            logger: ActionLogger::for_project(root.as_ref()),
            work_dir: root
                .as_ref()
                .map(|r| r.path().to_path_buf())
                .unwrap_or_else(|| work_dir.to_path_buf()),
            root,
            settings,
            catalog,
            runner,
        }
    }

    pub fn project_root(&self) -> Option<&ProjectRoot> {
        self.root.as_ref()
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &StateStore {
        &self.state
    }

    pub fn logger(&self) -> &ActionLogger {
        &self.logger
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    pub fn list_tools(&self) -> &[ToolDefinition] {
        self.catalog.list_tools()
    }

    pub fn get_tool(&self, tool_id: &str) -> Result<&ToolDefinition> {
        self.catalog.get_tool(tool_id)
    }

    /// Re-read the catalog from its source.
    pub fn reload(&mut self) -> Result<()> {
        self.catalog.reload()
    }

    fn engine(&self) -> DetectionEngine<'_> {
        DetectionEngine::new(&self.catalog, &self.state, &self.runner)
            .with_project_root(self.root.as_ref().map(ProjectRoot::path))
            .with_probe_timeout(self.settings.probe_timeout())
    }

    pub fn is_usable(&self, tool_id: &str) -> Result<Usability> {
        self.engine().is_usable(tool_id)
    }

    pub fn inspect(&self, tool_id: &str) -> Result<DetectionReport> {
        self.engine().inspect(tool_id)
    }

    /// Check a tool's prerequisites regardless of whether it is installed.
    pub fn check_prerequisites(&self, tool_id: &str) -> Result<PrerequisiteReport> {
        let tool = self.catalog.get_tool(tool_id)?;
        Ok(PrerequisiteChecker::new(&self.runner)
            .with_timeout(self.settings.probe_timeout())
            .check_all(&tool.prerequisites))
    }

    pub fn install(&self, tool_id: &str) -> Result<InstallOutcome> {
        Installer::new(&self.catalog, &self.state, &self.logger, &self.runner)
            .with_project_root(self.root.as_ref().map(ProjectRoot::path))
            .with_timeout(self.settings.command_timeout())
            .with_probe_timeout(self.settings.probe_timeout())
            .install(tool_id)
    }

    /// Run an arbitrary command through the runner.
    pub fn execute(&self, request: &ExecRequest) -> Result<ExecOutput> {
        self.runner.run(request)
    }

    pub fn flag_false_positive(&self, tool_id: &str, error: &str) -> Result<FalsePositiveOutcome> {
        self.engine().flag_false_positive(tool_id, error)
    }

    /// Run a tool with `extra_args` appended to its run command.
    ///
    /// The tool must be usable. A custom command takes precedence over the
    /// catalog's run command. On success any earlier detection failure is
    /// cleared; on failure the error is recorded and the detection engine
    /// corrects a possible false positive.
    pub fn run(&self, tool_id: &str, extra_args: &[String]) -> Result<RunOutcome> {
        let tool = self.catalog.get_tool(tool_id)?;

        let usability = self.is_usable(&tool.id)?;
        if !usability.is_usable() {
            return Ok(RunOutcome::Blocked { usability });
        }

        let Some(request) = self.run_request(tool, extra_args)? else {
            let error = format!(
                "{} has no run command. Set one with `toolwarden override {} <command>`.",
                tool.name, tool.id
            );
            self.log(ActionLogEntry::new(&tool.id, LogAction::Error).with_error(error.clone()));
            return Ok(RunOutcome::Failed {
                command: None,
                error,
                correction: None,
            });
        };
        let command = request.display();
        tracing::debug!("running {}: {}", tool.id, command);

        let (output, error) = match self.runner.run(&request) {
            Ok(output) if output.success() => (Some(output), None),
            Ok(output) => {
                let error = output.error_text();
                (Some(output), Some(error))
            }
            Err(e) => (None, Some(e.to_string())),
        };

        let Some(error) = error else {
            let output = output.unwrap_or_default();
            self.log(
                ActionLogEntry::new(&tool.id, LogAction::Run)
                    .with_command(&command)
                    .with_output(output.combined())
                    .with_exit_code(output.exit_code),
            );
            report("clear detection failure", self.state.clear_detection_failed(&tool.id));
            report("clear last error", self.state.clear_error(&tool.id));
            return Ok(RunOutcome::Completed {
                display: extract_display_values(&tool.display, &output.stdout),
                command,
                output,
            });
        };

        let failure = ToolwardenError::RunFailed {
            tool: tool.id.clone(),
            message: error.clone(),
        };
        tracing::info!("{}", failure);

        let entry = match &output {
            Some(output) => ActionLogEntry::new(&tool.id, LogAction::Run)
                .with_output(output.combined())
                .with_exit_code(output.exit_code),
            None => ActionLogEntry::new(&tool.id, LogAction::Error),
        };
        self.log(entry.with_command(&command).with_error(error.clone()));
        report("record error", self.state.record_error(&tool.id, &error));

        let correction = match self.flag_false_positive(&tool.id, &error) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::warn!("failed to flag detection failure for {}: {}", tool.id, e);
                None
            }
        };

        Ok(RunOutcome::Failed {
            command: Some(command),
            error,
            correction,
        })
    }

    /// Build the run request, or `None` when the tool has no run command.
    fn run_request(&self, tool: &ToolDefinition, extra_args: &[String]) -> Result<Option<ExecRequest>> {
        let custom = self.state.custom_command(&tool.id).unwrap_or_else(|e| {
            tracing::warn!("could not read custom command for {}: {}", tool.id, e);
            None
        });
        let Some(command) = custom.or_else(|| tool.run.clone()) else {
            return Ok(None);
        };

        let project = self.work_dir.to_string_lossy();
        let argv: Vec<String> = command
            .argv()
            .into_iter()
            .chain(extra_args.iter().cloned())
            .map(|arg| arg.replace(PROJECT_PLACEHOLDER, &project))
            .collect();

        Ok(ExecRequest::from_argv(&argv)
            .map(|request| request.timeout(self.settings.command_timeout())))
    }

    pub fn tool_status(&self, tool_id: &str) -> Result<ToolStatus> {
        let tool = self.catalog.get_tool(tool_id)?;
        self.state.tool_status(&tool.id)
    }

    /// Set a custom command. The tool counts as installed afterwards.
    pub fn set_custom_command(&self, tool_id: &str, command: CommandLine) -> Result<()> {
        let tool = self.catalog.get_tool(tool_id)?;
        if command.is_empty() {
            return Err(anyhow::anyhow!("custom command for {} is empty", tool.id).into());
        }
        self.state.set_custom_command(&tool.id, command)
    }

    pub fn clear_custom_command(&self, tool_id: &str) -> Result<()> {
        let tool = self.catalog.get_tool(tool_id)?;
        self.state.clear_custom_command(&tool.id)
    }

    pub fn log_summary(&self, tool_id: &str) -> Result<LogSummary> {
        let tool = self.catalog.get_tool(tool_id)?;
        Ok(self.logger.summary(&tool.id)?)
    }

    pub fn recent_logs(&self, tool_id: &str, limit: usize) -> Result<Vec<ActionLogEntry>> {
        let tool = self.catalog.get_tool(tool_id)?;
        Ok(self.logger.recent(&tool.id, limit)?)
    }

    pub fn clear_logs(&self, tool_id: &str) -> Result<()> {
        let tool = self.catalog.get_tool(tool_id)?;
        Ok(self.logger.clear(&tool.id)?)
    }

    fn log(&self, entry: ActionLogEntry) {
        report("append action log", self.logger.append(&entry));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shell::ScriptedRunner;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
tools:
  - id: scanner
    name: Scanner
    install:
      method: package-manager
      manager: pip
      package: scanner
    detection:
      - command: scanner --version
    display:
      - key: summary.issues
        label: Issues
    run: scanner --json {project}
  - id: silent
    name: Silent
    install:
      method: manual
      instructions: none
    detection:
      - command: silent --version
"#;

    fn toolbox(temp: &TempDir) -> Toolbox<ScriptedRunner> {
        Toolbox::with_runner(
            Some(ProjectRoot::new(temp.path())),
            temp.path(),
            Settings::default(),
            ToolCatalog::from_yaml_str(CATALOG).unwrap(),
            ScriptedRunner::new(),
        )
    }

    #[test]
    fn run_substitutes_project_and_extracts_display() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.runner().succeed("scanner --version", "1.0.0");
        tb.runner()
            .succeed("scanner --json", r#"{"summary": {"issues": 3}}"#);

        let outcome = tb.run("scanner", &["--verbose".to_string()]).unwrap();

        match outcome {
            RunOutcome::Completed {
                command, display, ..
            } => {
                assert_eq!(
                    command,
                    format!("scanner --json {} --verbose", temp.path().display())
                );
                assert_eq!(display[0].label, "Issues");
                assert_eq!(display[0].value, "3");
            }
            other => panic!("expected Completed, got {other:?}"),
        }
        assert_eq!(tb.recent_logs("scanner", 5).unwrap()[0].action, LogAction::Run);
    }

    #[test]
    fn run_blocked_when_not_installed() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);

        let outcome = tb.run("scanner", &[]).unwrap();
        assert_eq!(
            outcome,
            RunOutcome::Blocked {
                usability: Usability::NotInstalled
            }
        );
        assert_eq!(tb.runner().call_count("scanner --json"), 0);
    }

    #[test]
    fn run_prefers_custom_command() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.set_custom_command("scanner", CommandLine::from("python3 -m scanner"))
            .unwrap();
        tb.runner().succeed("python3 -m scanner", "{}");

        assert!(tb.run("scanner", &[]).unwrap().is_success());
        assert_eq!(tb.runner().call_count("python3 -m scanner"), 1);
    }

    #[test]
    fn failed_run_records_and_flags() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.state().mark_installed("scanner").unwrap();
        tb.runner().spawn_error("scanner --json");

        let outcome = tb.run("scanner", &[]).unwrap();

        match outcome {
            RunOutcome::Failed { correction, .. } => {
                assert!(correction.unwrap().installation_cleared);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
        let status = tb.tool_status("scanner").unwrap();
        assert!(!status.is_installed());
        assert!(status.is_detection_failed());
        assert!(status.last_error().is_some());
        assert_eq!(tb.log_summary("scanner").unwrap().errors, 1);
    }

    #[test]
    fn runtime_failure_keeps_installation() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.state().mark_installed("scanner").unwrap();
        tb.runner().fail("scanner --json", 2, "error: invalid rule file");

        tb.run("scanner", &[]).unwrap();

        let status = tb.tool_status("scanner").unwrap();
        assert!(status.is_installed());
        assert!(status.is_detection_failed());
    }

    #[test]
    fn successful_run_clears_detection_failure() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.runner().succeed("scanner", "1.0.0");
        tb.state().flag_detection_failed("scanner").unwrap();
        tb.state().record_error("scanner", "old").unwrap();

        assert!(tb.run("scanner", &[]).unwrap().is_success());

        let status = tb.tool_status("scanner").unwrap();
        assert!(!status.is_detection_failed());
        assert!(status.last_error().is_none());
    }

    #[test]
    fn missing_run_command() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.runner().succeed("silent --version", "1.0.0");

        match tb.run("silent", &[]).unwrap() {
            RunOutcome::Failed {
                command,
                error,
                correction,
            } => {
                assert!(command.is_none());
                assert!(error.contains("toolwarden override silent"));
                assert!(correction.is_none());
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[test]
    fn unknown_tool_errors_everywhere() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);

        assert!(tb.run("nope", &[]).is_err());
        assert!(tb.log_summary("nope").is_err());
        assert!(tb.clear_logs("nope").is_err());
        assert!(tb.set_custom_command("nope", CommandLine::from("x")).is_err());
    }

    #[test]
    fn empty_custom_command_rejected() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        assert!(tb
            .set_custom_command("scanner", CommandLine::from("  "))
            .is_err());
    }

    #[test]
    fn open_uses_configured_catalog() {
        let temp = TempDir::new().unwrap();
        let data = temp.path().join(".toolwarden");
        std::fs::create_dir_all(&data).unwrap();
        std::fs::write(temp.path().join("tools.yml"), CATALOG).unwrap();
        std::fs::write(data.join("config.yml"), "catalog: tools.yml\n").unwrap();

        let tb = Toolbox::open(temp.path(), None).unwrap();
        assert_eq!(tb.catalog().ids(), vec!["scanner", "silent"]);
        assert_eq!(tb.project_root().unwrap().path(), temp.path());
        tb.cleanup();
    }
}
