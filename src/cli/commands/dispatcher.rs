//! Command dispatching.
//!
//! This module provides the core command infrastructure:
//! - [`Command`] trait for implementing commands
//! - [`CommandResult`] for uniform result reporting
//! - [`CommandDispatcher`] for routing CLI subcommands

use std::path::{Path, PathBuf};

use crate::cli::args::{Cli, Commands};
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::toolbox::Toolbox;
use crate::ui::UserInterface;

/// Trait for command implementations.
///
/// Each CLI subcommand implements this trait to provide its execution logic.
pub trait Command {
    /// Execute the command.
    ///
    /// # Arguments
    ///
    /// * `ui` - User interface for displaying output
    ///
    /// # Returns
    ///
    /// A [`CommandResult`] indicating success/failure and exit code.
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult>;
}

/// Result of command execution.
#[derive(Debug)]
pub struct CommandResult {
    /// Whether the command succeeded.
    pub success: bool,

    /// Exit code to use (0 for success, non-zero for failure).
    pub exit_code: i32,
}

impl CommandResult {
    /// Create a successful result.
    pub fn success() -> Self {
        Self {
            success: true,
            exit_code: 0,
        }
    }

    /// Create a failure result.
    pub fn failure(exit_code: i32) -> Self {
        Self {
            success: false,
            exit_code,
        }
    }
}

/// Dispatches CLI commands to their implementations.
pub struct CommandDispatcher {
    project_dir: PathBuf,
    catalog: Option<PathBuf>,
}

impl CommandDispatcher {
    /// Create a new dispatcher starting project discovery at `project_dir`.
    pub fn new(project_dir: PathBuf) -> Self {
        Self {
            project_dir,
            catalog: None,
        }
    }

    /// Use this catalog file instead of the configured or built-in one.
    pub fn with_catalog(mut self, catalog: Option<PathBuf>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Get the directory project discovery starts from.
    pub fn project_dir(&self) -> &Path {
        &self.project_dir
    }

    /// Dispatch and execute a command.
    ///
    /// Commands that need no catalog run without opening the toolbox. The
    /// sandbox is removed once the command finishes.
    pub fn dispatch(&self, cli: &Cli, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        match &cli.command {
            Commands::Schema(args) => super::schema::SchemaCommand::new(args.clone()).execute(ui),
            Commands::Completions(args) => {
                super::completions::CompletionsCommand::new(args.clone()).execute(ui)
            }
            command => {
                let toolbox = Toolbox::open(&self.project_dir, self.catalog.as_deref())?;
                let result = dispatch_with(&toolbox, command, ui);
                toolbox.cleanup();
                result
            }
        }
    }
}

/// Run a subcommand against an already opened toolbox.
pub fn dispatch_with<R: CommandRunner>(
    toolbox: &Toolbox<R>,
    command: &Commands,
    ui: &mut dyn UserInterface,
) -> Result<CommandResult> {
    match command {
        Commands::List(args) => super::list::ListCommand::new(toolbox, args.clone()).execute(ui),
        Commands::Check(args) => super::check::CheckCommand::new(toolbox, args.clone()).execute(ui),
        Commands::Install(args) => {
            super::install::InstallCommand::new(toolbox, args.clone()).execute(ui)
        }
        Commands::Run(args) => super::run::RunCommand::new(toolbox, args.clone()).execute(ui),
        Commands::Logs(args) => super::logs::LogsCommand::new(toolbox, args.clone()).execute(ui),
        Commands::Override(args) => {
            super::override_cmd::OverrideCommand::new(toolbox, args.clone()).execute(ui)
        }
        Commands::Schema(args) => super::schema::SchemaCommand::new(args.clone()).execute(ui),
        Commands::Completions(args) => {
            super::completions::CompletionsCommand::new(args.clone()).execute(ui)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::cli::args::{CheckArgs, ListArgs};
    use crate::config::Settings;
    use crate::shell::ScriptedRunner;
    use crate::ui::MockUI;

    #[test]
    fn command_result_success() {
        let result = CommandResult::success();
        assert!(result.success);
        assert_eq!(result.exit_code, 0);
    }

    #[test]
    fn command_result_failure() {
        let result = CommandResult::failure(1);
        assert!(!result.success);
        assert_eq!(result.exit_code, 1);
    }

    #[test]
    fn dispatcher_creation() {
        let dispatcher = CommandDispatcher::new(PathBuf::from("/test"));
        assert_eq!(dispatcher.project_dir(), Path::new("/test"));
    }

    #[test]
    fn routes_to_toolbox_commands() {
        let toolbox = Toolbox::with_runner(
            None,
            Path::new("."),
            Settings::default(),
            ToolCatalog::builtin().unwrap(),
            ScriptedRunner::new(),
        );
        let mut ui = MockUI::new();

        let result = dispatch_with(&toolbox, &Commands::List(ListArgs::default()), &mut ui).unwrap();
        assert!(result.success);
        assert!(ui.has_message("semgrep"));

        let result = dispatch_with(
            &toolbox,
            &Commands::Check(CheckArgs {
                tool: "semgrep".to_string(),
            }),
            &mut ui,
        )
        .unwrap();
        assert_eq!(result.exit_code, 1);
    }
}
