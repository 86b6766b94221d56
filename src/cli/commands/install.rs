//! Install command implementation.
//!
//! The `toolwarden install <tool>` command installs a tool through its
//! package manager, or prints manual instructions when that is all the
//! catalog offers.

use crate::cli::args::InstallArgs;
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::toolbox::Toolbox;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The install command implementation.
pub struct InstallCommand<'a, R: CommandRunner> {
    toolbox: &'a Toolbox<R>,
    args: InstallArgs,
}

impl<'a, R: CommandRunner> InstallCommand<'a, R> {
    /// Create a new install command.
    pub fn new(toolbox: &'a Toolbox<R>, args: InstallArgs) -> Self {
        Self { toolbox, args }
    }
}

impl<R: CommandRunner> Command for InstallCommand<'_, R> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tool = self.toolbox.get_tool(&self.args.tool)?;

        let mut spinner = ui.start_spinner(&format!("Installing {}...", tool.name));
        let outcome = self.toolbox.install(&tool.id)?;

        if outcome.skipped {
            spinner.finish_skipped(&format!("{} is already installed", tool.name));
            return Ok(CommandResult::success());
        }

        if outcome.success {
            spinner.finish_success(&format!("Installed {}", tool.name));
            if let Some(command) = &outcome.command {
                if ui.output_mode().shows_command_output() {
                    let line = format!("  {}", ui.theme().command.apply_to(command));
                    ui.message(&line);
                }
            }
            return Ok(CommandResult::success());
        }

        spinner.finish_error(&format!("Could not install {}", tool.name));
        if let Some(error) = &outcome.error {
            ui.error(error);
        }
        ui.hint(&format!("See `toolwarden logs {}` for details", tool.id));
        Ok(CommandResult::failure(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolCatalog;
    use crate::config::Settings;
    use crate::shell::ScriptedRunner;
    use crate::state::ProjectRoot;
    use crate::ui::MockUI;
    use tempfile::TempDir;

    const CATALOG: &str = r#"
tools:
  - id: lint
    name: Lint
    install: { method: package-manager, manager: pip, package: lint-tool }
    detection:
      - command: lint --version
  - id: framer
    name: Framer
    install: { method: manual, instructions: "curl https://example.invalid/install | bash" }
    detection:
      - command: framer --version
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

    fn args(tool: &str) -> InstallArgs {
        InstallArgs {
            tool: tool.to_string(),
        }
    }

    #[test]
    fn installs_through_package_manager() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.runner().succeed("pip install", "Successfully installed lint-tool");
        let mut ui = MockUI::new();

        let result = InstallCommand::new(&tb, args("lint")).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.spinners().iter().any(|m| m.contains("Installed Lint")));
        assert!(tb.state().is_tool_marked_installed("lint").unwrap());
    }

    #[test]
    fn already_installed_is_skipped() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.runner().succeed("lint --version", "lint 2.0.0");
        let mut ui = MockUI::new();

        let result = InstallCommand::new(&tb, args("lint")).execute(&mut ui).unwrap();

        assert!(result.success);
        assert!(ui.spinners().iter().any(|m| m.contains("already installed")));
        assert_eq!(tb.runner().call_count("pip install"), 0);
    }

    #[test]
    fn manual_install_prints_instructions() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        let mut ui = MockUI::new();

        let result = InstallCommand::new(&tb, args("framer")).execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("curl https://example.invalid/install"));
        assert!(ui.has_hint("toolwarden logs framer"));
    }

    #[test]
    fn failed_install_reports_error() {
        let temp = TempDir::new().unwrap();
        let tb = toolbox(&temp);
        tb.runner().fail("pip install", 1, "ERROR: No matching distribution");
        let mut ui = MockUI::new();

        let result = InstallCommand::new(&tb, args("lint")).execute(&mut ui).unwrap();

        assert_eq!(result.exit_code, 1);
        assert!(ui.has_error("No matching distribution"));
        assert!(tb.tool_status("lint").unwrap().last_error().is_some());
    }
}
