//! Run command implementation.
//!
//! The `toolwarden run <tool> [args...]` command runs a usable tool inside
//! the sandbox and prints the display fields found in its output.

use crate::cli::args::RunArgs;
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::toolbox::{RunOutcome, Toolbox};
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::show_usability;

/// Exit code when the tool was not run because it is not usable.
pub const EXIT_BLOCKED: i32 = 2;

/// The run command implementation.
pub struct RunCommand<'a, R: CommandRunner> {
    toolbox: &'a Toolbox<R>,
    args: RunArgs,
}

impl<'a, R: CommandRunner> RunCommand<'a, R> {
    /// Create a new run command.
    pub fn new(toolbox: &'a Toolbox<R>, args: RunArgs) -> Self {
        Self { toolbox, args }
    }
}

impl<R: CommandRunner> Command for RunCommand<'_, R> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tool = self.toolbox.get_tool(&self.args.tool)?;
        let theme = ui.theme().clone();

        let mut spinner = ui.start_spinner(&format!("Running {}...", tool.name));
        let outcome = self.toolbox.run(&tool.id, &self.args.args)?;

        match outcome {
            RunOutcome::Completed {
                command,
                output,
                display,
            } => {
                spinner.finish_success(&format!("{} finished", tool.name));
                if ui.output_mode().shows_command_output() {
                    ui.message(&format!("  {}", theme.command.apply_to(&command)));
                    for line in output.stdout.lines() {
                        ui.message(line);
                    }
                }

                let width = display.iter().map(|d| d.label.len() + 1).max().unwrap_or(0);
                for value in &display {
                    ui.message(&theme.format_key_value(&value.label, &value.value, width));
                }
                Ok(CommandResult::success())
            }
            RunOutcome::Failed {
                command,
                error,
                correction,
            } => {
                spinner.finish_error(&format!("{} failed", tool.name));
                if let Some(command) = command {
                    if ui.output_mode().shows_status() {
                        ui.message(&format!("  {}", theme.command.apply_to(&command)));
                    }
                }
                ui.error(&error);

                match correction {
                    Some(c) if c.installation_cleared => {
                        ui.warning(&format!(
                            "{} appears not to be installed; it will be treated as missing",
                            tool.name
                        ));
                        ui.hint(&format!("Run `toolwarden install {}`", tool.id));
                    }
                    Some(_) => {
                        ui.hint(&format!("Run `toolwarden check {}` to re-verify", tool.id));
                    }
                    None => {}
                }
                ui.hint(&format!("See `toolwarden logs {}` for details", tool.id));
                Ok(CommandResult::failure(1))
            }
            RunOutcome::Blocked { usability } => {
                spinner.finish_skipped(&format!("{} was not run", tool.name));
                show_usability(ui, &tool.id, &tool.name, &usability);
                Ok(CommandResult::failure(EXIT_BLOCKED))
            }
        }
    }
}
