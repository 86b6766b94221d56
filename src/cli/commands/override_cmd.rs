//! Override command implementation.
//!
//! The `toolwarden override <tool> <command...>` command stores a custom
//! command used instead of the catalog's run command. Setting one also
//! marks the tool installed, since the user has vouched for it.

use crate::catalog::CommandLine;
use crate::cli::args::OverrideArgs;
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::toolbox::Toolbox;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The override command implementation.
pub struct OverrideCommand<'a, R: CommandRunner> {
    toolbox: &'a Toolbox<R>,
    args: OverrideArgs,
}

impl<'a, R: CommandRunner> OverrideCommand<'a, R> {
    /// Create a new override command.
    pub fn new(toolbox: &'a Toolbox<R>, args: OverrideArgs) -> Self {
        Self { toolbox, args }
    }

    /// A single argument is a command line; several are an argv.
    fn command_line(&self) -> CommandLine {
        match self.args.command.as_slice() {
            [line] => CommandLine::Line(line.clone()),
            argv => CommandLine::Argv(argv.to_vec()),
        }
    }
}

impl<R: CommandRunner> Command for OverrideCommand<'_, R> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tool = self.toolbox.get_tool(&self.args.tool)?;

        if self.args.clear {
            self.toolbox.clear_custom_command(&tool.id)?;
            ui.success(&format!("{} uses its catalog command again", tool.name));
            return Ok(CommandResult::success());
        }

        let command = self.command_line();
        let shown = command.to_string();
        self.toolbox.set_custom_command(&tool.id, command)?;
        ui.success(&format!("{} will run with: {}", tool.name, shown));
        Ok(CommandResult::success())
    }
}
