//! Logs command implementation.
//!
//! The `toolwarden logs <tool>` command shows the most recent install and
//! run attempts for a tool, a summary of them, or clears the log.

use crate::cli::args::LogsArgs;
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::toolbox::Toolbox;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::show_log_entry;

/// The logs command implementation.
pub struct LogsCommand<'a, R: CommandRunner> {
    toolbox: &'a Toolbox<R>,
    args: LogsArgs,
}

impl<'a, R: CommandRunner> LogsCommand<'a, R> {
    /// Create a new logs command.
    pub fn new(toolbox: &'a Toolbox<R>, args: LogsArgs) -> Self {
        Self { toolbox, args }
    }

    fn show_summary(&self, ui: &mut dyn UserInterface, tool_id: &str) -> Result<()> {
        let summary = self.toolbox.log_summary(tool_id)?;
        let theme = ui.theme().clone();

        ui.message(&theme.format_key_value("Entries", &summary.total.to_string(), 10));
        ui.message(&theme.format_key_value("Installs", &summary.installs.to_string(), 10));
        ui.message(&theme.format_key_value("Runs", &summary.runs.to_string(), 10));
        ui.message(&theme.format_key_value("Errors", &summary.errors.to_string(), 10));
        if let Some(last) = &summary.last {
            let when = last.timestamp.format("%Y-%m-%d %H:%M:%S").to_string();
            ui.message(&theme.format_key_value("Last", &format!("{} ({})", when, last.action), 10));
        }
        if let Some(failure) = &summary.last_failure {
            if let Some(error) = &failure.error {
                ui.message(&theme.format_key_value("Last error", error, 10));
            }
        }
        Ok(())
    }
}

impl<R: CommandRunner> Command for LogsCommand<'_, R> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tool = self.toolbox.get_tool(&self.args.tool)?;

        if self.toolbox.logger().log_path(&tool.id).is_none() {
            ui.warning("No project directory found; action logs are not kept");
            return Ok(CommandResult::success());
        }

        if self.args.clear {
            self.toolbox.clear_logs(&tool.id)?;
            ui.success(&format!("Cleared the log for {}", tool.name));
            return Ok(CommandResult::success());
        }

        ui.show_header(&format!("{} log", tool.name));

        if self.args.summary {
            self.show_summary(ui, &tool.id)?;
            return Ok(CommandResult::success());
        }

        let limit = self
            .args
            .limit
            .unwrap_or(self.toolbox.settings().log_tail);
        let entries = self.toolbox.recent_logs(&tool.id, limit)?;
        if entries.is_empty() {
            ui.message(&format!("No log entries for {}", tool.name));
            return Ok(CommandResult::success());
        }

        let with_output = ui.output_mode().shows_command_output();
        for entry in &entries {
            show_log_entry(ui, entry, with_output);
        }

        Ok(CommandResult::success())
    }
}
