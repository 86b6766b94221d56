//! Check command implementation.
//!
//! The `toolwarden check <tool>` command runs detection for one tool and
//! explains the verdict. Exits non-zero unless the tool is usable.

use crate::cli::args::CheckArgs;
use crate::detection::DetectionSource;
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::toolbox::Toolbox;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::show_usability;

const KEY_WIDTH: usize = 14;

/// The check command implementation.
pub struct CheckCommand<'a, R: CommandRunner> {
    toolbox: &'a Toolbox<R>,
    args: CheckArgs,
}

impl<'a, R: CommandRunner> CheckCommand<'a, R> {
    /// Create a new check command.
    pub fn new(toolbox: &'a Toolbox<R>, args: CheckArgs) -> Self {
        Self { toolbox, args }
    }
}

impl<R: CommandRunner> Command for CheckCommand<'_, R> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tool = self.toolbox.get_tool(&self.args.tool)?;
        let report = self.toolbox.inspect(&tool.id)?;
        let status = self.toolbox.tool_status(&tool.id)?;
        let theme = ui.theme().clone();

        ui.show_header(&tool.name);

        if ui.output_mode().shows_status() {
            let source = match report.source {
                DetectionSource::Live => "live probe",
                DetectionSource::StoredFlag => "recorded install",
                DetectionSource::None => "none",
            };
            ui.message(&theme.format_key_value("Detected by", source, KEY_WIDTH));
            if let Some(version) = &report.version {
                ui.message(&theme.format_key_value("Version", version, KEY_WIDTH));
            }
            if !report.missing_packages.is_empty() {
                ui.message(&theme.format_key_value(
                    "Missing",
                    &report.missing_packages.join(", "),
                    KEY_WIDTH,
                ));
            }
            if let Some(command) = status.custom_command() {
                ui.message(&theme.format_key_value("Command", &command.to_string(), KEY_WIDTH));
            }
            if let Some(error) = status.last_error() {
                ui.message(&theme.format_key_value("Last error", &error.message, KEY_WIDTH));
            }
            if status.is_detection_failed() {
                ui.message(&theme.format_key_value(
                    "Flagged",
                    "a previous run suggested detection was wrong",
                    KEY_WIDTH,
                ));
            }
            if ui.output_mode().shows_command_output() {
                if let Some(failure) = &report.live_failure {
                    ui.message(&theme.format_key_value("Probe", failure, KEY_WIDTH));
                }
            }
            ui.message("");
        }

        show_usability(ui, &tool.id, &tool.name, &report.usability);

        if report.usability.is_usable() {
            Ok(CommandResult::success())
        } else {
            Ok(CommandResult::failure(1))
        }
    }
}
