//! List command implementation.
//!
//! The `toolwarden list` command shows every tool in the active catalog,
//! optionally with a live usability verdict.

use crate::cli::args::ListArgs;
use crate::error::Result;
use crate::shell::CommandRunner;
use crate::toolbox::Toolbox;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};
use super::display::usability_label;

/// The list command implementation.
pub struct ListCommand<'a, R: CommandRunner> {
    toolbox: &'a Toolbox<R>,
    args: ListArgs,
}

impl<'a, R: CommandRunner> ListCommand<'a, R> {
    /// Create a new list command.
    pub fn new(toolbox: &'a Toolbox<R>, args: ListArgs) -> Self {
        Self { toolbox, args }
    }
}

impl<R: CommandRunner> Command for ListCommand<'_, R> {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        let tools = self.toolbox.list_tools();
        if tools.is_empty() {
            ui.warning("The catalog has no tools");
            return Ok(CommandResult::success());
        }

        let theme = ui.theme().clone();
        ui.show_header("Tools");

        let width = tools.iter().map(|t| t.id.len()).max().unwrap_or(0);
        for tool in tools {
            let mut line = format!(
                "  {}  {}",
                theme.tool.apply_to(format!("{:<width$}", tool.id)),
                tool.name
            );
            line.push_str(&format!(" {}", theme.dim.apply_to(format!("[{}]", tool.category))));

            if self.args.status {
                let label = match self.toolbox.is_usable(&tool.id) {
                    Ok(usability) => theme
                        .verdict(&usability)
                        .apply_to(usability_label(&usability))
                        .to_string(),
                    Err(e) => {
                        tracing::warn!("detection failed for {}: {}", tool.id, e);
                        "unknown".to_string()
                    }
                };
                line.push_str(&format!(" - {}", label));
            }
            ui.message(&line);

            if let Some(description) = tool.description.as_deref() {
                if ui.output_mode().shows_status() {
                    ui.message(&format!("  {:<width$}  {}", "", theme.dim.apply_to(description)));
                }
            }
        }

        Ok(CommandResult::success())
    }
}
