//! Shared display helpers for tool status and log entries.
//!
//! Used by `check`, `run`, `list` and `logs` so verdicts and remediation
//! hints read the same everywhere.

use crate::detection::Usability;
use crate::logs::ActionLogEntry;
use crate::ui::UserInterface;

/// Short label for a usability verdict.
pub fn usability_label(usability: &Usability) -> &'static str {
    match usability {
        Usability::Usable => "ready",
        Usability::PrerequisitesMissing { .. } => "blocked",
        Usability::NotInstalled => "not installed",
    }
}

/// Print a verdict line, followed by what to do about it.
pub fn show_usability(ui: &mut dyn UserInterface, tool_id: &str, name: &str, usability: &Usability) {
    match usability {
        Usability::Usable => ui.success(&format!("{} is ready", name)),
        Usability::NotInstalled => {
            ui.error(&format!("{} is not installed", name));
            ui.hint(&format!("Run `toolwarden install {}`", tool_id));
        }
        Usability::PrerequisitesMissing { missing } => {
            ui.warning(&format!(
                "{} is installed but blocked by missing prerequisites",
                name
            ));
            for item in missing {
                ui.message(&format!("  - {}", item.prerequisite.name));
                ui.hint(&item.error);
            }
        }
    }
}

/// Print one action log entry.
pub fn show_log_entry(ui: &mut dyn UserInterface, entry: &ActionLogEntry, with_output: bool) {
    let theme = ui.theme().clone();
    let stamp = entry.timestamp.format("%Y-%m-%d %H:%M:%S");
    let exit = entry
        .exit_code
        .map(|code| format!(" (exit {})", code))
        .unwrap_or_default();
    let mut line = format!("{} {:<7}{}", theme.dim.apply_to(stamp), entry.action.to_string(), exit);
    if let Some(command) = &entry.command {
        line.push_str(&format!(" {}", theme.command.apply_to(command)));
    }

    if entry.is_failure() {
        ui.error(&line);
    } else {
        ui.message(&line);
    }

    if let Some(error) = &entry.error {
        ui.message(&format!("    {}", error));
    }
    if with_output {
        if let Some(output) = &entry.output {
            for line in output.lines() {
                ui.message(&format!("    {}", theme.dim.apply_to(line)));
            }
        }
    }
}
