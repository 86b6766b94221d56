//! Console output for the `toolwarden` commands.
//!
//! Commands only talk to [`UserInterface`]; the binary hands them a
//! [`TerminalUI`] and command tests a [`MockUI`].

pub mod mock;
pub mod output;
pub mod spinner;
pub mod terminal;
pub mod theme;

pub use mock::{MockSpinner, MockUI};
pub use output::OutputMode;
pub use spinner::ProgressSpinner;
pub use terminal::{create_ui, TerminalUI};
pub use theme::{should_use_colors, Theme};

/// Where commands report verdicts, install progress and log entries.
pub trait UserInterface {
    fn output_mode(&self) -> OutputMode;

    fn theme(&self) -> &Theme;

    /// Print a line. Shown even with `--quiet`, so results go here.
    fn message(&mut self, msg: &str);

    fn success(&mut self, msg: &str);

    fn warning(&mut self, msg: &str);

    fn error(&mut self, msg: &str);

    /// Follow-up advice, such as the install command for a missing tool.
    fn hint(&mut self, hint: &str);

    fn show_header(&mut self, title: &str);

    /// Start a spinner for an install or a tool run.
    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle>;
}

/// A running spinner. Finish it with the outcome of the operation.
pub trait SpinnerHandle {
    fn set_message(&mut self, msg: &str);

    fn finish_success(&mut self, msg: &str);

    fn finish_error(&mut self, msg: &str);

    fn finish_skipped(&mut self, msg: &str);
}
