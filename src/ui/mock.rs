//! In-memory [`UserInterface`] for command tests.
//!
//! Each kind of line is kept in its own list, so a test can check that a
//! missing tool was reported as an error and its install command as a hint.
//!
//! ```
//! use toolwarden::ui::{MockUI, UserInterface};
//!
//! let mut ui = MockUI::new();
//! ui.success("Installed greenframe");
//! assert!(ui.has_success("greenframe"));
//! ```

use super::{OutputMode, SpinnerHandle, Theme, UserInterface};
use std::sync::{Arc, Mutex};

#[derive(Debug, Default)]
pub struct MockUI {
    mode: OutputMode,
    theme: Theme,
    messages: Vec<String>,
    successes: Vec<String>,
    warnings: Vec<String>,
    errors: Vec<String>,
    hints: Vec<String>,
    headers: Vec<String>,
    spinners: Arc<Mutex<Vec<String>>>,
}

impl MockUI {
    pub fn new() -> Self {
        Self {
            theme: Theme::plain(),
            ..Default::default()
        }
    }

    pub fn with_mode(mode: OutputMode) -> Self {
        Self {
            mode,
            ..Self::new()
        }
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn warnings(&self) -> &[String] {
        &self.warnings
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    pub fn hints(&self) -> &[String] {
        &self.hints
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    /// Spinner start and finish lines, in order.
    pub fn spinners(&self) -> Vec<String> {
        self.spinners
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    pub fn has_message(&self, needle: &str) -> bool {
        self.messages.iter().any(|m| m.contains(needle))
    }

    pub fn has_success(&self, needle: &str) -> bool {
        self.successes.iter().any(|m| m.contains(needle))
    }

    pub fn has_warning(&self, needle: &str) -> bool {
        self.warnings.iter().any(|m| m.contains(needle))
    }

    pub fn has_error(&self, needle: &str) -> bool {
        self.errors.iter().any(|m| m.contains(needle))
    }

    pub fn has_hint(&self, needle: &str) -> bool {
        self.hints.iter().any(|m| m.contains(needle))
    }
}

impl UserInterface for MockUI {
    fn output_mode(&self) -> OutputMode {
        self.mode
    }

    fn theme(&self) -> &Theme {
        &self.theme
    }

    fn message(&mut self, msg: &str) {
        self.messages.push(msg.to_string());
    }

    fn success(&mut self, msg: &str) {
        self.successes.push(msg.to_string());
    }

    fn warning(&mut self, msg: &str) {
        self.warnings.push(msg.to_string());
    }

    fn error(&mut self, msg: &str) {
        self.errors.push(msg.to_string());
    }

    fn hint(&mut self, hint: &str) {
        self.hints.push(hint.to_string());
    }

    fn show_header(&mut self, title: &str) {
        self.headers.push(title.to_string());
    }

    fn start_spinner(&mut self, message: &str) -> Box<dyn SpinnerHandle> {
        let log = Arc::clone(&self.spinners);
        log.lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(message.to_string());
        Box::new(MockSpinner { log })
    }
}

/// Spinner that records its messages into the owning [`MockUI`].
pub struct MockSpinner {
    log: Arc<Mutex<Vec<String>>>,
}

impl MockSpinner {
    fn record(&self, msg: &str) {
        self.log
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(msg.to_string());
    }
}

impl SpinnerHandle for MockSpinner {
    fn set_message(&mut self, msg: &str) {
        self.record(msg);
    }

    fn finish_success(&mut self, msg: &str) {
        self.record(msg);
    }

    fn finish_error(&mut self, msg: &str) {
        self.record(msg);
    }

    fn finish_skipped(&mut self, msg: &str) {
        self.record(msg);
    }
}
