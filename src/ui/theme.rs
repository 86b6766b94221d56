//! Styles for toolwarden output.
//!
//! Verdict colors follow the three usability outcomes: ready tools are
//! green, tools blocked by a prerequisite orange, missing tools red.

use console::Style;

use crate::detection::Usability;

#[derive(Debug, Clone)]
pub struct Theme {
    pub success: Style,
    pub warning: Style,
    pub error: Style,
    pub dim: Style,
    pub header: Style,
    pub key: Style,
    pub hint: Style,
    /// Tool ids in listings.
    pub tool: Style,
    /// Command lines echoed back to the user.
    pub command: Style,
    pub ready: Style,
    pub blocked: Style,
    pub missing: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self::new()
    }
}

impl Theme {
    pub fn new() -> Self {
        Self {
            success: Style::new().green(),
            warning: Style::new().color256(208),
            error: Style::new().red().bold(),
            dim: Style::new().dim(),
            header: Style::new().bold().cyan(),
            key: Style::new().bold(),
            hint: Style::new().cyan().dim(),
            tool: Style::new().bold(),
            command: Style::new().dim().italic(),
            ready: Style::new().green(),
            blocked: Style::new().color256(208),
            missing: Style::new().red(),
        }
    }

    /// No styling at all. Used when stdout is not a terminal or `--no-color`
    /// is given.
    pub fn plain() -> Self {
        Self {
            success: Style::new(),
            warning: Style::new(),
            error: Style::new(),
            dim: Style::new(),
            header: Style::new(),
            key: Style::new(),
            hint: Style::new(),
            tool: Style::new(),
            command: Style::new(),
            ready: Style::new(),
            blocked: Style::new(),
            missing: Style::new(),
        }
    }

    pub fn verdict(&self, usability: &Usability) -> &Style {
        match usability {
            Usability::Usable => &self.ready,
            Usability::PrerequisitesMissing { .. } => &self.blocked,
            Usability::NotInstalled => &self.missing,
        }
    }

    pub fn format_success(&self, msg: &str) -> String {
        self.success.apply_to(format!("✓ {}", msg)).to_string()
    }

    pub fn format_warning(&self, msg: &str) -> String {
        self.warning.apply_to(format!("⚠ {}", msg)).to_string()
    }

    pub fn format_error(&self, msg: &str) -> String {
        self.error.apply_to(format!("✗ {}", msg)).to_string()
    }

    /// An install that was not needed.
    pub fn format_skipped(&self, msg: &str) -> String {
        self.dim.apply_to(format!("○ {}", msg)).to_string()
    }

    pub fn format_header(&self, title: &str) -> String {
        self.header.apply_to(title).to_string()
    }

    pub fn format_hint(&self, hint: &str) -> String {
        self.hint.apply_to(format!("→ {}", hint)).to_string()
    }

    /// `Key:` padded to `width`, then the value. Used by `check` and
    /// `logs --summary`.
    pub fn format_key_value(&self, key: &str, value: &str, width: usize) -> String {
        format!(
            "{} {}",
            self.key.apply_to(format!("{:<width$}", format!("{}:", key))),
            value
        )
    }
}

/// Colors are off when `NO_COLOR` is set or stdout is not a terminal.
pub fn should_use_colors() -> bool {
    if std::env::var_os("NO_COLOR").is_some() {
        return false;
    }
    console::Term::stdout().is_term()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_theme_has_no_escape_codes() {
        let theme = Theme::plain();
        assert_eq!(theme.format_success("Installed Semgrep"), "✓ Installed Semgrep");
        assert_eq!(theme.format_error("Ghost is not installed"), "✗ Ghost is not installed");
        assert_eq!(
            theme.format_hint("Run `toolwarden install ghost`"),
            "→ Run `toolwarden install ghost`"
        );
    }

    #[test]
    fn key_value_is_aligned() {
        let theme = Theme::plain();
        assert_eq!(theme.format_key_value("Version", "1.2.3", 10), "Version:   1.2.3");
    }

    #[test]
    fn verdict_styles_follow_usability() {
        let theme = Theme::plain();
        assert_eq!(
            theme.verdict(&Usability::NotInstalled).apply_to("not installed").to_string(),
            "not installed"
        );
    }
}
