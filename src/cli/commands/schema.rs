//! Schema command implementation.
//!
//! The `toolwarden schema [catalog|settings]` command prints the JSON schema
//! of a file format so editors can validate catalogs and settings.

use crate::catalog::CatalogDocument;
use crate::cli::args::{SchemaArgs, SchemaTarget};
use crate::config::Settings;
use crate::error::Result;
use crate::ui::UserInterface;

use super::dispatcher::{Command, CommandResult};

/// The schema command implementation.
pub struct SchemaCommand {
    args: SchemaArgs,
}

impl SchemaCommand {
    /// Create a new schema command.
    pub fn new(args: SchemaArgs) -> Self {
        Self { args }
    }

    /// The schema as pretty-printed JSON.
    pub fn render(&self) -> Result<String> {
        let schema = match self.args.target {
            SchemaTarget::Catalog => schemars::schema_for!(CatalogDocument),
            SchemaTarget::Settings => schemars::schema_for!(Settings),
        };
        Ok(serde_json::to_string_pretty(&schema)?)
    }
}

impl Command for SchemaCommand {
    fn execute(&self, ui: &mut dyn UserInterface) -> Result<CommandResult> {
        ui.message(&self.render()?);
        Ok(CommandResult::success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::MockUI;

    #[test]
    fn catalog_schema_describes_tools() {
        let json = SchemaCommand::new(SchemaArgs::default()).render().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert!(value["properties"]["tools"].is_object());
        assert!(json.contains("detection"));
        assert!(json.contains("package-manager"));
    }

    #[test]
    fn settings_schema() {
        let json = SchemaCommand::new(SchemaArgs {
            target: SchemaTarget::Settings,
        })
        .render()
        .unwrap();

        assert!(json.contains("probe_timeout_secs"));
        assert!(json.contains("log_tail"));
    }

    #[test]
    fn execute_prints_schema() {
        let mut ui = MockUI::new();
        let result = SchemaCommand::new(SchemaArgs::default())
            .execute(&mut ui)
            .unwrap();

        assert!(result.success);
        assert!(ui.has_message("\"tools\""));
    }
}
