//! Loading the tool catalog.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};

use super::definition::{InstallDescriptor, ToolDefinition};
use crate::error::{Result, ToolwardenError};

/// Embedded catalog directory.
static CATALOG_DIR: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/catalog");

const BUILTIN_FILE: &str = "builtin.yml";

/// Top-level shape of a catalog document.
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CatalogDocument {
    /// Tool definitions in display order.
    #[serde(default)]
    pub tools: Vec<ToolDefinition>,
}

/// Where a catalog was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogSource {
    /// Compiled into the binary.
    Builtin,
    /// A user-supplied catalog file.
    File(PathBuf),
    /// Constructed in memory; `reload` keeps the current tools.
    Inline,
}

/// The set of known tools.
#[derive(Debug, Clone)]
pub struct ToolCatalog {
    source: CatalogSource,
    tools: Vec<ToolDefinition>,
}

impl ToolCatalog {
    /// Load the built-in catalog.
    pub fn builtin() -> Result<Self> {
        let tools = load_builtin()?;
        Ok(Self {
            source: CatalogSource::Builtin,
            tools,
        })
    }

    /// Load a catalog from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let tools = load_file(path)?;
        Ok(Self {
            source: CatalogSource::File(path.to_path_buf()),
            tools,
        })
    }

    /// Parse a catalog from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let tools = parse_document(yaml, Path::new("<inline>"))?;
        Ok(Self {
            source: CatalogSource::Inline,
            tools,
        })
    }

    /// Build a catalog from definitions already in memory.
    pub fn from_definitions(tools: Vec<ToolDefinition>) -> Result<Self> {
        validate(&tools)?;
        Ok(Self {
            source: CatalogSource::Inline,
            tools,
        })
    }

    /// Look up a tool by id.
    pub fn get_tool(&self, id: &str) -> Result<&ToolDefinition> {
        self.tools
            .iter()
            .find(|t| t.id == id)
            .ok_or_else(|| ToolwardenError::ToolNotFound { id: id.to_string() })
    }

    /// All tools in catalog order.
    pub fn list_tools(&self) -> &[ToolDefinition] {
        &self.tools
    }

    /// Tool ids in catalog order.
    pub fn ids(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.id.as_str()).collect()
    }

    /// Where this catalog came from.
    pub fn source(&self) -> &CatalogSource {
        &self.source
    }

    /// Re-read the catalog from its source.
    ///
    /// On error the current tools are kept.
    pub fn reload(&mut self) -> Result<()> {
        let tools = match &self.source {
            CatalogSource::Builtin => load_builtin()?,
            CatalogSource::File(path) => load_file(path)?,
            CatalogSource::Inline => return Ok(()),
        };
        tracing::debug!("reloaded catalog with {} tools", tools.len());
        self.tools = tools;
        Ok(())
    }
}

fn load_builtin() -> Result<Vec<ToolDefinition>> {
    let path = Path::new("catalog").join(BUILTIN_FILE);
    let file = CATALOG_DIR
        .get_file(BUILTIN_FILE)
        .ok_or_else(|| ToolwardenError::CatalogParse {
            path: path.clone(),
            message: "built-in catalog missing".to_string(),
        })?;
    let content = file
        .contents_utf8()
        .ok_or_else(|| ToolwardenError::CatalogParse {
            path: path.clone(),
            message: "Invalid UTF-8".to_string(),
        })?;
    parse_document(content, &path)
}

fn load_file(path: &Path) -> Result<Vec<ToolDefinition>> {
    let content = fs::read_to_string(path).map_err(|e| ToolwardenError::CatalogParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    parse_document(&content, path)
}

fn parse_document(content: &str, path: &Path) -> Result<Vec<ToolDefinition>> {
    let doc: CatalogDocument =
        serde_yaml::from_str(content).map_err(|e| ToolwardenError::CatalogParse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    validate(&doc.tools)?;
    Ok(doc.tools)
}

fn validate(tools: &[ToolDefinition]) -> Result<()> {
    let mut seen = HashSet::new();
    for tool in tools {
        let invalid = |message: String| ToolwardenError::CatalogInvalid { message };

        if tool.id.trim().is_empty() {
            return Err(invalid("tool with empty id".to_string()));
        }
        if !seen.insert(tool.id.as_str()) {
            return Err(invalid(format!("duplicate tool id '{}'", tool.id)));
        }
        if tool.detection.is_empty() {
            return Err(invalid(format!("tool '{}' has no detection probe", tool.id)));
        }
        if let Some(probe) = tool.detection.iter().find(|p| p.command.is_empty()) {
            return Err(invalid(format!(
                "tool '{}' has an empty detection command '{}'",
                tool.id, probe.command
            )));
        }
        if let Some(pre) = tool
            .prerequisites
            .iter()
            .find(|p| p.name.trim().is_empty() || p.command.is_empty())
        {
            return Err(invalid(format!(
                "tool '{}' has a prerequisite without a name or command ('{}')",
                tool.id, pre.name
            )));
        }
        if let InstallDescriptor::PackageManager { package, .. } = &tool.install {
            if package.trim().is_empty() {
                return Err(invalid(format!(
                    "tool '{}' installs an empty package name",
                    tool.id
                )));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PrerequisiteKind, ToolCategory};
    use tempfile::TempDir;

    const MINIMAL: &str = r#"
tools:
  - id: alpha
    name: Alpha
    install:
      method: manual
      instructions: download it
    detection:
      - command: alpha --version
"#;

    #[test]
    fn builtin_catalog_loads() {
        let catalog = ToolCatalog::builtin().unwrap();

        assert_eq!(catalog.source(), &CatalogSource::Builtin);
        assert_eq!(
            catalog.ids(),
            vec!["greenframe", "greenit", "impact-framework", "semgrep"]
        );
    }

    #[test]
    fn builtin_catalog_shapes() {
        let catalog = ToolCatalog::builtin().unwrap();

        let greenframe = catalog.get_tool("greenframe").unwrap();
        assert_eq!(
            greenframe.prerequisites[0].kind,
            PrerequisiteKind::ContainerDaemon
        );

        let greenit = catalog.get_tool("greenit").unwrap();
        assert_eq!(
            greenit.prerequisites[0].kind,
            PrerequisiteKind::BrowserRuntime
        );

        let impact = catalog.get_tool("impact-framework").unwrap();
        assert_eq!(impact.required_packages.len(), 2);

        let semgrep = catalog.get_tool("semgrep").unwrap();
        assert_eq!(semgrep.category, ToolCategory::BuiltIn);
    }

    #[test]
    fn unknown_tool_is_not_found() {
        let catalog = ToolCatalog::from_yaml_str(MINIMAL).unwrap();
        let err = catalog.get_tool("nope").unwrap_err();
        assert!(matches!(err, ToolwardenError::ToolNotFound { ref id } if id == "nope"));
    }

    #[test]
    fn duplicate_ids_rejected() {
        let yaml = format!("{MINIMAL}{}", MINIMAL.replace("tools:\n", ""));
        let err = ToolCatalog::from_yaml_str(&yaml).unwrap_err();
        assert!(err.to_string().contains("duplicate tool id 'alpha'"));
    }

    #[test]
    fn missing_detection_rejected() {
        let yaml = r#"
tools:
  - id: alpha
    name: Alpha
    install:
      method: manual
      instructions: download it
    detection: []
"#;
        let err = ToolCatalog::from_yaml_str(yaml).unwrap_err();
        assert!(matches!(err, ToolwardenError::CatalogInvalid { .. }));
    }

    #[test]
    fn malformed_yaml_is_parse_error() {
        let err = ToolCatalog::from_yaml_str("tools: [").unwrap_err();
        assert!(matches!(err, ToolwardenError::CatalogParse { .. }));
    }

    #[test]
    fn reload_picks_up_file_edits() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.yml");
        fs::write(&path, MINIMAL).unwrap();

        let mut catalog = ToolCatalog::from_file(&path).unwrap();
        assert_eq!(catalog.ids(), vec!["alpha"]);

        fs::write(&path, MINIMAL.replace("alpha", "beta")).unwrap();
        catalog.reload().unwrap();
        assert_eq!(catalog.ids(), vec!["beta"]);
    }

    #[test]
    fn failed_reload_keeps_tools() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("catalog.yml");
        fs::write(&path, MINIMAL).unwrap();

        let mut catalog = ToolCatalog::from_file(&path).unwrap();
        fs::write(&path, "tools: [").unwrap();

        assert!(catalog.reload().is_err());
        assert_eq!(catalog.ids(), vec!["alpha"]);
    }
}
