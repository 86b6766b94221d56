//! Settings discovery and loading.

use std::fs;
use std::path::Path;

use crate::config::schema::Settings;
use crate::error::{Result, ToolwardenError};
use crate::state::ProjectRoot;

/// Load settings for a project.
///
/// A missing project root or settings file yields the defaults.
pub fn load_settings(root: Option<&ProjectRoot>) -> Result<Settings> {
    match root {
        Some(root) => load_settings_file(&root.config_file()),
        None => Ok(Settings::default()),
    }
}

/// Load settings from a specific file. A missing file yields the defaults.
pub fn load_settings_file(path: &Path) -> Result<Settings> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Settings::default()),
        Err(e) => return Err(ToolwardenError::Io(e)),
    };
    parse_settings(&content, path)
}

/// Parse settings YAML. An empty document yields the defaults.
pub fn parse_settings(content: &str, path: &Path) -> Result<Settings> {
    if content.trim().is_empty() {
        return Ok(Settings::default());
    }
    serde_yaml::from_str(content).map_err(|e| ToolwardenError::ConfigParse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn defaults_without_root() {
        assert_eq!(load_settings(None).unwrap(), Settings::default());
    }

    #[test]
    fn defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let root = ProjectRoot::new(temp.path());
        let settings = load_settings(Some(&root)).unwrap();

        assert_eq!(settings.probe_timeout(), Duration::from_secs(5));
        assert_eq!(settings.command_timeout(), Duration::from_secs(600));
        assert_eq!(settings.log_tail, 20);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let temp = TempDir::new().unwrap();
        let root = ProjectRoot::new(temp.path());
        fs::create_dir_all(root.data_dir()).unwrap();
        fs::write(root.config_file(), "probe_timeout_secs: 2\ncatalog: tools.yml\n").unwrap();

        let settings = load_settings(Some(&root)).unwrap();
        assert_eq!(settings.probe_timeout_secs, 2);
        assert_eq!(settings.command_timeout_secs, 600);
        assert_eq!(
            settings.catalog_path(Some(temp.path())),
            Some(temp.path().join("tools.yml"))
        );
    }

    #[test]
    fn absolute_catalog_path_is_kept() {
        let settings = Settings {
            catalog: Some(PathBuf::from("/etc/toolwarden/catalog.yml")),
            ..Default::default()
        };
        assert_eq!(
            settings.catalog_path(Some(Path::new("/work"))),
            Some(PathBuf::from("/etc/toolwarden/catalog.yml"))
        );
    }

    #[test]
    fn empty_file_is_default() {
        let settings = parse_settings("  \n", Path::new("config.yml")).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn invalid_yaml_is_config_parse_error() {
        let err = parse_settings("probe_timeout_secs: [", Path::new("config.yml")).unwrap_err();
        assert!(matches!(err, ToolwardenError::ConfigParse { .. }));
    }

    #[test]
    fn unknown_type_is_error() {
        let err = parse_settings("log_tail: lots", Path::new("config.yml")).unwrap_err();
        assert!(err.to_string().contains("config.yml"));
    }
}
