//! Version strings from probe output.

use regex::Regex;
use std::sync::LazyLock;

static VERSION_PATTERNS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    [r"(\d+\.\d+\.\d+)", r"version\s+(\d+\.\d+)", r"v(\d+\.\d+)"]
        .iter()
        .map(|p| Regex::new(p).expect("version pattern must compile"))
        .collect()
});

/// Pull the first version-looking string out of command output.
pub fn extract_version(output: &str) -> Option<String> {
    VERSION_PATTERNS.iter().find_map(|re| {
        re.captures(output)
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str().to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn semver() {
        assert_eq!(extract_version("1.58.0").as_deref(), Some("1.58.0"));
        assert_eq!(
            extract_version("Docker version 25.0.3, build 4debf41").as_deref(),
            Some("25.0.3")
        );
    }

    #[test]
    fn major_minor() {
        assert_eq!(extract_version("greenframe version 1.7").as_deref(), Some("1.7"));
        assert_eq!(extract_version("if-run v0.4").as_deref(), Some("0.4"));
    }

    #[test]
    fn none() {
        assert_eq!(extract_version("Usage: if-run [options]"), None);
    }
}
