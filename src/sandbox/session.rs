//! Disposable sandbox directories.
//!
//! Node-based analyzers check for their own plugins by walking up the
//! directory tree until they find a `package.json`. Started from inside the
//! host project, that walk lands on the host's manifest and dependency tree.
//! A sandbox is a throwaway directory holding a minimal manifest of its own,
//! plus an environment that keeps `PATH` but points package-manager caches
//! and config at sandbox-local paths.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Prefix for sandbox directory names under the system temp dir.
pub const SANDBOX_PREFIX: &str = "toolwarden-sandbox-";

/// Manifest that satisfies npm's "am I inside a project" check.
const SANDBOX_MANIFEST: &str = r#"{
  "name": "toolwarden-sandbox",
  "version": "1.0.0",
  "private": true,
  "description": "Disposable working directory for external tools",
  "dependencies": {}
}
"#;

/// Host variables passed through to sandboxed processes.
///
/// Everything else in the parent environment is dropped.
const PASSTHROUGH_VARS: &[&str] = &[
    "PATH",
    "HOME",
    "USER",
    "USERNAME",
    "LOGNAME",
    "SHELL",
    "LANG",
    "LC_ALL",
    "LC_CTYPE",
    "TERM",
    "TMPDIR",
    "TEMP",
    "TMP",
    "XDG_RUNTIME_DIR",
    "XDG_CACHE_HOME",
    "XDG_CONFIG_HOME",
    "DOCKER_HOST",
    "DOCKER_CONFIG",
    "DOCKER_CERT_PATH",
    "DOCKER_TLS_VERIFY",
    "PUPPETEER_CACHE_DIR",
    "PUPPETEER_EXECUTABLE_PATH",
    "CHROME_PATH",
    "NVM_DIR",
    "VOLTA_HOME",
    "NODE_EXTRA_CA_CERTS",
    "NPM_CONFIG_PREFIX",
    "npm_config_prefix",
    "HTTP_PROXY",
    "HTTPS_PROXY",
    "NO_PROXY",
    "http_proxy",
    "https_proxy",
    "no_proxy",
    // Windows process essentials
    "SystemRoot",
    "SYSTEMROOT",
    "COMSPEC",
    "PATHEXT",
    "APPDATA",
    "LOCALAPPDATA",
    "USERPROFILE",
    "ProgramFiles",
    "ProgramData",
];

/// A live sandbox directory and its environment.
#[derive(Debug)]
pub struct SandboxSession {
    root: PathBuf,
    env: HashMap<String, String>,
    removed: bool,
}

impl SandboxSession {
    /// Create a new uniquely named sandbox under the system temp dir.
    pub fn create() -> Result<Self> {
        Self::create_in(&std::env::temp_dir())
    }

    /// Create a new uniquely named sandbox under `parent`.
    pub fn create_in(parent: &Path) -> Result<Self> {
        let root = tempfile::Builder::new()
            .prefix(SANDBOX_PREFIX)
            .tempdir_in(parent)?
            .keep();

        let mut session = Self {
            env: sandbox_env(&root, |key| std::env::var(key).ok()),
            root,
            removed: false,
        };

        if let Err(e) = session.populate() {
            session.cleanup();
            return Err(e.into());
        }

        tracing::debug!("created sandbox at {}", session.root.display());
        Ok(session)
    }

    fn populate(&self) -> io::Result<()> {
        fs::write(self.root.join("package.json"), SANDBOX_MANIFEST)?;
        fs::write(self.root.join(".npmrc"), "")?;
        fs::create_dir_all(self.root.join(".npm-cache"))?;
        Ok(())
    }

    /// The sandbox directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The scrubbed environment for processes started in this sandbox.
    pub fn env(&self) -> &HashMap<String, String> {
        &self.env
    }

    /// Whether `cleanup` has already run.
    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Remove the sandbox directory.
    ///
    /// Safe to call repeatedly and after the directory was removed by
    /// someone else. Failures are logged, never returned.
    pub fn cleanup(&mut self) {
        if self.removed {
            return;
        }
        self.removed = true;

        match fs::remove_dir_all(&self.root) {
            Ok(()) => tracing::debug!("removed sandbox {}", self.root.display()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("sandbox {} already removed", self.root.display())
            }
            Err(e) => tracing::warn!("could not remove sandbox {}: {}", self.root.display(), e),
        }
    }
}

impl Drop for SandboxSession {
    fn drop(&mut self) {
        self.cleanup();
    }
}

/// Build the scrubbed environment for a sandbox rooted at `root`.
///
/// `lookup` reads a host variable; tests pass a closure instead of
/// touching the real environment.
pub fn sandbox_env<F>(root: &Path, lookup: F) -> HashMap<String, String>
where
    F: Fn(&str) -> Option<String>,
{
    let mut env: HashMap<String, String> = PASSTHROUGH_VARS
        .iter()
        .filter_map(|key| lookup(key).map(|value| (key.to_string(), value)))
        .collect();

    let path = |p: &str| root.join(p).to_string_lossy().to_string();
    let overrides = [
        ("npm_config_cache", path(".npm-cache")),
        ("npm_config_userconfig", path(".npmrc")),
        ("npm_config_audit", "false".to_string()),
        ("npm_config_fund", "false".to_string()),
        ("npm_config_package_lock", "false".to_string()),
        ("npm_config_update_notifier", "false".to_string()),
        ("NO_UPDATE_NOTIFIER", "1".to_string()),
        ("PIP_DISABLE_PIP_VERSION_CHECK", "1".to_string()),
    ];
    for (key, value) in overrides {
        env.insert(key.to_string(), value);
    }

    env
}
