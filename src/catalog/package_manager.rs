//! Package manager invocations.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::shell::{ExecOutput, ExecRequest};

/// Package managers toolwarden can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum PackageManager {
    Npm,
    Pip,
}

impl PackageManager {
    /// The executable name.
    pub fn program(&self) -> &'static str {
        match self {
            PackageManager::Npm => "npm",
            PackageManager::Pip => "pip",
        }
    }

    /// Build the install invocation for `packages`.
    pub fn install_request(&self, packages: &[String], global: bool) -> ExecRequest {
        let mut args: Vec<String> = vec!["install".to_string()];
        match self {
            PackageManager::Npm if global => args.push("--global".to_string()),
            PackageManager::Pip if !global => args.push("--user".to_string()),
            _ => {}
        }
        args.extend(packages.iter().cloned());
        ExecRequest::new(self.program()).args(args)
    }

    /// Build the query that succeeds only when `package` is installed.
    pub fn query_request(&self, package: &str, global: bool) -> ExecRequest {
        match self {
            PackageManager::Npm => {
                let mut req = ExecRequest::new("npm").args(["ls", package, "--depth=0"]);
                if global {
                    req = req.args(["--global"]);
                }
                req
            }
            PackageManager::Pip => ExecRequest::new("pip").args(["show", package]),
        }
    }

    /// Interpret the output of [`query_request`](Self::query_request).
    ///
    /// `npm ls` can exit 0 with an `(empty)` tree, so the package name must
    /// also appear in the listing.
    pub fn query_found(&self, package: &str, output: &ExecOutput) -> bool {
        if !output.success() {
            return false;
        }
        match self {
            PackageManager::Npm => output.stdout.contains(package),
            PackageManager::Pip => true,
        }
    }
}

impl std::fmt::Display for PackageManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.program())
    }
}

/// Split an install descriptor's package field into individual packages.
pub fn split_packages(package: &str) -> Vec<String> {
    package.split_whitespace().map(String::from).collect()
}
