//! Deciding whether a tool can be used right now.

use std::path::Path;
use std::time::Duration;

use chrono::Utc;

use super::classify::{classify_error, ErrorClass};
use super::version::extract_version;
use crate::catalog::{DetectionProbe, ToolCatalog, ToolDefinition};
use crate::error::{Result, ToolwardenError};
use crate::prerequisites::{MissingPrerequisite, PrerequisiteChecker, DEFAULT_PROBE_TIMEOUT};
use crate::shell::{CommandRunner, ExecOutput};
use crate::state::StateStore;

/// Time allowed for one package-manager query.
pub const PACKAGE_QUERY_TIMEOUT: Duration = Duration::from_secs(15);

/// Whether a tool can be used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Usability {
    /// Installed and every prerequisite is available.
    Usable,
    /// Installed, but blocked by missing prerequisites.
    PrerequisitesMissing { missing: Vec<MissingPrerequisite> },
    /// Not installed.
    NotInstalled,
}

impl Usability {
    pub fn is_usable(&self) -> bool {
        matches!(self, Usability::Usable)
    }
}

/// How a verdict was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionSource {
    /// Live package and probe checks passed.
    Live,
    /// Live checks failed; the stored installed flag was trusted.
    StoredFlag,
    /// Live checks failed and nothing stored overrode them.
    None,
}

/// Full detection result for one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetectionReport {
    pub tool_id: String,
    pub usability: Usability,
    pub source: DetectionSource,
    /// Version parsed from the first passing probe.
    pub version: Option<String>,
    /// Required packages the package manager did not report.
    pub missing_packages: Vec<String>,
    /// Why live detection failed, if it did.
    pub live_failure: Option<String>,
}

/// What [`DetectionEngine::flag_false_positive`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FalsePositiveOutcome {
    pub class: ErrorClass,
    /// Whether the installed marker was removed.
    pub installation_cleared: bool,
}

/// Combines catalog, state and live checks into a usability verdict.
pub struct DetectionEngine<'a> {
    catalog: &'a ToolCatalog,
    state: &'a StateStore,
    runner: &'a dyn CommandRunner,
    project_root: Option<&'a Path>,
    probe_timeout: Duration,
}

impl<'a> DetectionEngine<'a> {
    pub fn new(
        catalog: &'a ToolCatalog,
        state: &'a StateStore,
        runner: &'a dyn CommandRunner,
    ) -> Self {
        Self {
            catalog,
            state,
            runner,
            project_root: None,
            probe_timeout: DEFAULT_PROBE_TIMEOUT,
        }
    }

    /// Project directory that non-global package queries run in.
    pub fn with_project_root(mut self, root: Option<&'a Path>) -> Self {
        self.project_root = root;
        self
    }

    /// Override the timeout for detection and prerequisite probes.
    pub fn with_probe_timeout(mut self, timeout: Duration) -> Self {
        self.probe_timeout = timeout;
        self
    }

    /// Whether the tool is usable. Unknown ids are an error.
    pub fn is_usable(&self, tool_id: &str) -> Result<Usability> {
        Ok(self.inspect(tool_id)?.usability)
    }

    /// Run detection and report how the verdict was reached.
    ///
    /// 1. Every required package must be present.
    /// 2. Every detection probe must match.
    /// 3. If both pass, prerequisites decide between usable and blocked.
    /// 4. Otherwise a stored installed flag is trusted, unless detection has
    ///    since been flagged as failed and no custom command is set.
    ///    Prerequisites are not re-checked here.
    pub fn inspect(&self, tool_id: &str) -> Result<DetectionReport> {
        let tool = self.catalog.get_tool(tool_id)?;

        let missing_packages = self.missing_packages(tool);
        let live = if missing_packages.is_empty() {
            self.run_probes(tool)
        } else {
            tracing::info!(
                "{}: missing required packages: {}",
                tool.id,
                missing_packages.join(", ")
            );
            Err(format!(
                "missing required packages: {}",
                missing_packages.join(", ")
            ))
        };

        let mut report = DetectionReport {
            tool_id: tool.id.clone(),
            usability: Usability::NotInstalled,
            source: DetectionSource::None,
            version: None,
            missing_packages,
            live_failure: None,
        };

        match live {
            Ok(version) => {
                let checker =
                    PrerequisiteChecker::new(self.runner).with_timeout(self.probe_timeout);
                let prerequisites = checker.check_all(&tool.prerequisites);
                report.version = version;
                report.source = DetectionSource::Live;
                report.usability = if prerequisites.all_available {
                    Usability::Usable
                } else {
                    tracing::info!(
                        "{}: installed but blocked by {}",
                        tool.id,
                        prerequisites.missing_names().join(", ")
                    );
                    Usability::PrerequisitesMissing {
                        missing: prerequisites.missing,
                    }
                };
            }
            Err(reason) => {
                let inconclusive = ToolwardenError::DetectionInconclusive {
                    tool: tool.id.clone(),
                    reason: reason.clone(),
                };
                tracing::debug!("{}", inconclusive);
                report.live_failure = Some(reason);

                let status = self.state.tool_status_or_default(&tool.id);
                let trusted = !status.is_detection_failed() || status.custom_command().is_some();
                if status.is_installed() && trusted {
                    tracing::debug!("{}: trusting stored installed flag", tool.id);
                    report.usability = Usability::Usable;
                    report.source = DetectionSource::StoredFlag;
                } else if status.is_installed() {
                    tracing::debug!(
                        "{}: stored installed flag suppressed by earlier detection failure",
                        tool.id
                    );
                }
            }
        }

        Ok(report)
    }

    /// Correct the stored state after a tool believed usable failed to run.
    ///
    /// Detection is always flagged as failed. The installed marker is only
    /// removed for not-found failures, and never when a custom command is set.
    pub fn flag_false_positive(&self, tool_id: &str, error: &str) -> Result<FalsePositiveOutcome> {
        let tool = self.catalog.get_tool(tool_id)?;
        let class = classify_error(error);

        let installation_cleared = self.state.update(&tool.id, |status| {
            status.flag_detection_failed(Utc::now());
            class == ErrorClass::NotFound && status.clear_installation()
        })?;

        tracing::info!(
            "{}: flagged detection failure ({:?}){}",
            tool.id,
            class,
            if installation_cleared {
                ", cleared installation status"
            } else {
                ""
            }
        );

        Ok(FalsePositiveOutcome {
            class,
            installation_cleared,
        })
    }

    fn missing_packages(&self, tool: &ToolDefinition) -> Vec<String> {
        let (manager, global) = tool.package_manager();
        tool.required_packages
            .iter()
            .filter(|package| {
                let mut request = manager
                    .query_request(package, global)
                    .timeout(PACKAGE_QUERY_TIMEOUT);
                if let (false, Some(root)) = (global, self.project_root) {
                    request = request.cwd(root);
                }
                match self.runner.run(&request) {
                    Ok(output) => !manager.query_found(package, &output),
                    Err(e) => {
                        tracing::debug!("{}: package query for {} failed: {}", tool.id, package, e);
                        true
                    }
                }
            })
            .cloned()
            .collect()
    }

    /// Run every probe; on success return the first version found.
    fn run_probes(&self, tool: &ToolDefinition) -> std::result::Result<Option<String>, String> {
        let mut version = None;
        for probe in &tool.detection {
            let output = self.run_probe(probe)?;
            if version.is_none() {
                version = extract_version(&output.combined());
            }
        }
        Ok(version)
    }

    fn run_probe(&self, probe: &DetectionProbe) -> std::result::Result<ExecOutput, String> {
        let timeout = probe
            .timeout_secs
            .map(Duration::from_secs)
            .unwrap_or(self.probe_timeout);
        let request = probe
            .command
            .to_request()
            .ok_or_else(|| "empty detection command".to_string())?
            .timeout(timeout);

        let output = self
            .runner
            .run(&request)
            .map_err(|e| format!("'{}': {}", probe.command, e))?;

        if output.timed_out {
            return Err(format!("'{}' {}", probe.command, output.error_text()));
        }
        if output.success() != probe.expect_success {
            return Err(format!(
                "'{}' {}",
                probe.command,
                if probe.expect_success {
                    output.error_text()
                } else {
                    "succeeded but was expected to fail".to_string()
                }
            ));
        }
        if let Some(expected) = &probe.output_contains {
            if !output.combined().contains(expected.as_str()) {
                return Err(format!(
                    "'{}' output did not contain '{}'",
                    probe.command, expected
                ));
            }
        }
        Ok(output)
    }
}
