//! toolwarden - discover, verify, install and safely run external analysis
//! tools.
//!
//! A catalog describes each tool: how to detect it, which prerequisites it
//! needs, how to install it and how to run it. toolwarden combines live
//! probes with a per-project state file to decide whether a tool is usable,
//! installs it through npm or pip, runs it inside a disposable sandbox and
//! keeps an action log of every attempt.
//!
//! # Modules
//!
//! - [`catalog`] - Tool definitions and the catalog loader
//! - [`cli`] - Command-line interface and argument parsing
//! - [`config`] - Project settings
//! - [`detection`] - Usability verdicts and false-positive correction
//! - [`error`] - Error types and result aliases
//! - [`installer`] - Package-manager installs
//! - [`logs`] - Per-tool action logs
//! - [`prerequisites`] - Prerequisite probes
//! - [`sandbox`] - Isolated command execution
//! - [`shell`] - Subprocess requests, outputs and runners
//! - [`state`] - Project discovery and the tool state file
//! - [`toolbox`] - The caller-facing API tying these together
//! - [`ui`] - Spinners and terminal output
//!
//! # Example
//!
//! ```
//! use toolwarden::catalog::ToolCatalog;
//!
//! let catalog = ToolCatalog::builtin().unwrap();
//! let semgrep = catalog.get_tool("semgrep").unwrap();
//! assert_eq!(semgrep.name, "Semgrep");
//! ```

pub mod catalog;
pub mod cli;
pub mod config;
pub mod detection;
pub mod error;
pub mod installer;
pub mod logs;
pub mod prerequisites;
pub mod sandbox;
pub mod shell;
pub mod state;
pub mod toolbox;
pub mod ui;

pub use detection::Usability;
pub use error::{Result, ToolwardenError};
pub use installer::InstallOutcome;
pub use toolbox::{RunOutcome, Toolbox};
