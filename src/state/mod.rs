//! Persisted per-tool state.
//!
//! State lives in `<project>/.toolwarden/state.json`. Without a project
//! root the store degrades to a no-op.

pub mod project;
pub mod status;
pub mod store;

pub use project::{find_project_root, ProjectRoot, DATA_DIR};
pub use status::{InstallationStatus, LastError, ToolStatus};
pub use store::{StateDocument, StateStore};
