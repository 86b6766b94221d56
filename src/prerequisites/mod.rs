//! Environment-level prerequisite checks.
//!
//! A prerequisite is something a tool needs but that is not the tool itself:
//! a running container daemon, a downloaded browser, a language runtime.

pub mod checker;
pub mod status;

pub use checker::{PrerequisiteChecker, DEFAULT_PROBE_TIMEOUT, DEFAULT_STATUS_COMMAND};
pub use status::{MissingPrerequisite, PrerequisiteCheck, PrerequisiteReport};
