//! Tool detection.
//!
//! The [`DetectionEngine`] decides whether a tool is usable by combining
//! package queries, the tool's own probes, prerequisite checks and the
//! stored installed flag. It also corrects stored state when a tool that
//! looked usable turns out not to run.

pub mod classify;
pub mod engine;
pub mod version;

pub use classify::{classify_error, ErrorClass};
pub use engine::{
    DetectionEngine, DetectionReport, DetectionSource, FalsePositiveOutcome, Usability,
    PACKAGE_QUERY_TIMEOUT,
};
pub use version::extract_version;
