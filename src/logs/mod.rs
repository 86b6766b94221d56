//! Append-only action logs.
//!
//! Each tool gets `<project>/.toolwarden/logs/<toolId>.jsonl` with one JSON
//! record per install, run or error.

mod entry;
mod logger;

pub use entry::{ActionLogEntry, LogAction, MAX_OUTPUT_BYTES};
pub use logger::{ActionLogger, LogSummary};
