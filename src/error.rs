//! Error types for toolwarden operations.
//!
//! This module defines [`ToolwardenError`], the primary error type used
//! throughout the crate, and a [`Result`] type alias for convenience.
//!
//! # Error Handling Strategy
//!
//! - Unknown tool ids are programmer errors and propagate immediately
//! - Prerequisite and detection failures are folded into typed results
//!   ([`crate::prerequisites::PrerequisiteReport`], [`crate::detection::Usability`])
//! - Install and run failures are returned as outcome values after being logged
//! - A missing project root degrades state tracking to a no-op

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for toolwarden operations.
#[derive(Debug, Error)]
pub enum ToolwardenError {
    /// No tool with this id exists in the catalog.
    #[error("Unknown tool: {id}")]
    ToolNotFound { id: String },

    /// The catalog document could not be read or parsed.
    #[error("Failed to parse catalog at {path}: {message}")]
    CatalogParse { path: PathBuf, message: String },

    /// The catalog parsed but contains invalid definitions.
    #[error("Invalid catalog: {message}")]
    CatalogInvalid { message: String },

    /// The settings file could not be parsed.
    #[error("Failed to parse settings at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// An environment-level dependency is missing.
    #[error("Prerequisite '{prerequisite}' unavailable: {message}")]
    PrerequisiteUnavailable {
        prerequisite: String,
        message: String,
    },

    /// Live detection could not confirm the tool. Resolved internally.
    #[error("Detection inconclusive for '{tool}': {reason}")]
    DetectionInconclusive { tool: String, reason: String },

    /// An install command failed or could not be started.
    #[error("Install of '{tool}' failed: {message}")]
    InstallFailed { tool: String, message: String },

    /// A run command failed or could not be started.
    #[error("Run of '{tool}' failed: {message}")]
    RunFailed { tool: String, message: String },

    /// No project root was found, so there is nowhere to persist state.
    #[error("State store unavailable: no project root found")]
    StateStoreUnavailable,

    /// A subprocess could not be spawned.
    #[error("failed to spawn '{command}': {source}")]
    SpawnFailed {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic wrapped error for anyhow interop.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for toolwarden operations.
pub type Result<T> = std::result::Result<T, ToolwardenError>;
