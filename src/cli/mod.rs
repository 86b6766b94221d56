//! Command-line interface for toolwarden.
//!
//! This module provides the CLI argument parsing using clap's derive macros
//! and command implementations.
//!
//! # Architecture
//!
//! - [`args`] - Argument definitions using clap derive macros
//! - [`commands`] - Command implementations

pub mod args;
pub mod commands;

pub use args::{
    CheckArgs, Cli, Commands, CompletionsArgs, InstallArgs, ListArgs, LogsArgs, OverrideArgs,
    RunArgs, SchemaArgs, SchemaTarget,
};
pub use commands::{dispatch_with, Command, CommandDispatcher, CommandResult};
