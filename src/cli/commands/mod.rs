//! CLI command implementations.
//!
//! Each command implements the [`Command`] trait, which provides a uniform
//! interface for executing commands and reporting results.
//!
//! # Architecture
//!
//! Commands are dispatched via [`CommandDispatcher`], which opens the
//! [`Toolbox`](crate::Toolbox) once and routes CLI subcommands to their
//! implementations. Commands borrow the toolbox, so tests drive them with a
//! scripted runner instead of real processes.

pub mod check;
pub mod completions;
pub mod dispatcher;
pub mod display;
pub mod install;
pub mod list;
pub mod logs;
pub mod override_cmd;
pub mod run;
pub mod schema;

pub use dispatcher::{dispatch_with, Command, CommandDispatcher, CommandResult};
