//! Subprocess execution primitives.

pub mod command;
pub mod mock;

pub use command::{
    build_command, run_with_timeout, CommandRunner, ExecOutput, ExecRequest,
    EXIT_COMMAND_NOT_FOUND, EXIT_COMMAND_NOT_FOUND_WINDOWS,
};
pub use mock::ScriptedRunner;
