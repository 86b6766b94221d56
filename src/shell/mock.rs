//! Scripted command runner for tests.

use std::io;
use std::sync::Mutex;

use super::command::{CommandRunner, ExecOutput, ExecRequest};
use crate::error::{Result, ToolwardenError};

#[derive(Debug, Clone)]
enum Response {
    Output(ExecOutput),
    SpawnError,
}

/// A [`CommandRunner`] that answers from a script instead of spawning.
///
/// Rules match when the request's command line (`program arg1 arg2 ...`)
/// starts with the rule's prefix. Later rules take precedence, so a test
/// can override an earlier answer. Unmatched commands behave like a
/// missing program (exit code 127).
#[derive(Debug, Default)]
pub struct ScriptedRunner {
    rules: Mutex<Vec<(String, Response)>>,
    calls: Mutex<Vec<ExecRequest>>,
}

impl ScriptedRunner {
    /// Create a runner with no rules.
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` with `output`.
    pub fn respond(&self, prefix: &str, output: ExecOutput) -> &Self {
        self.lock_rules()
            .push((prefix.to_string(), Response::Output(output)));
        self
    }

    /// Answer commands starting with `prefix` with exit 0 and `stdout`.
    pub fn succeed(&self, prefix: &str, stdout: &str) -> &Self {
        self.respond(prefix, ExecOutput::ok(stdout))
    }

    /// Answer commands starting with `prefix` with a failing exit code.
    pub fn fail(&self, prefix: &str, exit_code: i32, stderr: &str) -> &Self {
        self.respond(prefix, ExecOutput::failed(exit_code, stderr))
    }

    /// Make commands starting with `prefix` fail to spawn.
    pub fn spawn_error(&self, prefix: &str) -> &Self {
        self.lock_rules()
            .push((prefix.to_string(), Response::SpawnError));
        self
    }

    /// All requests seen so far, in order.
    pub fn calls(&self) -> Vec<ExecRequest> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Number of requests whose command line starts with `prefix`.
    pub fn call_count(&self, prefix: &str) -> usize {
        self.calls()
            .iter()
            .filter(|r| r.display().starts_with(prefix))
            .count()
    }

    fn lock_rules(&self) -> std::sync::MutexGuard<'_, Vec<(String, Response)>> {
        self.rules.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CommandRunner for ScriptedRunner {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        let line = request.display();
        let response = self
            .lock_rules()
            .iter()
            .rev()
            .find(|(prefix, _)| line.starts_with(prefix.as_str()))
            .map(|(_, response)| response.clone());

        match response {
            Some(Response::Output(output)) => Ok(output),
            Some(Response::SpawnError) => Err(ToolwardenError::SpawnFailed {
                command: request.command.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
            }),
            None => Ok(ExecOutput::failed(
                super::command::EXIT_COMMAND_NOT_FOUND,
                format!("{}: command not found", request.command),
            )),
        }
    }
}
