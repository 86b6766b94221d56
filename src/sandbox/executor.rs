//! Runs external commands inside a sandbox session.

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use super::session::SandboxSession;
use crate::error::Result;
use crate::shell::{build_command, run_with_timeout, CommandRunner, ExecOutput, ExecRequest};

/// Executes commands from a disposable sandbox with a scrubbed environment.
///
/// The sandbox is created on first use and reused for every later call on
/// the same executor until [`cleanup`](Self::cleanup). Two executors never
/// share a sandbox.
#[derive(Debug, Default)]
pub struct IsolatedExecutor {
    session: Mutex<Option<SandboxSession>>,
    parent_dir: Option<PathBuf>,
    default_timeout: Option<Duration>,
}

impl IsolatedExecutor {
    /// Create an executor with no default timeout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `timeout` to requests that do not carry their own.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    /// Create sandboxes under `dir` instead of the system temp dir.
    pub fn with_parent_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.parent_dir = Some(dir.into());
        self
    }

    /// Ensure a sandbox exists and return its directory.
    pub fn create_sandbox(&self) -> Result<PathBuf> {
        let mut guard = self.lock();
        let session = self.ensure_session(&mut guard)?;
        Ok(session.root().to_path_buf())
    }

    /// The current sandbox directory, if one is live.
    pub fn sandbox_dir(&self) -> Option<PathBuf> {
        self.lock()
            .as_ref()
            .filter(|s| !s.is_removed())
            .map(|s| s.root().to_path_buf())
    }

    /// Run a command from the sandbox.
    ///
    /// Non-zero exits and timeouts come back as `Ok`; callers inspect
    /// [`ExecOutput::success`]. Only a failure to spawn is an `Err`.
    pub fn execute(&self, request: &ExecRequest) -> Result<ExecOutput> {
        let (root, env) = {
            let mut guard = self.lock();
            let session = self.ensure_session(&mut guard)?;
            (session.root().to_path_buf(), session.env().clone())
        };

        let mut cmd = build_command(&request.command, &request.args);
        cmd.env_clear();
        cmd.envs(&env);
        cmd.envs(&request.env);
        cmd.current_dir(request.cwd.as_ref().unwrap_or(&root));

        let timeout = request.timeout.or(self.default_timeout);
        tracing::debug!(
            "executing '{}' in {} (timeout {:?})",
            request.display(),
            request.cwd.as_ref().unwrap_or(&root).display(),
            timeout
        );

        run_with_timeout(cmd, &request.command, timeout)
    }

    /// Remove the sandbox. Safe to call any number of times.
    pub fn cleanup(&self) {
        if let Some(mut session) = self.lock().take() {
            session.cleanup();
        }
    }

    fn ensure_session<'g>(
        &self,
        guard: &'g mut MutexGuard<'_, Option<SandboxSession>>,
    ) -> Result<&'g SandboxSession> {
        let session = match guard.take() {
            Some(session) if !session.is_removed() => session,
            _ => match &self.parent_dir {
                Some(dir) => SandboxSession::create_in(dir)?,
                None => SandboxSession::create()?,
            },
        };
        Ok(guard.insert(session))
    }

    fn lock(&self) -> MutexGuard<'_, Option<SandboxSession>> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl CommandRunner for IsolatedExecutor {
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput> {
        self.execute(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn executor(parent: &TempDir) -> IsolatedExecutor {
        IsolatedExecutor::new()
            .with_parent_dir(parent.path())
            .with_default_timeout(Duration::from_secs(10))
    }

    #[test]
    fn two_executors_never_share_a_sandbox() {
        let parent = TempDir::new().unwrap();
        let a = executor(&parent);
        let b = executor(&parent);

        assert_ne!(a.create_sandbox().unwrap(), b.create_sandbox().unwrap());
    }

    #[test]
    fn sandbox_is_reused_within_one_executor() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);

        let first = exec.create_sandbox().unwrap();
        let second = exec.create_sandbox().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn cleanup_twice_does_not_panic() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);
        let dir = exec.create_sandbox().unwrap();

        exec.cleanup();
        exec.cleanup();

        assert!(!dir.exists());
        assert!(exec.sandbox_dir().is_none());
    }

    #[test]
    fn fresh_sandbox_after_cleanup() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);
        let first = exec.create_sandbox().unwrap();
        exec.cleanup();

        let second = exec.create_sandbox().unwrap();

        assert_ne!(first, second);
        assert!(second.join("package.json").exists());
        assert_eq!(exec.sandbox_dir(), Some(second));
    }

    #[test]
    fn cleanup_tolerates_external_removal() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);
        let dir = exec.create_sandbox().unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        exec.cleanup();
    }

    #[cfg(unix)]
    #[test]
    fn execute_runs_inside_sandbox() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);
        let dir = exec.create_sandbox().unwrap();

        let out = exec.execute(&ExecRequest::new("pwd")).unwrap();
        assert!(out.success());
        let reported = PathBuf::from(out.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, dir.canonicalize().unwrap());
    }

    #[cfg(unix)]
    #[test]
    fn execute_scrubs_environment() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);

        let out = exec
            .execute(&ExecRequest::new("env").env("TOOLWARDEN_EXTRA", "yes"))
            .unwrap();

        assert!(out.success());
        assert!(out.stdout.contains("npm_config_audit=false"));
        assert!(out.stdout.contains("TOOLWARDEN_EXTRA=yes"));
        assert!(out.stdout.contains("PATH="));
        assert!(!out.stdout.contains("CARGO_PKG_NAME="));
    }

    #[cfg(unix)]
    #[test]
    fn execute_reports_non_zero_exit_without_error() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);

        let out = exec
            .execute(&ExecRequest::new("sh").args(["-c", "echo nope >&2; exit 4"]))
            .unwrap();

        assert_eq!(out.exit_code, Some(4));
        assert!(out.stderr.contains("nope"));
    }

    #[cfg(unix)]
    #[test]
    fn execute_honours_explicit_cwd() {
        let parent = TempDir::new().unwrap();
        let project = TempDir::new().unwrap();
        let exec = executor(&parent);

        let out = exec
            .execute(&ExecRequest::new("pwd").cwd(project.path()))
            .unwrap();
        let reported = PathBuf::from(out.stdout.trim()).canonicalize().unwrap();
        assert_eq!(reported, project.path().canonicalize().unwrap());
    }

    #[test]
    fn execute_missing_program_is_spawn_error() {
        let parent = TempDir::new().unwrap();
        let exec = executor(&parent);

        let result = exec.execute(&ExecRequest::new("this-command-does-not-exist-12345"));
        if cfg!(target_os = "windows") {
            assert!(result.is_ok_and(|o| !o.success()));
        } else {
            assert!(result.is_err());
        }
    }
}
