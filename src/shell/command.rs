//! Subprocess execution with bounded runtime.

use crate::error::{Result, ToolwardenError};
use std::collections::HashMap;
use std::io::Read;
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver};
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// How long output is still collected once the deadline has passed.
const READER_GRACE: Duration = Duration::from_millis(200);

/// POSIX shells report a missing program with this exit code.
pub const EXIT_COMMAND_NOT_FOUND: i32 = 127;

/// `cmd.exe` reports a missing program with this exit code.
pub const EXIT_COMMAND_NOT_FOUND_WINDOWS: i32 = 9009;

/// A single subprocess invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecRequest {
    /// Program to run (looked up on `PATH`).
    pub command: String,

    /// Arguments passed verbatim.
    pub args: Vec<String>,

    /// Working directory. Runners pick their own default when unset.
    pub cwd: Option<PathBuf>,

    /// Extra environment variables layered on top of the runner's environment.
    pub env: HashMap<String, String>,

    /// Upper bound on runtime. Runners apply their default when unset.
    pub timeout: Option<Duration>,
}

impl ExecRequest {
    /// Create a request for a program with no arguments.
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    /// Build a request from an argv list. Returns `None` for an empty list.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (command, args) = argv.split_first()?;
        if command.trim().is_empty() {
            return None;
        }
        Some(Self::new(command.clone()).args(args.iter().cloned()))
    }

    /// Append arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory.
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Add one environment variable.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    /// Set the timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// The command line as a single display string.
    pub fn display(&self) -> String {
        if self.args.is_empty() {
            self.command.clone()
        } else {
            format!("{} {}", self.command, self.args.join(" "))
        }
    }
}

/// Captured result of a finished (or killed) subprocess.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecOutput {
    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Exit code (None if killed by signal or timeout).
    pub exit_code: Option<i32>,

    /// Whether the process was killed after exceeding its timeout.
    pub timed_out: bool,

    /// Wall-clock duration.
    pub duration: Duration,
}

impl ExecOutput {
    /// A successful result with the given stdout.
    pub fn ok(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            exit_code: Some(0),
            ..Default::default()
        }
    }

    /// A failed result with the given exit code and stderr.
    pub fn failed(exit_code: i32, stderr: impl Into<String>) -> Self {
        Self {
            stderr: stderr.into(),
            exit_code: Some(exit_code),
            ..Default::default()
        }
    }

    /// A result representing a timeout.
    pub fn timeout(after: Duration) -> Self {
        Self {
            timed_out: true,
            duration: after,
            ..Default::default()
        }
    }

    /// Whether the process exited with code 0 within its time limit.
    pub fn success(&self) -> bool {
        !self.timed_out && self.exit_code == Some(0)
    }

    /// Whether the exit code is the platform's "command not found" code.
    pub fn is_command_not_found(&self) -> bool {
        matches!(
            self.exit_code,
            Some(EXIT_COMMAND_NOT_FOUND) | Some(EXIT_COMMAND_NOT_FOUND_WINDOWS)
        )
    }

    /// Stdout and stderr joined, for substring checks.
    pub fn combined(&self) -> String {
        match (self.stdout.trim().is_empty(), self.stderr.trim().is_empty()) {
            (false, false) => format!("{}\n{}", self.stdout, self.stderr),
            (false, true) => self.stdout.clone(),
            _ => self.stderr.clone(),
        }
    }

    /// Human-readable description of why the process failed.
    pub fn error_text(&self) -> String {
        if self.timed_out {
            return format!("timed out after {}s", self.duration.as_secs());
        }
        let stderr = self.stderr.trim();
        if !stderr.is_empty() {
            return stderr.to_string();
        }
        let stdout = self.stdout.trim();
        if !stdout.is_empty() {
            return stdout.to_string();
        }
        match self.exit_code {
            Some(code) if self.is_command_not_found() => {
                format!("command not found (exit code {})", code)
            }
            Some(code) => format!("exited with code {}", code),
            None => "terminated by signal".to_string(),
        }
    }
}

/// Something that can run an [`ExecRequest`].
///
/// The isolated executor is the production implementation; tests use
/// [`crate::shell::ScriptedRunner`].
pub trait CommandRunner: Send + Sync {
    /// Run the request. Non-zero exits are `Ok`; only spawn failures are `Err`.
    fn run(&self, request: &ExecRequest) -> Result<ExecOutput>;
}

/// Build a `std::process::Command` for a program and its arguments.
///
/// On Windows, package managers ship as `.cmd` shims that `CreateProcess`
/// cannot start directly, so the invocation goes through `cmd /C`.
pub fn build_command(program: &str, args: &[String]) -> Command {
    if cfg!(target_os = "windows") {
        let mut cmd = Command::new("cmd");
        cmd.arg("/C").arg(program).args(args);
        cmd
    } else {
        let mut cmd = Command::new(program);
        cmd.args(args);
        cmd
    }
}

/// Spawn `cmd`, capture its output, and kill it if it outlives `timeout`.
///
/// On Unix the child leads its own process group, and a timeout kills the
/// whole group so wrappers like `npx` or `sh -c` cannot leave grandchildren
/// running. Output is only awaited until the deadline (plus a short grace),
/// since a detached grandchild may keep the pipes open.
///
/// `label` names the command in spawn errors.
pub fn run_with_timeout(
    mut cmd: Command,
    label: &str,
    timeout: Option<Duration>,
) -> Result<ExecOutput> {
    let start = Instant::now();
    let deadline = timeout.map(|limit| start + limit);

    cmd.stdin(Stdio::null());
    cmd.stdout(Stdio::piped());
    cmd.stderr(Stdio::piped());
    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|source| ToolwardenError::SpawnFailed {
        command: label.to_string(),
        source,
    })?;

    let stdout_rx = spawn_reader(child.stdout.take());
    let stderr_rx = spawn_reader(child.stderr.take());

    let mut timed_out = false;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break Some(status);
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            tracing::debug!("killing '{}' after {:?}", label, start.elapsed());
            kill_tree(&mut child);
            timed_out = true;
            break None;
        }
        thread::sleep(POLL_INTERVAL);
    };

    let stdout = collect(&stdout_rx, deadline);
    let stderr = collect(&stderr_rx, deadline);

    Ok(ExecOutput {
        stdout,
        stderr,
        exit_code: status.and_then(|s| s.code()),
        timed_out,
        duration: start.elapsed(),
    })
}

/// Kill the child and, on Unix, every process in its group.
fn kill_tree(child: &mut Child) {
    #[cfg(unix)]
    {
        // SAFETY: kill() only sends a signal; a negative pid addresses the
        // process group the child leads.
        unsafe {
            libc::kill(-(child.id() as libc::pid_t), libc::SIGKILL);
        }
    }
    let _ = child.kill();
    let _ = child.wait();
}

fn spawn_reader<R>(pipe: Option<R>) -> Receiver<String>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            let _ = pipe.read_to_end(&mut buf);
        }
        let _ = tx.send(String::from_utf8_lossy(&buf).to_string());
    });
    rx
}

/// Wait for a reader, giving up shortly after `deadline`.
fn collect(rx: &Receiver<String>, deadline: Option<Instant>) -> String {
    match deadline {
        Some(deadline) => {
            let wait = deadline
                .saturating_duration_since(Instant::now())
                .max(READER_GRACE);
            rx.recv_timeout(wait).unwrap_or_default()
        }
        None => rx.recv().unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_collects_parts() {
        let req = ExecRequest::new("npm")
            .args(["ls", "-g"])
            .cwd("/tmp")
            .env("A", "1")
            .timeout(Duration::from_secs(5));

        assert_eq!(req.command, "npm");
        assert_eq!(req.args, vec!["ls", "-g"]);
        assert_eq!(req.cwd, Some(PathBuf::from("/tmp")));
        assert_eq!(req.env.get("A"), Some(&"1".to_string()));
        assert_eq!(req.timeout, Some(Duration::from_secs(5)));
        assert_eq!(req.display(), "npm ls -g");
    }

    #[test]
    fn from_argv_rejects_empty() {
        assert!(ExecRequest::from_argv(&[]).is_none());
        assert!(ExecRequest::from_argv(&[" ".to_string()]).is_none());

        let req = ExecRequest::from_argv(&["docker".to_string(), "info".to_string()]).unwrap();
        assert_eq!(req.display(), "docker info");
    }

    #[test]
    fn output_success_requires_zero_and_no_timeout() {
        assert!(ExecOutput::ok("").success());
        assert!(!ExecOutput::failed(1, "").success());
        assert!(!ExecOutput::timeout(Duration::from_secs(5)).success());
    }

    #[test]
    fn output_detects_not_found_codes() {
        assert!(ExecOutput::failed(127, "").is_command_not_found());
        assert!(ExecOutput::failed(9009, "").is_command_not_found());
        assert!(!ExecOutput::failed(1, "").is_command_not_found());
    }

    #[test]
    fn error_text_prefers_stderr() {
        let mut out = ExecOutput::failed(2, "  boom \n");
        out.stdout = "partial".into();
        assert_eq!(out.error_text(), "boom");

        let out = ExecOutput::failed(3, "");
        assert_eq!(out.error_text(), "exited with code 3");

        let out = ExecOutput::timeout(Duration::from_secs(5));
        assert!(out.error_text().contains("timed out"));
    }

    #[cfg(unix)]
    #[test]
    fn run_captures_stdout_and_exit_code() {
        let cmd = build_command("sh", &["-c".into(), "echo hello; exit 3".into()]);
        let out = run_with_timeout(cmd, "sh", Some(Duration::from_secs(10))).unwrap();

        assert_eq!(out.exit_code, Some(3));
        assert!(out.stdout.contains("hello"));
        assert!(!out.timed_out);
    }

    #[cfg(unix)]
    #[test]
    fn run_kills_on_timeout() {
        let cmd = build_command("sleep", &["5".into()]);
        let out = run_with_timeout(cmd, "sleep", Some(Duration::from_millis(100))).unwrap();

        assert!(out.timed_out);
        assert!(!out.success());
        assert!(out.duration < Duration::from_secs(5));
    }

    #[cfg(unix)]
    #[test]
    fn timeout_kills_whole_process_tree() {
        let cmd = build_command("sh", &["-c".into(), "sleep 5 | cat".into()]);
        let out = run_with_timeout(cmd, "sh", Some(Duration::from_millis(200))).unwrap();

        assert!(out.timed_out);
        assert!(out.duration < Duration::from_secs(3));
    }

    #[cfg(unix)]
    #[test]
    fn background_grandchild_does_not_hold_output_past_deadline() {
        let cmd = build_command("sh", &["-c".into(), "echo started; sleep 5 &".into()]);
        let out = run_with_timeout(cmd, "sh", Some(Duration::from_secs(1))).unwrap();

        assert_eq!(out.exit_code, Some(0));
        assert!(out.duration < Duration::from_secs(3));
    }

    #[test]
    fn spawn_failure_is_error() {
        let cmd = build_command("this-command-does-not-exist-12345", &[]);
        let result = run_with_timeout(cmd, "this-command-does-not-exist-12345", None);

        if cfg!(target_os = "windows") {
            // cmd.exe itself starts; the missing program surfaces as exit 9009
            assert!(result.is_ok_and(|o| !o.success()));
        } else {
            assert!(matches!(result, Err(ToolwardenError::SpawnFailed { .. })));
        }
    }
}
