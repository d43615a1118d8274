//! Process execution seam.
//!
//! Every external command issued by a step goes through [`Executor`], so
//! tests can substitute a scripted mock and assert on what would have run.
use anyhow::{Context, Result, bail};
use std::io::Write as _;
use std::process::{Command, Output, Stdio};

/// Result of a command execution.
#[derive(Debug, Clone)]
pub struct ExecResult {
    /// Captured standard output (lossy UTF-8).
    pub stdout: String,
    /// Captured standard error (lossy UTF-8).
    pub stderr: String,
    /// Whether the process exited with status zero.
    pub success: bool,
    /// Exit code, if the process was not killed by a signal.
    pub code: Option<i32>,
}

impl From<Output> for ExecResult {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            success: output.status.success(),
            code: output.status.code(),
        }
    }
}

/// Abstraction over command execution and PATH lookup.
pub trait Executor: Send + Sync + std::fmt::Debug {
    /// Run a command, failing if it exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned or exits non-zero.
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command and return its result regardless of exit status.
    ///
    /// # Errors
    ///
    /// Returns an error only if the program cannot be spawned.
    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult>;

    /// Run a command with `input` piped to its standard input, failing if it
    /// exits non-zero.
    ///
    /// # Errors
    ///
    /// Returns an error if the program cannot be spawned, the input cannot be
    /// written, or the program exits non-zero.
    fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<ExecResult>;

    /// Check whether `program` resolves on `PATH`.
    fn which(&self, program: &str) -> bool;
}

/// Production [`Executor`] backed by [`std::process::Command`].
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemExecutor;

fn check(result: ExecResult, label: &str) -> Result<ExecResult> {
    if !result.success {
        bail!(
            "{label} failed (exit {}): {}",
            result.code.unwrap_or(-1),
            result.stderr.trim()
        );
    }
    Ok(result)
}

impl Executor for SystemExecutor {
    fn run(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let result = self.run_unchecked(program, args)?;
        check(result, &command_label(program, args))
    }

    fn run_unchecked(&self, program: &str, args: &[&str]) -> Result<ExecResult> {
        let output = Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .with_context(|| format!("failed to execute: {program}"))?;
        Ok(ExecResult::from(output))
    }

    fn run_with_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<ExecResult> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to execute: {program}"))?;

        let mut stdin = child
            .stdin
            .take()
            .with_context(|| format!("stdin unavailable for {program}"))?;

        // Feed stdin from a separate thread so a chatty child cannot fill its
        // stdout pipe while we are still writing.
        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || stdin.write_all(input));
            let output = child.wait_with_output();
            let written = writer
                .join()
                .unwrap_or_else(|_| Err(std::io::Error::other("stdin writer panicked")));
            (output, written)
        });

        let (output, written) = output;
        let output = output.with_context(|| format!("waiting for {program}"))?;
        let result = ExecResult::from(output);
        // A broken pipe is only interesting when the program also failed.
        if let Err(e) = written
            && !result.success
        {
            bail!("writing stdin of {program}: {e}");
        }
        check(result, &command_label(program, args))
    }

    fn which(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }
}

/// Render `program args…` for error messages.
fn command_label(program: &str, args: &[&str]) -> String {
    if args.is_empty() {
        program.to_string()
    } else {
        format!("{program} {}", args.join(" "))
    }
}

/// How privileged commands are launched on this host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Privilege {
    /// Already running as uid 0; commands run directly.
    Root,
    /// Commands are prefixed with `sudo`.
    Sudo,
    /// Not root and no `sudo`; commands run directly and may fail.
    Unprivileged,
}

impl Privilege {
    /// Determine how to elevate on the current host.
    pub fn detect(executor: &dyn Executor) -> Self {
        let is_root = executor
            .run_unchecked("id", &["-u"])
            .is_ok_and(|r| r.success && r.stdout.trim() == "0");
        if is_root {
            Self::Root
        } else if executor.which("sudo") {
            Self::Sudo
        } else {
            Self::Unprivileged
        }
    }

    /// Return the program and argument list to execute `program args…` with
    /// the appropriate elevation.
    #[must_use]
    pub fn wrap<'a>(self, program: &'a str, args: &[&'a str]) -> (&'a str, Vec<&'a str>) {
        match self {
            Self::Sudo => {
                let mut full = Vec::with_capacity(args.len() + 1);
                full.push(program);
                full.extend_from_slice(args);
                ("sudo", full)
            }
            Self::Root | Self::Unprivileged => (program, args.to_vec()),
        }
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::resources::test_helpers::MockExecutor;

    #[test]
    fn run_echo() {
        let result = SystemExecutor.run("echo", &["hello"]).unwrap();
        assert!(result.success, "echo command should succeed");
        assert_eq!(result.stdout.trim(), "hello");
    }

    #[test]
    fn run_failure() {
        let result = SystemExecutor.run("false", &[]);
        assert!(result.is_err(), "non-zero exit should produce an error");
    }

    #[test]
    fn run_unchecked_failure() {
        let result = SystemExecutor.run_unchecked("false", &[]).unwrap();
        assert!(!result.success, "non-zero exit should set success=false");
    }

    #[test]
    fn run_with_stdin_pipes_input() {
        let result = SystemExecutor
            .run_with_stdin("cat", &[], b"piped text")
            .unwrap();
        assert_eq!(result.stdout, "piped text");
    }

    #[test]
    fn which_finds_known_program() {
        assert!(SystemExecutor.which("sh"), "sh should be found on Unix");
    }

    #[test]
    fn which_missing_program() {
        assert!(
            !SystemExecutor.which("this-program-does-not-exist-12345"),
            "non-existent program should not be found"
        );
    }

    #[test]
    fn failure_message_includes_arguments() {
        let err = SystemExecutor.run("sh", &["-c", "exit 3"]).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("sh -c exit 3"), "got: {msg}");
        assert!(msg.contains("exit 3"), "got: {msg}");
    }

    #[test]
    fn privilege_wrap_prefixes_sudo() {
        let (program, args) = Privilege::Sudo.wrap("apt-get", &["update"]);
        assert_eq!(program, "sudo");
        assert_eq!(args, vec!["apt-get", "update"]);
    }

    #[test]
    fn privilege_wrap_root_runs_directly() {
        let (program, args) = Privilege::Root.wrap("apt-get", &["update"]);
        assert_eq!(program, "apt-get");
        assert_eq!(args, vec!["update"]);
    }

    #[test]
    fn privilege_detect_root_from_id() {
        let exec = MockExecutor::ok("0\n");
        assert_eq!(Privilege::detect(&exec), Privilege::Root);
    }

    #[test]
    fn privilege_detect_sudo_when_available() {
        let exec = MockExecutor::ok("1000\n").with_which(true);
        assert_eq!(Privilege::detect(&exec), Privilege::Sudo);
    }

    #[test]
    fn privilege_detect_unprivileged_without_sudo() {
        let exec = MockExecutor::ok("1000\n");
        assert_eq!(Privilege::detect(&exec), Privilege::Unprivileged);
    }
}
