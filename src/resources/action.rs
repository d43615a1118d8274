//! Ordered host actions and the runner that performs them.
//!
//! Installation steps describe *what* to do as a list of [`Action`]s chosen
//! from the package-manager dispatch table.  [`ActionRunner`] performs them
//! in order, adding privilege elevation and routing every download through
//! the [`TrustedSource`].
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::exec::{Executor, Privilege};
use crate::fetch::TrustedSource;
use crate::logging::Log;
use crate::platform::PackageManager;

/// A single host-level action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Run a command line.
    Run {
        /// Program followed by its arguments.
        argv: Vec<String>,
        /// Run with elevation.
        privileged: bool,
        /// Log a warning instead of failing on non-zero exit.
        tolerate_failure: bool,
    },
    /// Download a shell script and pipe it to privileged `bash -s`.
    RunFetched {
        /// Script location.
        url: String,
        /// Arguments passed after `--`.
        args: Vec<String>,
    },
    /// Download a signing key or repository definition and install it at
    /// `dest`.
    InstallRemote {
        /// Payload location.
        url: String,
        /// Destination path.
        dest: PathBuf,
        /// Convert an ASCII-armored key to binary with `gpg --dearmor`.
        dearmor: bool,
    },
    /// Download a signing key and import it into the rpm database.
    ImportRpmKey {
        /// Key location.
        url: String,
    },
    /// Write `content` to a root-owned path.
    WriteRoot {
        /// Destination path.
        path: PathBuf,
        /// File content.
        content: String,
    },
}

impl Action {
    /// Privileged command that must succeed.
    #[must_use]
    pub fn privileged(argv: &[&str]) -> Self {
        Self::Run {
            argv: argv.iter().map(ToString::to_string).collect(),
            privileged: true,
            tolerate_failure: false,
        }
    }

    /// Install `packages` with `manager`.
    #[must_use]
    pub fn install(manager: PackageManager, packages: &[&str]) -> Self {
        Self::Run {
            argv: manager.install_command(packages),
            privileged: true,
            tolerate_failure: false,
        }
    }

    /// Refresh the package index.  Failure is only a warning.
    #[must_use]
    pub fn refresh(manager: PackageManager) -> Self {
        Self::Run {
            argv: manager.update_command(),
            privileged: true,
            tolerate_failure: true,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Run { argv, .. } => write!(f, "run {}", argv.join(" ")),
            Self::RunFetched { url, args } if args.is_empty() => {
                write!(f, "run script {url}")
            }
            Self::RunFetched { url, args } => {
                write!(f, "run script {url} -- {}", args.join(" "))
            }
            Self::InstallRemote { url, dest, .. } => {
                write!(f, "install {url} -> {}", dest.display())
            }
            Self::ImportRpmKey { url } => write!(f, "import rpm key {url}"),
            Self::WriteRoot { path, .. } => write!(f, "write {}", path.display()),
        }
    }
}

/// Performs [`Action`]s against the host.
#[derive(Debug, Clone, Copy)]
pub struct ActionRunner<'a> {
    executor: &'a dyn Executor,
    source: &'a dyn TrustedSource,
    privilege: Privilege,
    log: &'a dyn Log,
}

impl<'a> ActionRunner<'a> {
    /// Create a runner.
    #[must_use]
    pub const fn new(
        executor: &'a dyn Executor,
        source: &'a dyn TrustedSource,
        privilege: Privilege,
        log: &'a dyn Log,
    ) -> Self {
        Self {
            executor,
            source,
            privilege,
            log,
        }
    }

    /// The executor used for commands.
    #[must_use]
    pub const fn executor(&self) -> &'a dyn Executor {
        self.executor
    }

    /// Perform `actions` in order, stopping at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first error from a non-tolerated command, a download, or
    /// a file write.
    pub fn run_all(&self, actions: &[Action]) -> Result<()> {
        for action in actions {
            self.log.debug(&action.to_string());
            self.perform(action)?;
        }
        Ok(())
    }

    /// Perform a single action.
    ///
    /// # Errors
    ///
    /// See [`run_all`](Self::run_all).
    pub fn perform(&self, action: &Action) -> Result<()> {
        match action {
            Action::Run {
                argv,
                privileged,
                tolerate_failure,
            } => self.run_argv(argv, *privileged, *tolerate_failure),
            Action::RunFetched { url, args } => {
                let script = self.source.fetch(url)?;
                let mut full = vec!["-s", "--"];
                full.extend(args.iter().map(String::as_str));
                self.elevated_stdin("bash", &full, &script)
            }
            Action::InstallRemote { url, dest, dearmor } => {
                let key = self.source.fetch(url)?;
                self.ensure_parent(dest)?;
                let dest = dest.to_string_lossy();
                if *dearmor {
                    self.elevated_stdin("gpg", &["--dearmor", "--yes", "-o", &*dest], &key)
                } else {
                    self.elevated_stdin("tee", &[&*dest], &key)
                }
            }
            Action::ImportRpmKey { url } => {
                let key = self.source.fetch(url)?;
                let tmp = std::env::temp_dir()
                    .join(format!("healing-setup-{}.asc", std::process::id()));
                std::fs::write(&tmp, &key)
                    .with_context(|| format!("writing {}", tmp.display()))?;
                let path = tmp.to_string_lossy();
                let result = self.elevated("rpm", &["--import", &*path]);
                std::fs::remove_file(&tmp).ok();
                result.map(|_| ())
            }
            Action::WriteRoot { path, content } => {
                self.ensure_parent(path)?;
                let path = path.to_string_lossy();
                self.elevated_stdin("tee", &[&*path], content.as_bytes())
            }
        }
    }

    fn run_argv(&self, argv: &[String], privileged: bool, tolerate_failure: bool) -> Result<()> {
        let Some((program, rest)) = argv.split_first() else {
            return Ok(());
        };
        let rest: Vec<&str> = rest.iter().map(String::as_str).collect();
        let (program, args) = if privileged {
            self.privilege.wrap(program.as_str(), &rest)
        } else {
            (program.as_str(), rest)
        };
        if !tolerate_failure {
            self.executor.run(program, &args)?;
            return Ok(());
        }
        match self.executor.run_unchecked(program, &args) {
            Ok(result) if result.success => {}
            Ok(result) => self.log.warn(&format!(
                "'{}' exited with {}, continuing",
                argv.join(" "),
                result.code.unwrap_or(-1)
            )),
            Err(e) => self
                .log
                .warn(&format!("'{}' could not run: {e}", argv.join(" "))),
        }
        Ok(())
    }

    fn elevated(&self, program: &str, args: &[&str]) -> Result<crate::exec::ExecResult> {
        let (program, args) = self.privilege.wrap(program, args);
        self.executor.run(program, &args)
    }

    fn elevated_stdin(&self, program: &str, args: &[&str], input: &[u8]) -> Result<()> {
        let (program, args) = self.privilege.wrap(program, args);
        self.executor.run_with_stdin(program, &args, input)?;
        Ok(())
    }

    fn ensure_parent(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            let parent = parent.to_string_lossy();
            self.elevated("install", &["-d", "-m", "0755", &*parent])?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use crate::fetch::FixtureSource;
    use crate::logging::Logger;
    use crate::resources::test_helpers::MockExecutor;

    fn runner<'a>(
        exec: &'a MockExecutor,
        source: &'a FixtureSource,
        log: &'a Logger,
    ) -> ActionRunner<'a> {
        ActionRunner::new(exec, source, Privilege::Sudo, log)
    }

    #[test]
    fn install_is_privileged() {
        let exec = MockExecutor::permissive();
        let source = FixtureSource::new();
        let log = Logger::new("test");
        runner(&exec, &source, &log)
            .run_all(&[Action::install(PackageManager::Dnf, &["git"])])
            .unwrap();
        assert_eq!(exec.calls(), vec!["sudo dnf install -y git"]);
    }

    #[test]
    fn refresh_failure_is_tolerated() {
        let exec = MockExecutor::strict().on("apt-get update", false, "");
        let source = FixtureSource::new();
        let log = Logger::new("test");
        let result = runner(&exec, &source, &log).run_all(&[Action::refresh(PackageManager::Apt)]);
        assert!(result.is_ok());
    }

    #[test]
    fn failing_install_stops_the_plan() {
        let exec = MockExecutor::strict();
        let source = FixtureSource::new();
        let log = Logger::new("test");
        let result = runner(&exec, &source, &log).run_all(&[
            Action::install(PackageManager::Apk, &["git"]),
            Action::privileged(&["true"]),
        ]);
        assert!(result.is_err());
        assert_eq!(exec.call_count(), 1);
    }

    #[test]
    fn fetched_script_is_piped_to_bash() {
        let url = "https://deb.nodesource.com/setup_20.x";
        let exec = MockExecutor::permissive();
        let source = FixtureSource::new().with(url, b"echo hi\n");
        let log = Logger::new("test");
        runner(&exec, &source, &log)
            .perform(&Action::RunFetched {
                url: url.to_string(),
                args: Vec::new(),
            })
            .unwrap();
        assert!(exec.called("sudo bash -s --"));
        assert_eq!(exec.stdin_for("bash -s").unwrap(), b"echo hi\n");
    }

    #[test]
    fn fetch_failure_runs_nothing() {
        let exec = MockExecutor::permissive();
        let source = FixtureSource::new();
        let log = Logger::new("test");
        let result = runner(&exec, &source, &log).perform(&Action::RunFetched {
            url: "https://unreachable.test/x.sh".to_string(),
            args: Vec::new(),
        });
        assert!(result.is_err());
        assert_eq!(exec.call_count(), 0);
    }

    #[test]
    fn dearmored_key_goes_through_gpg() {
        let url = "https://download.docker.com/linux/ubuntu/gpg";
        let exec = MockExecutor::permissive();
        let source = FixtureSource::new().with(url, b"-----BEGIN PGP");
        let log = Logger::new("test");
        runner(&exec, &source, &log)
            .perform(&Action::InstallRemote {
                url: url.to_string(),
                dest: PathBuf::from("/etc/apt/keyrings/docker.gpg"),
                dearmor: true,
            })
            .unwrap();
        assert_eq!(
            exec.calls(),
            vec![
                "sudo install -d -m 0755 /etc/apt/keyrings",
                "sudo gpg --dearmor --yes -o /etc/apt/keyrings/docker.gpg",
            ]
        );
        assert_eq!(exec.stdin_for("gpg").unwrap(), b"-----BEGIN PGP");
    }

    #[test]
    fn write_root_uses_tee() {
        let exec = MockExecutor::permissive();
        let source = FixtureSource::new();
        let log = Logger::new("test");
        runner(&exec, &source, &log)
            .perform(&Action::WriteRoot {
                path: PathBuf::from("/etc/yum.repos.d/vscode.repo"),
                content: "[code]\n".to_string(),
            })
            .unwrap();
        assert!(exec.called("sudo tee /etc/yum.repos.d/vscode.repo"));
        assert_eq!(exec.stdin_for("tee").unwrap(), b"[code]\n");
    }

    #[test]
    fn plain_remote_file_goes_through_tee() {
        let url = "https://download.docker.com/linux/fedora/docker-ce.repo";
        let exec = MockExecutor::permissive();
        let source = FixtureSource::new().with(url, b"[docker-ce-stable]\n");
        let log = Logger::new("test");
        runner(&exec, &source, &log)
            .perform(&Action::InstallRemote {
                url: url.to_string(),
                dest: PathBuf::from("/etc/yum.repos.d/docker-ce.repo"),
                dearmor: false,
            })
            .unwrap();
        assert!(exec.called("sudo tee /etc/yum.repos.d/docker-ce.repo"));
        assert_eq!(exec.stdin_for("tee").unwrap(), b"[docker-ce-stable]\n");
    }

    #[test]
    fn display_describes_action() {
        let action = Action::install(PackageManager::Pacman, &["nodejs", "npm"]);
        assert_eq!(
            action.to_string(),
            "run pacman -S --needed --noconfirm nodejs npm"
        );
    }
}
