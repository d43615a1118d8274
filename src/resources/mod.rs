//! Idempotent resource primitives (check + apply pattern).
pub mod action;
pub mod directory;
pub mod file;
pub mod group;
pub mod ssh_key;
pub mod systemd_unit;
pub mod tool;

use anyhow::Result;

/// Minimal interface for resources that can be described and applied.
pub trait Applicable {
    /// Human-readable description of this resource.
    fn description(&self) -> String;

    /// Individual steps `apply` would perform, shown during dry runs.
    fn plan(&self) -> Vec<String> {
        Vec::new()
    }

    /// Bring the resource to its desired state.
    ///
    /// # Errors
    ///
    /// Returns an error if the change cannot be applied due to I/O failures,
    /// failing commands, or permission issues.
    fn apply(&self) -> Result<()>;
}

/// State of a resource on the host.
///
/// # Examples
///
/// ```
/// use healing_setup::resources::ResourceState;
///
/// let missing = ResourceState::Missing;
/// let stale = ResourceState::Incorrect { current: "old content".into() };
///
/// assert_ne!(missing, ResourceState::Correct);
/// assert_ne!(stale, ResourceState::Correct);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceState {
    /// Resource does not exist or the tool is not installed.
    Missing,
    /// Resource exists and matches the desired state.
    Correct,
    /// Resource exists but does not match the desired state.
    Incorrect {
        /// Short description of what is there now.
        current: String,
    },
    /// Resource cannot be applied on this host.
    Invalid {
        /// Reason why the resource cannot be applied.
        reason: String,
    },
}

/// Resources that can determine their own current state.
pub trait Resource: Applicable {
    /// Check the current state of the resource.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be determined.
    fn current_state(&self) -> Result<ResourceState>;
}

impl<R: Applicable + ?Sized> Applicable for Box<R> {
    fn description(&self) -> String {
        (**self).description()
    }

    fn plan(&self) -> Vec<String> {
        (**self).plan()
    }

    fn apply(&self) -> Result<()> {
        (**self).apply()
    }
}

impl<R: Resource + ?Sized> Resource for Box<R> {
    fn current_state(&self) -> Result<ResourceState> {
        (**self).current_state()
    }
}

impl<R: Applicable + ?Sized> Applicable for &R {
    fn description(&self) -> String {
        (**self).description()
    }

    fn plan(&self) -> Vec<String> {
        (**self).plan()
    }

    fn apply(&self) -> Result<()> {
        (**self).apply()
    }
}

impl<R: Resource + ?Sized> Resource for &R {
    fn current_state(&self) -> Result<ResourceState> {
        (**self).current_state()
    }
}

/// Shared test helpers for resource and step unit tests.
#[cfg(test)]
pub mod test_helpers {
    use crate::exec::{ExecResult, Executor};
    use std::collections::{HashSet, VecDeque};
    use std::sync::Mutex;

    /// A scripted response keyed on a substring of the command line.
    #[derive(Debug, Clone)]
    struct Rule {
        pattern: String,
        success: bool,
        stdout: String,
        provides: Vec<String>,
    }

    /// A configurable mock executor.
    ///
    /// Each call is recorded as a single `"program arg arg…"` line.  The
    /// response is chosen from, in order: the first rule whose pattern is a
    /// substring of the command line, the FIFO response queue, then the
    /// default (success with empty stdout when permissive, failure
    /// otherwise).
    ///
    /// `which()` returns `true` for programs registered with
    /// [`with_available`](Self::with_available) or made available by a
    /// [`provides`](Self::provides) rule, or for every program when
    /// [`with_which`](Self::with_which) is set.
    #[derive(Debug, Default)]
    pub struct MockExecutor {
        responses: Mutex<VecDeque<(bool, String)>>,
        rules: Vec<Rule>,
        which_result: bool,
        available: Mutex<HashSet<String>>,
        calls: Mutex<Vec<String>>,
        stdin: Mutex<Vec<(String, Vec<u8>)>>,
        permissive: bool,
    }

    impl MockExecutor {
        /// A mock where every unscripted call fails.
        #[must_use]
        pub fn strict() -> Self {
            Self::default()
        }

        /// A mock where every unscripted call succeeds with empty output.
        #[must_use]
        pub fn permissive() -> Self {
            Self {
                permissive: true,
                ..Self::default()
            }
        }

        /// Create a mock with a single successful response.
        #[must_use]
        pub fn ok(stdout: &str) -> Self {
            Self::with_responses(vec![(true, stdout.to_string())])
        }

        /// Create a mock from an ordered list of `(success, stdout)` pairs.
        #[must_use]
        pub fn with_responses(responses: Vec<(bool, String)>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                ..Self::default()
            }
        }

        /// Set the value returned by every [`Executor::which`] call.
        #[must_use]
        pub fn with_which(mut self, result: bool) -> Self {
            self.which_result = result;
            self
        }

        /// Mark `programs` as resolvable on `PATH`.
        #[must_use]
        pub fn with_available(self, programs: &[&str]) -> Self {
            if let Ok(mut set) = self.available.lock() {
                set.extend(programs.iter().map(ToString::to_string));
            }
            self
        }

        /// Respond to command lines containing `pattern`.
        #[must_use]
        pub fn on(mut self, pattern: &str, success: bool, stdout: &str) -> Self {
            self.rules.push(Rule {
                pattern: pattern.to_string(),
                success,
                stdout: stdout.to_string(),
                provides: Vec::new(),
            });
            self
        }

        /// Succeed on command lines containing `pattern` and make `programs`
        /// resolvable afterwards (simulates an installation).
        #[must_use]
        pub fn provides(mut self, pattern: &str, programs: &[&str]) -> Self {
            self.rules.push(Rule {
                pattern: pattern.to_string(),
                success: true,
                stdout: String::new(),
                provides: programs.iter().map(ToString::to_string).collect(),
            });
            self
        }

        /// Return the total number of executor calls made so far.
        #[must_use]
        pub fn call_count(&self) -> usize {
            self.calls.lock().map_or(0, |c| c.len())
        }

        /// Return every recorded command line.
        #[must_use]
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().map_or_else(|_| Vec::new(), |c| c.clone())
        }

        /// Whether any recorded command line contains `pattern`.
        #[must_use]
        pub fn called(&self, pattern: &str) -> bool {
            self.calls().iter().any(|c| c.contains(pattern))
        }

        /// Return the stdin passed to the first call containing `pattern`.
        #[must_use]
        pub fn stdin_for(&self, pattern: &str) -> Option<Vec<u8>> {
            self.stdin.lock().ok().and_then(|entries| {
                entries
                    .iter()
                    .find(|(line, _)| line.contains(pattern))
                    .map(|(_, bytes)| bytes.clone())
            })
        }

        fn next(&self, program: &str, args: &[&str]) -> (bool, String) {
            let line = if args.is_empty() {
                program.to_string()
            } else {
                format!("{program} {}", args.join(" "))
            };
            if let Ok(mut calls) = self.calls.lock() {
                calls.push(line.clone());
            }
            if let Some(rule) = self.rules.iter().find(|r| line.contains(&r.pattern)) {
                if let Ok(mut set) = self.available.lock() {
                    set.extend(rule.provides.iter().cloned());
                }
                return (rule.success, rule.stdout.clone());
            }
            let queued = self
                .responses
                .lock()
                .ok()
                .and_then(|mut guard| guard.pop_front());
            queued.unwrap_or_else(|| {
                if self.permissive {
                    (true, String::new())
                } else {
                    (false, "unexpected call".to_string())
                }
            })
        }

        fn checked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            if success {
                Ok(ExecResult {
                    stdout,
                    stderr: String::new(),
                    success: true,
                    code: Some(0),
                })
            } else {
                anyhow::bail!("mock command failed: {program} {}", args.join(" "))
            }
        }
    }

    impl Executor for MockExecutor {
        fn run(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            self.checked(program, args)
        }

        fn run_unchecked(&self, program: &str, args: &[&str]) -> anyhow::Result<ExecResult> {
            let (success, stdout) = self.next(program, args);
            Ok(ExecResult {
                stdout,
                stderr: String::new(),
                success,
                code: Some(i32::from(!success)),
            })
        }

        fn run_with_stdin(
            &self,
            program: &str,
            args: &[&str],
            input: &[u8],
        ) -> anyhow::Result<ExecResult> {
            if let Ok(mut entries) = self.stdin.lock() {
                entries.push((format!("{program} {}", args.join(" ")), input.to_vec()));
            }
            self.checked(program, args)
        }

        fn which(&self, program: &str) -> bool {
            self.which_result || self.available.lock().is_ok_and(|set| set.contains(program))
        }
    }
}
