//! Task execution context: settings, host profile and the seams steps act through.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Result;

use crate::config::Settings;
use crate::exec::{Executor, Privilege};
use crate::fetch::{HttpSource, TrustedSource};
use crate::logging::Log;
use crate::platform::HostProfile;
use crate::prompt::{DialoguerPrompter, Prompter};
use crate::resources::action::ActionRunner;
use crate::scaffold::ProjectLayout;

/// Shared context for step execution.
pub struct Context {
    /// Resolved settings for this run.
    pub settings: Arc<Settings>,
    /// Detected package manager and distribution.
    pub host: Arc<HostProfile>,
    /// Logger for output and step recording.
    pub log: Arc<dyn Log>,
    /// Whether to perform a dry run (preview changes without applying).
    pub dry_run: bool,
    /// Invoking user's home directory.
    pub home: PathBuf,
    /// Invoking user's login name (added to the `docker` group).
    pub user: String,
    /// Command executor (for testing or real system calls).
    pub executor: Arc<dyn Executor>,
    /// Source for remote scripts, keys and repository files.
    pub source: Arc<dyn TrustedSource>,
    /// Yes/no prompts.
    pub prompter: Arc<dyn Prompter>,
    /// How privileged commands are run.
    pub privilege: Privilege,
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("settings", &self.settings)
            .field("host", &self.host)
            .field("log", &"<dyn Log>")
            .field("dry_run", &self.dry_run)
            .field("home", &self.home)
            .field("user", &self.user)
            .field("executor", &"<dyn Executor>")
            .field("source", &"<dyn TrustedSource>")
            .field("prompter", &"<dyn Prompter>")
            .field("privilege", &self.privilege)
            .finish()
    }
}

impl Context {
    /// Creates a context wired to the real system.
    ///
    /// Remote payloads are fetched over HTTPS and checked against the pins in
    /// `settings`; prompts go to the controlling terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the login name cannot be determined.
    pub fn new(
        settings: Arc<Settings>,
        host: Arc<HostProfile>,
        log: Arc<dyn Log>,
        dry_run: bool,
        executor: Arc<dyn Executor>,
        home: PathBuf,
    ) -> Result<Self> {
        let user = login_name(&*executor)?;
        let privilege = Privilege::detect(&*executor);
        let source = Arc::new(HttpSource::new(settings.pins.clone()));
        Ok(Self {
            settings,
            host,
            log,
            dry_run,
            home,
            user,
            executor,
            source,
            prompter: Arc::new(DialoguerPrompter),
            privilege,
        })
    }

    /// Runner for privileged actions, fetches and repository writes.
    #[must_use]
    pub fn runner(&self) -> ActionRunner<'_> {
        ActionRunner::new(&*self.executor, &*self.source, self.privilege, &*self.log)
    }

    /// Project root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    /// Paths owned by the scaffold.
    #[must_use]
    pub fn layout(&self) -> ProjectLayout {
        ProjectLayout::new(&self.settings)
    }
}

/// Login name from `$USER`, `$LOGNAME`, then `id -un`.
fn login_name(executor: &dyn Executor) -> Result<String> {
    for var in ["USER", "LOGNAME"] {
        if let Ok(name) = std::env::var(var)
            && !name.is_empty()
        {
            return Ok(name);
        }
    }
    let out = executor.run("id", &["-un"])?;
    let name = out.stdout.trim();
    if name.is_empty() {
        anyhow::bail!("cannot determine the current user name");
    }
    Ok(name.to_string())
}
