// Shared helpers for integration tests.
//
// Provides a temporary-directory-backed project root and a context wired to
// the real filesystem but with no network and no prompts, so each integration
// test can drive the file-writing steps in isolation.
//
// Used by all integration test binaries that declare `mod common;`.
#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use healing_setup::config::{Preset, Settings, SshKeyMode};
use healing_setup::exec::{Privilege, SystemExecutor};
use healing_setup::fetch::FixtureSource;
use healing_setup::logging::{Log, Logger};
use healing_setup::platform::{DistributionIdentity, HostProfile, PackageManager};
use healing_setup::prompt::FixedPrompter;
use healing_setup::tasks::Context;

/// Steps that only write under the project root.
pub const FILE_STEPS: [&str; 4] = ["scaffold", "compose", "launchers", "docs"];

/// An isolated home directory backed by a [`tempfile::TempDir`].
///
/// The directory is automatically deleted when dropped.
pub struct IntegrationTestContext {
    /// Temporary directory standing in for `$HOME`.
    pub home: tempfile::TempDir,
    /// Settings handed to every context built from this fixture.
    pub settings: Settings,
}

impl IntegrationTestContext {
    /// Create a fixture with default settings rooted under a fresh home.
    pub fn new() -> Self {
        let home = tempfile::tempdir().expect("create temp dir");
        let settings = Settings {
            ssh_key: SshKeyMode::Never,
            ..Settings::defaults(home.path())
        };
        Self { home, settings }
    }

    /// Switch to `preset`.
    pub fn with_preset(mut self, preset: Preset) -> Self {
        self.settings.preset = preset;
        self
    }

    /// Drop the admin UI container.
    pub fn without_admin_ui(mut self) -> Self {
        self.settings.admin_ui = false;
        self
    }

    /// Project root directory.
    pub fn root(&self) -> &Path {
        &self.settings.root
    }

    /// Path of `rel` under the project root.
    pub fn path(&self, rel: &str) -> PathBuf {
        self.settings.root.join(rel)
    }

    /// Build a context for an apt host with no downloads and no prompts.
    pub fn context(&self, dry_run: bool) -> (Context, Arc<Logger>) {
        let log = Arc::new(Logger::new("integration-test"));
        let ctx = Context {
            settings: Arc::new(self.settings.clone()),
            host: Arc::new(HostProfile::new(
                Some(PackageManager::Apt),
                DistributionIdentity {
                    id: "debian".to_string(),
                    version: "12".to_string(),
                    codename: Some("bookworm".to_string()),
                },
            )),
            log: Arc::clone(&log) as Arc<dyn Log>,
            dry_run,
            home: self.home.path().to_path_buf(),
            user: "tester".to_string(),
            executor: Arc::new(SystemExecutor),
            source: Arc::new(FixtureSource::new()),
            prompter: Arc::new(FixedPrompter::non_interactive()),
            privilege: Privilege::Unprivileged,
        };
        (ctx, log)
    }
}
