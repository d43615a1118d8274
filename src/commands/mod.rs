//! Top-level subcommand orchestration.
pub mod detect;
pub mod install;
pub mod version;

use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result};

use crate::cli::GlobalOpts;
use crate::config::{self, Overrides, Settings};
use crate::exec::SystemExecutor;
use crate::logging::{Log, Logger};
use crate::operations::SystemFileSystemOps;
use crate::platform::HostProfile;

/// Shared state produced by the common command setup sequence.
///
/// Encapsulates config resolution and host detection so that each command
/// does not have to repeat the boilerplate.
#[derive(Debug)]
pub struct CommandSetup {
    /// Invoking user's home directory.
    pub home: PathBuf,
    /// Resolved settings.
    pub settings: Settings,
    /// Detected package manager and distribution.
    pub host: HostProfile,
}

impl CommandSetup {
    /// Resolve settings and detect the host.
    ///
    /// # Errors
    ///
    /// Returns an error if `$HOME` is unset or the config file is invalid.
    pub fn init(global: &GlobalOpts, overrides: Overrides, log: &Logger) -> Result<Self> {
        let home = home_dir()?;
        let settings = resolve_settings(global, overrides, &home, |k| std::env::var(k).ok())?;
        log.debug(&format!("project root: {}", settings.root.display()));
        log.debug(&format!("preset: {}", settings.preset));

        let host = HostProfile::detect(&SystemExecutor, &SystemFileSystemOps);
        match host.manager {
            Some(pm) => log.info(&format!("package manager: {pm}")),
            None => log.warn("no supported package manager found"),
        }
        log.info(&format!("distribution: {}", host.distro));

        Ok(Self {
            home,
            settings,
            host,
        })
    }
}

/// Invoking user's home directory from `$HOME`.
///
/// # Errors
///
/// Returns an error if `$HOME` is unset or empty.
pub fn home_dir() -> Result<PathBuf> {
    std::env::var("HOME")
        .ok()
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
        .context("HOME is not set")
}

/// Load the config file (explicit `--config` or the default location) and
/// merge it with the environment and command-line overrides.
///
/// # Errors
///
/// Returns an error if the config file cannot be read or is invalid.
pub fn resolve_settings(
    global: &GlobalOpts,
    mut overrides: Overrides,
    home: &Path,
    env: impl Fn(&str) -> Option<String>,
) -> Result<Settings> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(|| config::default_config_path(&env, home));
    let file = config::load(&path).with_context(|| format!("loading {}", path.display()))?;
    overrides.root = global.root.clone().or(overrides.root);
    overrides.preset = global.preset.or(overrides.preset);
    Ok(Settings::resolve(file, &overrides, env, home))
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::config::Preset;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn missing_default_config_gives_defaults() {
        let home = tempfile::tempdir().unwrap();
        let settings =
            resolve_settings(&GlobalOpts::default(), Overrides::default(), home.path(), no_env)
                .unwrap();
        assert_eq!(settings, Settings::defaults(home.path()));
    }

    #[test]
    fn explicit_config_is_loaded() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join("custom.toml");
        std::fs::write(&path, "preset = \"minimal\"\nroot = \"~/clinic\"\n").unwrap();
        let global = GlobalOpts {
            config: Some(path),
            ..GlobalOpts::default()
        };
        let settings =
            resolve_settings(&global, Overrides::default(), home.path(), no_env).unwrap();
        assert_eq!(settings.preset, Preset::Minimal);
        assert_eq!(settings.root, home.path().join("clinic"));
    }

    #[test]
    fn global_flags_beat_config_file() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join("custom.toml");
        std::fs::write(&path, "preset = \"minimal\"\n").unwrap();
        let global = GlobalOpts {
            config: Some(path),
            preset: Some(Preset::Standard),
            root: Some(PathBuf::from("/srv/healing")),
            ..GlobalOpts::default()
        };
        let settings =
            resolve_settings(&global, Overrides::default(), home.path(), no_env).unwrap();
        assert_eq!(settings.preset, Preset::Standard);
        assert_eq!(settings.root, PathBuf::from("/srv/healing"));
    }

    #[test]
    fn invalid_config_names_the_file() {
        let home = tempfile::tempdir().unwrap();
        let path = home.path().join("broken.toml");
        std::fs::write(&path, "preset = [").unwrap();
        let global = GlobalOpts {
            config: Some(path),
            ..GlobalOpts::default()
        };
        let err = resolve_settings(&global, Overrides::default(), home.path(), no_env).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }
}
