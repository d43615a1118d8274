//! Run configuration: config file, environment, and CLI overrides.
//!
//! Precedence, highest first: command-line flags, the `HEALING_ROOT`
//! environment variable (root only), the config file, built-in defaults.
pub mod toml_loader;
pub mod validation;

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::ConfigError;

/// Default Node.js major release installed from NodeSource.
pub const DEFAULT_NODE_MAJOR: u32 = 20;

/// Default project directory name under `$HOME`.
pub const DEFAULT_ROOT_NAME: &str = "healing-platform";

/// Environment variable overriding the project root.
pub const ROOT_ENV: &str = "HEALING_ROOT";

/// Which flavour of the platform to lay down.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// Shared network, ports on all interfaces, systemd unit, editor.
    #[default]
    Standard,
    /// Loopback-only ports, no network block, no unit, no editor.
    Minimal,
}

impl Preset {
    /// Whether the compose file declares the `healing-net` network.
    #[must_use]
    pub const fn uses_network(self) -> bool {
        matches!(self, Self::Standard)
    }

    /// Host address published ports bind to, if restricted.
    #[must_use]
    pub const fn bind_address(self) -> Option<&'static str> {
        match self {
            Self::Standard => None,
            Self::Minimal => Some("127.0.0.1"),
        }
    }

    /// Whether the systemd unit is written and enabled.
    #[must_use]
    pub const fn registers_unit(self) -> bool {
        matches!(self, Self::Standard)
    }

    /// Whether the editor step runs.
    #[must_use]
    pub const fn installs_editor(self) -> bool {
        matches!(self, Self::Standard)
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Standard => "standard",
            Self::Minimal => "minimal",
        })
    }
}

/// When to generate an SSH key pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SshKeyMode {
    /// Ask on a terminal; skip when not interactive.
    #[default]
    Prompt,
    /// Generate without asking.
    Always,
    /// Never generate.
    Never,
}

/// Raw contents of `config.toml`.  Every field is optional.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Project root (`~/` is expanded).
    pub root: Option<String>,
    /// Preset name.
    pub preset: Option<Preset>,
    /// Node.js major release.
    pub node_major: Option<u32>,
    /// Include the adminer container.
    pub admin_ui: Option<bool>,
    /// Install the editor.
    pub editor: Option<bool>,
    /// SSH key generation mode.
    pub ssh_key: Option<SshKeyMode>,
    /// Comment embedded in a generated SSH key.
    pub ssh_comment: Option<String>,
    /// SHA-256 pins for remote payloads, keyed by URL.
    pub pins: BTreeMap<String, String>,
}

/// Values supplied on the command line.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    /// `--root`.
    pub root: Option<PathBuf>,
    /// `--preset`.
    pub preset: Option<Preset>,
    /// `--ssh-key`.
    pub ssh_key: Option<SshKeyMode>,
    /// `--no-admin-ui`.
    pub no_admin_ui: bool,
}

/// Fully resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// Project root directory.
    pub root: PathBuf,
    /// Active preset.
    pub preset: Preset,
    /// Node.js major release.
    pub node_major: u32,
    /// Include the adminer container.
    pub admin_ui: bool,
    /// Install the editor (before preset gating).
    pub editor: bool,
    /// SSH key generation mode.
    pub ssh_key: SshKeyMode,
    /// Comment embedded in a generated SSH key.
    pub ssh_comment: String,
    /// SHA-256 pins for remote payloads.
    pub pins: BTreeMap<String, String>,
}

impl Settings {
    /// Default settings for a user whose home directory is `home`.
    #[must_use]
    pub fn defaults(home: &Path) -> Self {
        Self {
            root: home.join(DEFAULT_ROOT_NAME),
            preset: Preset::default(),
            node_major: DEFAULT_NODE_MAJOR,
            admin_ui: true,
            editor: true,
            ssh_key: SshKeyMode::default(),
            ssh_comment: DEFAULT_ROOT_NAME.to_string(),
            pins: BTreeMap::new(),
        }
    }

    /// Merge file values, environment and CLI overrides over the defaults.
    #[must_use]
    pub fn resolve(
        file: ConfigFile,
        overrides: &Overrides,
        env: impl Fn(&str) -> Option<String>,
        home: &Path,
    ) -> Self {
        let defaults = Self::defaults(home);
        let root = overrides
            .root
            .clone()
            .or_else(|| env(ROOT_ENV).filter(|v| !v.is_empty()).map(PathBuf::from))
            .or_else(|| file.root.as_deref().map(|r| expand_home(r, home)))
            .unwrap_or(defaults.root);
        Self {
            root,
            preset: overrides.preset.or(file.preset).unwrap_or(defaults.preset),
            node_major: file.node_major.unwrap_or(defaults.node_major),
            admin_ui: !overrides.no_admin_ui && file.admin_ui.unwrap_or(defaults.admin_ui),
            editor: file.editor.unwrap_or(defaults.editor),
            ssh_key: overrides
                .ssh_key
                .or(file.ssh_key)
                .unwrap_or(defaults.ssh_key),
            ssh_comment: file.ssh_comment.unwrap_or(defaults.ssh_comment),
            pins: file.pins,
        }
    }

    /// Whether the editor step should run.
    #[must_use]
    pub const fn editor_enabled(&self) -> bool {
        self.editor && self.preset.installs_editor()
    }
}

/// Expand a leading `~/` against `home`.
#[must_use]
pub fn expand_home(path: &str, home: &Path) -> PathBuf {
    if path == "~" {
        home.to_path_buf()
    } else if let Some(rest) = path.strip_prefix("~/") {
        home.join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Default config file location from an environment lookup.
///
/// `$XDG_CONFIG_HOME/healing-setup/config.toml`, else
/// `~/.config/healing-setup/config.toml`.
#[must_use]
pub fn default_config_path(env: impl Fn(&str) -> Option<String>, home: &Path) -> PathBuf {
    env("XDG_CONFIG_HOME")
        .filter(|v| !v.is_empty())
        .map_or_else(|| home.join(".config"), PathBuf::from)
        .join("healing-setup")
        .join("config.toml")
}

/// Load and validate the config file at `path` (missing ⇒ defaults).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is unreadable, malformed, or holds
/// an invalid value.
pub fn load(path: &Path) -> Result<ConfigFile, ConfigError> {
    let file: ConfigFile = toml_loader::load_config(path)?;
    validation::validate(&file)?;
    Ok(file)
}
