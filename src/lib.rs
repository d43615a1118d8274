//! Healing platform bootstrap engine.
//!
//! Provisions a Linux development host for the healing platform: detects the
//! package manager and distribution, installs the toolchain, Node.js, Docker
//! and the editor, then scaffolds the project tree with its compose file,
//! systemd unit, launcher scripts and README.  Every step is idempotent.
//!
//! The public API is organised into four layers:
//!
//! - **[`config`]**: config file, environment and flag resolution
//! - **[`resources`]**: idempotent `check + apply` primitives (tools, files, units, …)
//! - **[`tasks`]**: the ordered install steps wired to resources
//! - **[`commands`]**: top-level subcommand orchestration (`install`, `detect`, `version`)
#![deny(clippy::or_fun_call)]
#![deny(clippy::bool_to_int_with_if)]

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod exec;
pub mod fetch;
pub mod logging;
pub mod operations;
pub mod platform;
pub mod prompt;
pub mod resources;
pub mod scaffold;
pub mod tasks;

/// Installer version: `HEALING_SETUP_VERSION` from the build, else the crate
/// version.
#[must_use]
pub const fn version() -> &'static str {
    match option_env!("HEALING_SETUP_VERSION") {
        Some(v) => v,
        None => env!("CARGO_PKG_VERSION"),
    }
}
