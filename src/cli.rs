//! Command-line interface definitions.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::config::{Preset, SshKeyMode};

/// Top-level CLI entry point for the healing platform installer.
#[derive(Parser, Debug)]
#[command(
    name = "healing-setup",
    about = "Provision a Linux host and scaffold the healing platform",
    version = crate::version()
)]
pub struct Cli {
    /// Subcommand to run (defaults to `install`)
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Options shared by every subcommand
    #[command(flatten)]
    pub global: GlobalOpts,
}

/// Options shared across all subcommands.
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOpts {
    /// Preview changes without applying
    #[arg(short = 'd', long, global = true)]
    pub dry_run: bool,

    /// Project root directory (overrides HEALING_ROOT and the config file)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Platform preset
    #[arg(short, long, global = true, value_enum)]
    pub preset: Option<Preset>,

    /// Config file (default: ~/.config/healing-setup/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Install dependencies and scaffold the project
    Install(InstallOpts),
    /// Print the detected package manager and distribution
    Detect,
    /// Print version information
    Version,
}

/// Options for the `install` subcommand.
#[derive(Parser, Debug, Clone, Default)]
pub struct InstallOpts {
    /// Skip specific steps
    #[arg(long, value_delimiter = ',')]
    pub skip: Vec<String>,

    /// Run only specific steps
    #[arg(long, value_delimiter = ',')]
    pub only: Vec<String>,

    /// When to generate an SSH key
    #[arg(long, value_enum)]
    pub ssh_key: Option<SshKeyMode>,

    /// Leave the database admin UI out of the compose file
    #[arg(long)]
    pub no_admin_ui: bool,
}
