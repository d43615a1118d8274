//! `healing-setup` binary entry point.
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;

use healing_setup::cli::{self, Command};
use healing_setup::commands;
use healing_setup::logging::{self, Logger};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = cli::Cli::parse();

    match args.command {
        None => install(&args.global, &cli::InstallOpts::default(), args.verbose),
        Some(Command::Install(opts)) => install(&args.global, &opts, args.verbose),
        Some(Command::Detect) => {
            commands::detect::run();
            Ok(())
        }
        Some(Command::Version) => {
            commands::version::run();
            Ok(())
        }
    }
}

fn install(global: &cli::GlobalOpts, opts: &cli::InstallOpts, verbose: bool) -> Result<()> {
    logging::init_subscriber(verbose, "install");
    let log = Arc::new(Logger::new("install"));
    commands::install::run(global, opts, &log)
}
