//! CLI module for the CSV batch loader.
//!
//! This module handles command-line argument parsing, logging setup and
//! dispatch to the load command.

pub mod load;

use std::path::PathBuf;

use clap::Parser;

/// Version string with git hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

include!("definition.rs");

/// Run the CLI application
pub fn run() {
    let cli = Cli::parse();
    init_logging(cli.quiet);
    load::run(&cli);
}

fn init_logging(quiet: bool) {
    let default_level = if quiet { "warn" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_target(false)
        .init();
}
