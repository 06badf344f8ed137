// src/main.rs

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match cli.command {
        Commands::Validate { recipe } => commands::cmd_validate(&recipe),
        Commands::Source { recipe, kitchen } => commands::cmd_source(&recipe, &kitchen),
        Commands::Build {
            recipe,
            kitchen,
            registry,
        } => commands::cmd_build(&recipe, &kitchen, &registry),
        Commands::Package { recipe, kitchen } => commands::cmd_package(&recipe, &kitchen),
        Commands::PackageInfo {
            recipe,
            kitchen,
            json,
        } => commands::cmd_package_info(&recipe, &kitchen, json),
    }
}
