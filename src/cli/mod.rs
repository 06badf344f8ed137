// src/cli/mod.rs
//! CLI definitions for mariadb-cpp-recipe
//!
//! This module contains the command-line interface definitions using clap.
//! The command implementations are in the `commands` module.
//!
//! Every command resolves the same inputs first:
//! - the recipe (embedded, or `--recipe <file>`)
//! - the platform (host detection, then `--profile`, then `-s name=value`)
//! - the options (recipe defaults, then `-o name=value`)

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mariadb-cpp-recipe")]
#[command(author = "mariadb-cpp-recipe Contributors")]
#[command(version)]
#[command(about = "Resolve, build and package MariaDB Connector/C++", long_about = None)]
pub struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Inputs shared by every command
#[derive(Args, Debug, Clone, Default)]
pub struct RecipeArgs {
    /// Recipe file (defaults to the embedded recipe)
    #[arg(long)]
    pub recipe: Option<String>,

    /// Connector version (defaults to the newest in the recipe)
    #[arg(long = "pkg-version")]
    pub pkg_version: Option<String>,

    /// Profile file with a [settings] table
    #[arg(long)]
    pub profile: Option<String>,

    /// Platform setting override, e.g. -s compiler.version=11
    #[arg(short = 's', long = "setting", value_name = "NAME=VALUE")]
    pub settings: Vec<String>,

    /// Option override, e.g. -o shared=True
    #[arg(short = 'o', long = "option", value_name = "NAME=VALUE")]
    pub options: Vec<String>,
}

/// Kitchen locations
#[derive(Args, Debug, Clone, Default)]
pub struct KitchenArgs {
    /// Root for sources, builds and packages (defaults to the user cache dir)
    #[arg(long)]
    pub cache_dir: Option<String>,

    /// Number of parallel jobs (default: auto)
    #[arg(short, long)]
    pub jobs: Option<u32>,

    /// CMake executable
    #[arg(long)]
    pub cmake: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the options and platform can be built
    Validate {
        #[command(flatten)]
        recipe: RecipeArgs,
    },

    /// Fetch and extract the upstream sources
    Source {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        kitchen: KitchenArgs,
    },

    /// Patch, configure and compile the connector
    Build {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        kitchen: KitchenArgs,

        /// Registry index (TOML) listing dependency package folders
        #[arg(long)]
        registry: String,
    },

    /// Install a finished build into its package folder and publish the layout
    Package {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        kitchen: KitchenArgs,
    },

    /// Show the layout consumers of the package see
    PackageInfo {
        #[command(flatten)]
        recipe: RecipeArgs,

        #[command(flatten)]
        kitchen: KitchenArgs,

        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },
}
