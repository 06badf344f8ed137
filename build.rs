// build.rs

use clap::{Arg, ArgAction, Command};
use clap_mangen::Man;
use std::env;
use std::fs;
use std::path::PathBuf;

/// Arguments shared by every subcommand
fn recipe_args() -> Vec<Arg> {
    vec![
        Arg::new("recipe")
            .long("recipe")
            .value_name("PATH")
            .help("Recipe file (defaults to the embedded recipe)"),
        Arg::new("pkg_version")
            .long("pkg-version")
            .value_name("VERSION")
            .help("Connector version (defaults to the newest in the recipe)"),
        Arg::new("profile")
            .long("profile")
            .value_name("PATH")
            .help("Profile file with a [settings] table"),
        Arg::new("setting")
            .short('s')
            .long("setting")
            .value_name("NAME=VALUE")
            .action(ArgAction::Append)
            .help("Platform setting override"),
        Arg::new("option")
            .short('o')
            .long("option")
            .value_name("NAME=VALUE")
            .action(ArgAction::Append)
            .help("Option override"),
    ]
}

/// Kitchen location arguments
fn kitchen_args() -> Vec<Arg> {
    vec![
        Arg::new("cache_dir")
            .long("cache-dir")
            .value_name("PATH")
            .help("Root for sources, builds and packages"),
        Arg::new("jobs")
            .short('j')
            .long("jobs")
            .help("Number of parallel jobs"),
        Arg::new("cmake").long("cmake").help("CMake executable"),
    ]
}

fn build_cli() -> Command {
    Command::new("mariadb-cpp-recipe")
        .version(env!("CARGO_PKG_VERSION"))
        .author("mariadb-cpp-recipe Contributors")
        .about("Resolve, build and package MariaDB Connector/C++")
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .help("Enable debug logging (overridden by RUST_LOG)"),
        )
        .subcommand(
            Command::new("validate")
                .about("Check that the options and platform can be built")
                .args(recipe_args()),
        )
        .subcommand(
            Command::new("source")
                .about("Fetch and extract the upstream sources")
                .args(recipe_args())
                .args(kitchen_args()),
        )
        .subcommand(
            Command::new("build")
                .about("Patch, configure and compile the connector")
                .args(recipe_args())
                .args(kitchen_args())
                .arg(
                    Arg::new("registry")
                        .long("registry")
                        .required(true)
                        .value_name("PATH")
                        .help("Registry index listing dependency package folders"),
                ),
        )
        .subcommand(
            Command::new("package")
                .about("Install a finished build into its package folder and publish the layout")
                .args(recipe_args())
                .args(kitchen_args()),
        )
        .subcommand(
            Command::new("package-info")
                .about("Show the layout consumers of the package see")
                .args(recipe_args())
                .args(kitchen_args())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Print the layout as JSON"),
                ),
        )
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");

    let manifest_dir = match env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(e) => {
            println!("cargo:warning=CARGO_MANIFEST_DIR not set: {}", e);
            return;
        }
    };
    let man_dir = manifest_dir.join("man");

    if let Err(e) = fs::create_dir_all(&man_dir) {
        println!("cargo:warning=Failed to create man directory: {}", e);
        return;
    }

    let man = Man::new(build_cli());
    let mut buffer = Vec::new();

    if let Err(e) = man.render(&mut buffer) {
        println!("cargo:warning=Failed to render man page: {}", e);
        return;
    }

    let man_path = manifest_dir.join("man").join("mariadb-cpp-recipe.1");
    if let Err(e) = fs::write(&man_path, buffer) {
        println!("cargo:warning=Failed to write man page: {}", e);
    }
}
