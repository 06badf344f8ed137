// src/commands/build.rs

//! Build command - patch, configure and compile the connector

use super::Inputs;
use crate::cli::{KitchenArgs, RecipeArgs};
use anyhow::{Context, Result};
use mariadb_cpp_recipe::recipe::LocalRegistry;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// Build the connector against the dependencies listed in a registry index
pub fn cmd_build(args: &RecipeArgs, kitchen_args: &KitchenArgs, registry: &str) -> Result<()> {
    let inputs = Inputs::resolve(args)?;
    let registry = LocalRegistry::open(Path::new(registry))
        .with_context(|| format!("Failed to open registry index: {}", registry))?;
    let kitchen = inputs
        .kitchen(kitchen_args)?
        .with_registry(Arc::new(registry));

    println!(
        "Building {} for {} with {} parallel jobs...",
        inputs.reference(),
        inputs.platform,
        kitchen.config().jobs
    );

    let result = kitchen
        .build(&inputs.options, &inputs.platform)
        .with_context(|| format!("Failed to build {}", inputs.reference()))?;

    for dependency in &result.dependencies {
        println!("  - {} {}", dependency.name, dependency.version);
    }
    println!("  - {} source edit(s) applied", result.patch.len());

    println!("\n[COMPLETE] Built {} in {}", inputs.reference(), result.build_dir.display());
    info!("Build {} finished ({} bytes of log)", result.package_id, result.log.len());
    Ok(())
}
