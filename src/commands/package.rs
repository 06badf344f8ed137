// src/commands/package.rs

//! Package command - install the build and publish its layout

use super::Inputs;
use crate::cli::{KitchenArgs, RecipeArgs};
use anyhow::{Context, Result};
use mariadb_cpp_recipe::recipe::LocalRegistry;
use std::sync::Arc;

/// Install a finished build into its package folder
pub fn cmd_package(args: &RecipeArgs, kitchen_args: &KitchenArgs) -> Result<()> {
    let inputs = Inputs::resolve(args)?;
    let kitchen = inputs
        .kitchen(kitchen_args)?
        .with_registry(Arc::new(LocalRegistry::empty()));

    let result = kitchen
        .package(&inputs.options, &inputs.platform)
        .with_context(|| format!("Failed to package {}", inputs.reference()))?;

    if result.layout.libs.is_empty() {
        println!("Warning: no libraries found in the package folder");
    }
    for lib in &result.layout.libs {
        println!("  - {}", lib);
    }

    println!(
        "\n[COMPLETE] Packaged {} in {}",
        inputs.reference(),
        result.layout.package_folder.display()
    );
    println!("Layout written to {}", result.published.display());
    Ok(())
}
