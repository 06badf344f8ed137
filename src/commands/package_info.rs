// src/commands/package_info.rs

//! Package-info command - show what consumers of the package see

use super::Inputs;
use crate::cli::{KitchenArgs, RecipeArgs};
use anyhow::{Context, Result};

/// Print the package layout for the selected configuration
pub fn cmd_package_info(args: &RecipeArgs, kitchen_args: &KitchenArgs, json: bool) -> Result<()> {
    let inputs = Inputs::resolve(args)?;
    let kitchen = inputs.kitchen(kitchen_args)?;

    let layout = kitchen
        .package_info(&inputs.options, &inputs.platform)
        .with_context(|| format!("Failed to compute layout of {}", inputs.reference()))?;

    if json {
        println!("{}", layout.to_json()?);
        return Ok(());
    }

    println!("Package:      {}", inputs.reference());
    println!("pkg-config:   {}", layout.pkg_config_name);
    println!("Folder:       {}", layout.package_folder.display());
    for dir in layout.include_paths() {
        println!("Include dir:  {}", dir.display());
    }
    for dir in layout.lib_paths() {
        println!("Lib dir:      {}", dir.display());
    }
    if layout.libs.is_empty() {
        println!("Libs:         (not packaged yet)");
    } else {
        println!("Libs:         {}", layout.libs.join(", "));
    }
    if !layout.system_libs.is_empty() {
        println!("System libs:  {}", layout.system_libs.join(", "));
    }
    for var in &layout.runtime_env {
        let current = std::env::var(&var.name).ok();
        println!("{}={}", var.name, var.apply(current.as_deref()));
    }
    Ok(())
}
