// src/commands/source.rs

//! Source command - fetch and extract the upstream sources

use super::Inputs;
use crate::cli::{KitchenArgs, RecipeArgs};
use anyhow::{Context, Result};

/// Fetch the sources of the selected version
pub fn cmd_source(args: &RecipeArgs, kitchen_args: &KitchenArgs) -> Result<()> {
    let inputs = Inputs::resolve(args)?;
    let kitchen = inputs.kitchen(kitchen_args)?;

    let dir = kitchen
        .source(&inputs.options, &inputs.platform)
        .with_context(|| format!("Failed to fetch sources for {}", inputs.reference()))?;

    println!("[COMPLETE] Sources ready in {}", dir.display());
    Ok(())
}
