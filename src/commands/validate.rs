// src/commands/validate.rs

//! Validate command - check a configuration without building

use super::Inputs;
use crate::cli::RecipeArgs;
use anyhow::{Context, Result};
use mariadb_cpp_recipe::recipe::{
    COMPILER_MINIMUMS, ConfigResolver, build_variables, validate_recipe,
};

/// Validate the recipe, options and platform
pub fn cmd_validate(args: &RecipeArgs) -> Result<()> {
    let inputs = Inputs::resolve(args)?;

    let warnings = validate_recipe(&inputs.recipe).context("Recipe validation failed")?;
    for warning in &warnings {
        println!("Warning: {}", warning);
    }

    let resolver = ConfigResolver::new(&inputs.recipe, inputs.version.clone());
    let validated = resolver
        .validate(&inputs.options, &inputs.platform, &COMPILER_MINIMUMS)
        .with_context(|| format!("Cannot build {}", inputs.reference()))?;

    println!("Package:  {}", inputs.reference());
    println!("Platform: {}", validated.platform());
    println!("Options:  {}", validated.options());
    println!("Id:       {}", validated.package_id());

    println!("\nRequires:");
    for requirement in resolver.resolve_dependencies(validated.options())? {
        println!("  - {}", requirement);
    }

    println!("\nBuild variables:");
    let variables = build_variables(validated.options(), validated.platform());
    for (name, value) in variables.iter().chain(variables.iter_cache()) {
        println!("  {} = {}", name, value);
    }

    if warnings.is_empty() {
        println!("\n[OK] No issues found");
    } else {
        println!("\n[OK] {} warning(s)", warnings.len());
    }
    Ok(())
}
