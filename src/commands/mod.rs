// src/commands/mod.rs
//! Command handlers for the mariadb-cpp-recipe CLI

mod build;
mod package;
mod package_info;
mod source;
mod validate;

pub use build::cmd_build;
pub use package::cmd_package;
pub use package_info::cmd_package_info;
pub use source::cmd_source;
pub use validate::cmd_validate;

use crate::cli::{KitchenArgs, RecipeArgs};
use anyhow::{Context, Result, anyhow};
use mariadb_cpp_recipe::platform::{PlatformSettings, parse_profile_file};
use mariadb_cpp_recipe::recipe::{embedded_recipe, parse_recipe_file};
use mariadb_cpp_recipe::{Kitchen, KitchenConfig, OptionSet, PlatformDescriptor, Recipe};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Recipe, version, options and platform a command works on
pub struct Inputs {
    pub recipe: Recipe,
    pub version: String,
    pub options: OptionSet,
    pub platform: PlatformDescriptor,
}

impl Inputs {
    /// Resolve command-line arguments into concrete inputs
    ///
    /// Platform settings layer host detection, the profile, then `-s`
    /// overrides. Options layer recipe defaults, then `-o` overrides.
    pub fn resolve(args: &RecipeArgs) -> Result<Self> {
        let recipe = match &args.recipe {
            Some(path) => parse_recipe_file(Path::new(path))
                .with_context(|| format!("Failed to parse recipe: {}", path))?,
            None => embedded_recipe().context("Failed to parse embedded recipe")?,
        };

        let version = match &args.pkg_version {
            Some(version) => version.clone(),
            None => recipe
                .latest_version()
                .map(str::to_string)
                .ok_or_else(|| anyhow!("Recipe declares no versions; pass --pkg-version"))?,
        };

        let mut settings = PlatformSettings::host();
        if let Some(path) = &args.profile {
            let profile = parse_profile_file(Path::new(path))
                .with_context(|| format!("Failed to parse profile: {}", path))?;
            settings.apply_profile(&profile)?;
        }
        for assignment in &args.settings {
            settings.assign(assignment)?;
        }
        let platform = settings.resolve().context("Failed to resolve platform")?;

        let mut options = recipe.options.clone();
        for assignment in &args.options {
            options.assign(assignment)?;
        }

        debug!("Inputs: {} on {} with {}", version, platform, options);
        Ok(Self {
            recipe,
            version,
            options,
            platform,
        })
    }

    /// `name/version` of the package
    pub fn reference(&self) -> String {
        self.recipe.reference(&self.version)
    }

    /// Kitchen with the production collaborators
    pub fn kitchen(&self, args: &KitchenArgs) -> Result<Kitchen> {
        let mut config = match &args.cache_dir {
            Some(dir) => KitchenConfig::rooted_at(&PathBuf::from(dir)),
            None => KitchenConfig::default(),
        };
        if let Some(jobs) = args.jobs {
            config.jobs = jobs;
        }
        if let Some(cmake) = &args.cmake {
            config.cmake = PathBuf::from(cmake);
        }

        Kitchen::new(self.recipe.clone(), self.version.clone(), config)
            .context("Failed to set up the kitchen")
    }
}
