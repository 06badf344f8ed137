// src/recipe/resolver.rs

//! Configuration resolution
//!
//! Turns a requested option set and a target platform into everything the
//! build needs:
//! 1. **validate**: reject unsupported platforms and compilers
//! 2. **normalize**: drop options that do not apply
//! 3. **dependencies**: requirements, conditional ones filtered by options
//! 4. **variables / patches / layout**: see the sibling modules
//!
//! Every function here is pure; nothing touches the filesystem.

use crate::error::{Error, Result};
use crate::hash::sha256_hex;
use crate::options::OptionSet;
use crate::platform::{CompilerFamily, PlatformDescriptor};
use crate::recipe::format::{OptionCondition, Recipe};
use crate::recipe::layout::{PackageLayout, package_layout};
use crate::version::{Version, VersionRange};
use std::fmt;
use std::path::Path;
use tracing::debug;

/// Dependency providing the client headers injected into the build
pub const CONNECTOR_C_DEPENDENCY: &str = "mariadb-connector-c";

/// Minimum compiler version per family
///
/// Families missing from the table are accepted as-is.
#[derive(Debug, Clone, Copy)]
pub struct CompilerMinimums(pub &'static [(CompilerFamily, &'static str)]);

/// Compilers with complete C++11 support
pub const COMPILER_MINIMUMS: CompilerMinimums = CompilerMinimums(&[
    (CompilerFamily::VisualStudio, "16"),
    (CompilerFamily::Msvc, "192"),
    (CompilerFamily::Gcc, "9"),
    (CompilerFamily::Clang, "6"),
]);

impl CompilerMinimums {
    pub fn minimum_for(&self, family: CompilerFamily) -> Option<&'static str> {
        self.0
            .iter()
            .find(|(f, _)| *f == family)
            .map(|(_, version)| *version)
    }
}

/// A dependency on another package, possibly conditional on an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyRequirement {
    pub name: String,
    pub range: VersionRange,
    pub condition: Option<OptionCondition>,
}

impl DependencyRequirement {
    /// Parse a `name/version` or `name/[range]` reference
    pub fn parse(reference: &str) -> Result<Self> {
        let (name, range) = reference.trim().split_once('/').ok_or_else(|| {
            Error::ParseError(format!(
                "Invalid requirement '{}': expected name/version",
                reference
            ))
        })?;

        if name.is_empty() {
            return Err(Error::ParseError(format!(
                "Invalid requirement '{}': empty name",
                reference
            )));
        }

        Ok(Self {
            name: name.to_string(),
            range: VersionRange::parse(range)?,
            condition: None,
        })
    }

    /// Make the requirement conditional
    pub fn when(mut self, condition: OptionCondition) -> Self {
        self.condition = Some(condition);
        self
    }

    /// Whether the requirement applies to an option set
    pub fn applies_to(&self, options: &OptionSet) -> bool {
        self.condition.as_ref().is_none_or(|c| c.holds(options))
    }
}

impl fmt::Display for DependencyRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.name, self.range)
    }
}

/// Options that passed validation, already normalized for their platform
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedOptions {
    options: OptionSet,
    platform: PlatformDescriptor,
}

impl ValidatedOptions {
    pub fn options(&self) -> &OptionSet {
        &self.options
    }

    pub fn platform(&self) -> &PlatformDescriptor {
        &self.platform
    }

    /// Stable identifier of this configuration, used to name build and
    /// package folders
    pub fn package_id(&self) -> String {
        let digest = sha256_hex(format!("{}|{}", self.options, self.platform).as_bytes());
        digest[..16].to_string()
    }
}

/// Drop options that do not apply to the platform or build kind
///
/// Removes `fPIC` on Windows and for shared builds. Idempotent.
pub fn normalize_options(options: &OptionSet, platform: &PlatformDescriptor) -> OptionSet {
    options.normalized(platform)
}

/// Resolves a recipe version against options and a platform
pub struct ConfigResolver<'a> {
    recipe: &'a Recipe,
    version: String,
}

impl<'a> ConfigResolver<'a> {
    pub fn new(recipe: &'a Recipe, version: impl Into<String>) -> Self {
        Self {
            recipe,
            version: version.into(),
        }
    }

    /// `name/version` of the package being resolved
    pub fn reference(&self) -> String {
        self.recipe.reference(&self.version)
    }

    /// Validate options and platform, returning normalized options
    ///
    /// Windows is rejected before the compiler is looked at.
    pub fn validate(
        &self,
        options: &OptionSet,
        platform: &PlatformDescriptor,
        minimums: &CompilerMinimums,
    ) -> Result<ValidatedOptions> {
        if platform.is_windows() {
            return Err(Error::UnsupportedPlatform {
                package: self.reference(),
                os: platform.os.to_string(),
            });
        }

        let family = platform.compiler.family;
        if let Some(minimum) = minimums.minimum_for(family) {
            let minimum = Version::parse(minimum)?;
            if platform.compiler.version < minimum {
                return Err(Error::CompilerTooOld {
                    package: self.reference(),
                    compiler: family.to_string(),
                    version: platform.compiler.version.to_string(),
                    minimum: minimum.to_string(),
                });
            }
        }

        let options = normalize_options(options, platform);
        debug!("Validated {} for {}: {}", self.reference(), platform, options);

        Ok(ValidatedOptions {
            options,
            platform: platform.clone(),
        })
    }

    /// Requirements that apply to the given options, in recipe order
    pub fn resolve_dependencies(&self, options: &OptionSet) -> Result<Vec<DependencyRequirement>> {
        let mut requirements = Vec::new();

        for spec in &self.recipe.requires {
            let mut requirement = DependencyRequirement::parse(&spec.reference)?;
            if let Some(condition) = &spec.when {
                requirement = requirement.when(condition.clone());
            }

            if requirement.applies_to(options) {
                requirements.push(requirement);
            } else {
                debug!("Skipping conditional requirement {}", requirement);
            }
        }

        Ok(requirements)
    }

    /// Layout consumers see once the package folder is populated
    ///
    /// Library names are left empty; see [`crate::recipe::collect_libs`].
    pub fn package_layout(
        &self,
        platform: &PlatformDescriptor,
        package_folder: &Path,
    ) -> PackageLayout {
        package_layout(self.recipe.pkg_config_name(), platform, package_folder)
    }
}
