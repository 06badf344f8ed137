// src/recipe/kitchen/mod.rs

//! Kitchen: drives the source, build and package steps of the recipe
//!
//! The Kitchen owns no build logic of its own. It resolves a configuration
//! with [`ConfigResolver`] and hands the results to three collaborators:
//! - a [`SourceFetcher`] that produces the upstream source tree
//! - a [`BuildTool`] that configures, compiles and installs it
//! - a [`PackageRegistry`] that supplies dependencies and receives the
//!   published layout
//!
//! Every step validates first, so an unsupported platform or compiler fails
//! before any download or filesystem work starts. Every step is idempotent:
//! `build` always patches a fresh copy of the pristine sources, and build
//! folders are keyed by version and configuration.

mod builder;
mod config;
mod fetch;
mod registry;

pub use builder::{BuildTool, CmakeBuilder};
pub use config::KitchenConfig;
pub use fetch::{HttpSourceFetcher, SourceFetcher, extract_tar_gz};
pub use registry::{DependencyInfo, LocalRegistry, PUBLISHED_LAYOUT_FILE, PackageRegistry};

use crate::error::{Error, Result};
use crate::options::OptionSet;
use crate::platform::PlatformDescriptor;
use crate::recipe::format::Recipe;
use crate::recipe::layout::PackageLayout;
use crate::recipe::patch::{PatchPlan, patch_plan};
use crate::recipe::resolver::{
    COMPILER_MINIMUMS, CONNECTOR_C_DEPENDENCY, CompilerMinimums, ConfigResolver, ValidatedOptions,
};
use crate::recipe::variables::build_variables;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// Marker written once a source tree is fully extracted
const SOURCE_MARKER: &str = ".complete";

/// Files from the upstream install that are not part of the package
const INSTALL_LEFTOVERS: &[&str] = &["INFO_SRC", "INFO_BIN"];

/// Result of the build step
#[derive(Debug)]
pub struct BuildResult {
    /// Identifier of the resolved configuration
    pub package_id: String,
    /// Patched source tree the build ran on
    pub work_dir: PathBuf,
    /// CMake binary directory
    pub build_dir: PathBuf,
    /// Dependencies the build was configured against
    pub dependencies: Vec<DependencyInfo>,
    /// Edits applied to the sources
    pub patch: PatchPlan,
    /// Build tool output
    pub log: String,
}

/// Result of the package step
#[derive(Debug)]
pub struct PackageResult {
    pub package_id: String,
    pub layout: PackageLayout,
    /// Where the registry wrote the layout
    pub published: PathBuf,
    pub log: String,
}

/// The Kitchen: where the connector is cooked
pub struct Kitchen {
    config: KitchenConfig,
    recipe: Recipe,
    version: String,
    minimums: CompilerMinimums,
    fetcher: Arc<dyn SourceFetcher>,
    builder: Arc<dyn BuildTool>,
    registry: Arc<dyn PackageRegistry>,
}

impl Kitchen {
    /// Create a Kitchen with the production collaborators
    ///
    /// The registry starts empty; set one with [`Kitchen::with_registry`]
    /// before building.
    pub fn new(recipe: Recipe, version: impl Into<String>, config: KitchenConfig) -> Result<Self> {
        let fetcher = HttpSourceFetcher::new(config.archive_dir())?;
        let builder = CmakeBuilder::new(config.cmake.clone());

        Ok(Self {
            config,
            recipe,
            version: version.into(),
            minimums: COMPILER_MINIMUMS,
            fetcher: Arc::new(fetcher),
            builder: Arc::new(builder),
            registry: Arc::new(LocalRegistry::empty()),
        })
    }

    pub fn with_fetcher(mut self, fetcher: Arc<dyn SourceFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_builder(mut self, builder: Arc<dyn BuildTool>) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_registry(mut self, registry: Arc<dyn PackageRegistry>) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_minimums(mut self, minimums: CompilerMinimums) -> Self {
        self.minimums = minimums;
        self
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    /// `name/version` of the package being cooked
    pub fn reference(&self) -> String {
        self.recipe.reference(&self.version)
    }

    fn resolver(&self) -> ConfigResolver<'_> {
        ConfigResolver::new(&self.recipe, self.version.clone())
    }

    /// Validate and normalize options for a platform
    pub fn validate(
        &self,
        options: &OptionSet,
        platform: &PlatformDescriptor,
    ) -> Result<ValidatedOptions> {
        self.resolver().validate(options, platform, &self.minimums)
    }

    /// Make sure the pristine source tree of the version is present
    ///
    /// Validates the configuration first, then returns the source
    /// directory. A tree left behind by an interrupted fetch has no marker
    /// and is fetched again.
    pub fn source(&self, options: &OptionSet, platform: &PlatformDescriptor) -> Result<PathBuf> {
        self.validate(options, platform)?;
        self.fetch_source()
    }

    fn fetch_source(&self) -> Result<PathBuf> {
        let dir = self.config.source_dir(&self.version);
        if dir.join(SOURCE_MARKER).exists() {
            debug!("Sources for {} already present", self.reference());
            return Ok(dir);
        }

        let source = self.recipe.source(&self.version).ok_or_else(|| {
            Error::FetchFailure(format!("No source archive for {}", self.reference()))
        })?;

        info!("Fetching sources for {}", self.reference());
        if let Some(parent) = dir.parent() {
            fs::create_dir_all(parent)?;
        }
        self.fetcher.fetch(source, &dir)?;
        fs::write(dir.join(SOURCE_MARKER), source.url.as_bytes())?;

        Ok(dir)
    }

    /// Resolve dependencies, patch a fresh copy of the sources, configure
    /// and compile
    pub fn build(&self, options: &OptionSet, platform: &PlatformDescriptor) -> Result<BuildResult> {
        let validated = self.validate(options, platform)?;
        let options = validated.options();
        let package_id = validated.package_id();
        info!("Building {} ({})", self.reference(), package_id);

        let dependencies = self
            .resolver()
            .resolve_dependencies(options)?
            .iter()
            .map(|req| self.registry.dependency_info(req))
            .collect::<Result<Vec<_>>>()?;

        let connector = dependencies
            .iter()
            .find(|d| d.name == CONNECTOR_C_DEPENDENCY)
            .ok_or_else(|| Error::DependencyResolutionFailure {
                requirement: CONNECTOR_C_DEPENDENCY.to_string(),
                reason: "not required by the recipe".to_string(),
            })?;

        let source_dir = self.fetch_source()?;
        let work_dir = self.config.work_dir(&self.version, &package_id);
        copy_tree(&source_dir, &work_dir)?;

        let patch = patch_plan(options, &connector.include_dir());
        patch.apply(&work_dir)?;

        let mut variables = build_variables(options, platform);
        let prefix_path: Vec<String> = dependencies
            .iter()
            .map(|d| d.package_folder.display().to_string())
            .collect();
        variables.set("CMAKE_PREFIX_PATH", prefix_path.join(";"));

        let build_dir = self.config.build_dir(&self.version, &package_id);
        fs::create_dir_all(&build_dir)?;

        let mut log = self.builder.configure(&work_dir, &build_dir, &variables)?;
        log.push_str(
            &self
                .builder
                .build(&build_dir, platform.build_type, self.config.jobs)?,
        );

        info!("Built {} in {}", self.reference(), build_dir.display());
        Ok(BuildResult {
            package_id,
            work_dir,
            build_dir,
            dependencies,
            patch,
            log,
        })
    }

    /// Install a finished build into its package folder and publish the
    /// layout
    pub fn package(
        &self,
        options: &OptionSet,
        platform: &PlatformDescriptor,
    ) -> Result<PackageResult> {
        let validated = self.validate(options, platform)?;
        let package_id = validated.package_id();

        let build_dir = self.config.build_dir(&self.version, &package_id);
        if !build_dir.is_dir() {
            return Err(Error::ExternalBuildFailure {
                phase: "install".to_string(),
                reason: format!("no build found in {}", build_dir.display()),
            });
        }

        let package_dir = self.config.package_dir(&self.version, &package_id);
        let log = self
            .builder
            .install(&build_dir, platform.build_type, &package_dir)?;

        self.copy_license(&package_dir)?;

        for leftover in INSTALL_LEFTOVERS {
            let path = package_dir.join(leftover);
            if path.exists() {
                debug!("Removing {}", path.display());
                fs::remove_file(&path)?;
            }
        }

        let layout = self
            .resolver()
            .package_layout(platform, &package_dir)
            .collect_libs()?;
        if layout.libs.is_empty() {
            warn!("No libraries found in {}", package_dir.display());
        }

        let published = self.registry.publish(&self.reference(), &layout)?;

        Ok(PackageResult {
            package_id,
            layout,
            published,
            log,
        })
    }

    /// Layout of the package folder for a configuration
    ///
    /// Libraries are collected only when the package folder exists.
    pub fn package_info(
        &self,
        options: &OptionSet,
        platform: &PlatformDescriptor,
    ) -> Result<PackageLayout> {
        let validated = self.validate(options, platform)?;
        let package_dir = self
            .config
            .package_dir(&self.version, &validated.package_id());

        let layout = self.resolver().package_layout(platform, &package_dir);
        if package_dir.is_dir() {
            layout.collect_libs()
        } else {
            Ok(layout)
        }
    }

    fn copy_license(&self, package_dir: &Path) -> Result<()> {
        let name = &self.recipe.package.license_file;
        let license = self.config.source_dir(&self.version).join(name);
        if !license.is_file() {
            warn!("License file {} not found", license.display());
            return Ok(());
        }

        let licenses = package_dir.join("licenses");
        fs::create_dir_all(&licenses)?;
        fs::copy(&license, licenses.join(name))?;
        Ok(())
    }
}

/// Replace `dst` with a copy of `src`, skipping the source marker
fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        fs::remove_dir_all(dst)?;
    }
    fs::create_dir_all(dst)?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry
            .map_err(|e| Error::IoError(format!("Failed to walk {}: {}", src.display(), e)))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .map_err(|e| Error::IoError(format!("Bad path in {}: {}", src.display(), e)))?;
        if relative == Path::new(SOURCE_MARKER) {
            continue;
        }

        let target = dst.join(relative);
        let file_type = entry.file_type();
        if file_type.is_dir() {
            fs::create_dir_all(&target)?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }

    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to = fs::read_link(link)?;
    std::os::unix::fs::symlink(points_to, target)?;
    Ok(())
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    fs::copy(link, target)?;
    Ok(())
}
