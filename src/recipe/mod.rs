// src/recipe/mod.rs

//! Recipe for MariaDB Connector/C++
//!
//! The recipe turns requested options and a target platform into everything
//! needed to build and consume the connector:
//! - **Recipe**: declarative metadata (requirements, default options, sources)
//! - **Resolver**: validation, option normalization and dependency selection
//! - **Variables**: the CMake variables of the build
//! - **Patch**: source edits applied before configuring
//! - **Layout**: include/lib dirs and runtime environment of the package
//! - **Kitchen**: drives fetch, build and package through pluggable
//!   collaborators
//!
//! # Example Recipe
//!
//! ```toml
//! [package]
//! name = "mariadb-connector-cpp"
//! pkg_config_name = "libmariadbcpp"
//!
//! [options]
//! shared = false
//! fPIC = true
//! with_ssl = "openssl"
//!
//! [[requires]]
//! reference = "mariadb-connector-c/3.3.3"
//!
//! [[requires]]
//! reference = "openssl/[>=1.1 <4]"
//! when = { option = "with_ssl", equals = "openssl" }
//!
//! [sources."1.0.3"]
//! url = "https://github.com/mariadb-corporation/mariadb-connector-cpp/archive/refs/tags/1.0.3.tar.gz"
//! ```

mod format;
pub mod kitchen;
pub mod layout;
pub mod parser;
pub mod patch;
pub mod resolver;
pub mod variables;

pub use format::{OptionCondition, PackageSection, Recipe, RequirementSpec, SourceArchive};
pub use kitchen::{
    BuildResult, BuildTool, CmakeBuilder, DependencyInfo, HttpSourceFetcher, Kitchen,
    KitchenConfig, LocalRegistry, PackageRegistry, PackageResult, SourceFetcher,
};
pub use layout::{PLUGIN_DIR_ENV, PackageLayout, RuntimeEnvVar, collect_libs, lib_dirs};
pub use parser::{embedded_recipe, parse_recipe, parse_recipe_file, validate_recipe};
pub use patch::{PatchPlan, SourceEdit, patch_plan};
pub use resolver::{
    COMPILER_MINIMUMS, CompilerMinimums, ConfigResolver, DependencyRequirement, ValidatedOptions,
    normalize_options,
};
pub use variables::{BuildValue, BuildVariableSet, build_variables};
