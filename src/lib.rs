// src/lib.rs

//! mariadb-cpp-recipe
//!
//! Package recipe for the MariaDB Connector/C++ library. It resolves
//! requested options against a target platform, then drives CMake to build
//! the connector and publishes the resulting package layout.
//!
//! # Architecture
//!
//! - Pure resolution: validation, dependencies, build variables, source
//!   patches and package layout are computed without side effects
//! - Narrow collaborators: fetching, building and the package registry sit
//!   behind traits so the Kitchen can be exercised without a toolchain
//! - Fresh per invocation: nothing persists between runs except the source
//!   cache and build folders

mod error;
pub mod hash;
pub mod options;
pub mod platform;
pub mod recipe;
pub mod version;

pub use error::{Error, Result};
pub use options::{OptionSet, SslBackend};
pub use platform::{
    Arch, BuildType, Compiler, CompilerFamily, Os, PlatformDescriptor, PlatformSettings,
};
pub use recipe::{
    COMPILER_MINIMUMS, ConfigResolver, Kitchen, KitchenConfig, PackageLayout, Recipe,
};
pub use version::{Version, VersionRange};
