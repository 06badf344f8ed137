// src/recipe/layout.rs

//! Package layout seen by consumers
//!
//! Describes where headers and libraries live inside a package folder, which
//! system libraries must be linked alongside, and the runtime environment
//! the connector needs to locate its authentication plugins.

use crate::error::{Error, Result};
use crate::platform::{BuildType, PlatformDescriptor};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Environment variable the connector reads to find its plugins
pub const PLUGIN_DIR_ENV: &str = "MARIADB_PLUGIN_DIR";

/// Plugin directory, relative to the package folder
pub const PLUGIN_DIR: &str = "lib/plugin";

/// Library file extensions picked up by [`collect_libs`]
const LIB_EXTENSIONS: &[&str] = &["so", "a", "dylib", "lib"];

/// A path-list environment variable extended by prepending one entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeEnvVar {
    pub name: String,
    pub value: String,
    pub separator: char,
}

impl RuntimeEnvVar {
    /// Prepend `value` to an existing variable value
    ///
    /// Existing entries are kept; a duplicate of `value` further down the
    /// list is dropped so repeated application is stable.
    pub fn apply(&self, existing: Option<&str>) -> String {
        let mut entries = vec![self.value.as_str()];
        if let Some(existing) = existing {
            entries.extend(
                existing
                    .split(self.separator)
                    .filter(|e| !e.is_empty() && *e != self.value),
            );
        }
        entries.join(&self.separator.to_string())
    }
}

/// Everything a consumer needs to link against the package
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageLayout {
    pub pkg_config_name: String,
    pub package_folder: PathBuf,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
    pub libs: Vec<String>,
    pub system_libs: Vec<String>,
    pub plugin_dir: PathBuf,
    pub runtime_env: Vec<RuntimeEnvVar>,
}

impl PackageLayout {
    /// Replace the library list
    pub fn with_libs(mut self, libs: Vec<String>) -> Self {
        self.libs = libs;
        self
    }

    /// Fill the library list by scanning the package folder
    pub fn collect_libs(self) -> Result<Self> {
        let libs = collect_libs(&self.package_folder, &self.lib_dirs)?;
        Ok(self.with_libs(libs))
    }

    /// Absolute include directories
    pub fn include_paths(&self) -> Vec<PathBuf> {
        self.include_dirs
            .iter()
            .map(|d| self.package_folder.join(d))
            .collect()
    }

    /// Absolute library directories
    pub fn lib_paths(&self) -> Vec<PathBuf> {
        self.lib_dirs
            .iter()
            .map(|d| self.package_folder.join(d))
            .collect()
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::ParseError(format!("Failed to serialize layout: {}", e)))
    }

    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid layout: {}", e)))
    }
}

/// Library directories for a build type, relative to the package folder
pub fn lib_dirs(build_type: BuildType) -> Vec<String> {
    let dirs: &[&str] = match build_type {
        BuildType::Debug => &["lib64/debug", "lib/debug"],
        _ => &["lib64", "lib"],
    };
    dirs.iter().map(|d| d.to_string()).collect()
}

/// Layout of a package folder for a platform
///
/// The library list starts empty; see [`collect_libs`].
pub fn package_layout(
    pkg_config_name: &str,
    platform: &PlatformDescriptor,
    package_folder: &Path,
) -> PackageLayout {
    let system_libs = if platform.is_posix() {
        vec!["m".to_string(), "resolv".to_string()]
    } else {
        Vec::new()
    };

    let plugin_dir = package_folder.join(PLUGIN_DIR);

    PackageLayout {
        pkg_config_name: pkg_config_name.to_string(),
        package_folder: package_folder.to_path_buf(),
        include_dirs: vec!["include".to_string(), "include/mariadb".to_string()],
        lib_dirs: lib_dirs(platform.build_type),
        libs: Vec::new(),
        system_libs,
        runtime_env: vec![RuntimeEnvVar {
            name: PLUGIN_DIR_ENV.to_string(),
            value: plugin_dir.to_string_lossy().into_owned(),
            separator: platform.path_separator(),
        }],
        plugin_dir,
    }
}

/// Names of the libraries found directly inside the given library dirs
///
/// Names are stripped of their `lib` prefix and extension, then sorted and
/// deduplicated. Missing directories are skipped.
pub fn collect_libs(package_folder: &Path, lib_dirs: &[String]) -> Result<Vec<String>> {
    let mut libs = Vec::new();

    for dir in lib_dirs {
        let dir = package_folder.join(dir);
        if !dir.is_dir() {
            continue;
        }

        for entry in WalkDir::new(&dir).min_depth(1).max_depth(1) {
            let entry = entry.map_err(|e| {
                Error::IoError(format!("Failed to scan {}: {}", dir.display(), e))
            })?;
            if entry.file_type().is_dir() {
                continue;
            }
            if let Some(name) = library_name(entry.path()) {
                debug!("Found library {} in {}", name, dir.display());
                libs.push(name);
            }
        }
    }

    libs.sort();
    libs.dedup();
    Ok(libs)
}

/// `libfoo.so.1.2` -> `foo`, `foo.lib` -> `foo`
fn library_name(path: &Path) -> Option<String> {
    let file_name = path.file_name()?.to_str()?;
    let mut parts = file_name.split('.');
    let stem = parts.next()?;
    if !parts.any(|ext| LIB_EXTENSIONS.contains(&ext)) {
        return None;
    }

    let name = stem.strip_prefix("lib").unwrap_or(stem);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}
