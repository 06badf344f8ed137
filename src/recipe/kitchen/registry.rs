// src/recipe/kitchen/registry.rs

//! Package registry access
//!
//! The registry supplies the folders of already-built dependencies and
//! accepts the layout of the package once it is built. [`LocalRegistry`]
//! reads a TOML index of dependency folders:
//!
//! ```toml
//! [packages.mariadb-connector-c]
//! version = "3.3.3"
//! package_folder = "/opt/deps/mariadb-connector-c"
//! include_dirs = ["include"]
//! lib_dirs = ["lib"]
//! ```

use crate::error::{Error, Result};
use crate::recipe::layout::PackageLayout;
use crate::recipe::resolver::DependencyRequirement;
use crate::version::Version;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// File written into a package folder on publish
pub const PUBLISHED_LAYOUT_FILE: &str = "package_info.json";

/// What the registry knows about one dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyInfo {
    pub name: String,
    pub version: Version,
    pub package_folder: PathBuf,
    pub include_dirs: Vec<String>,
    pub lib_dirs: Vec<String>,
}

impl DependencyInfo {
    /// First include directory, as an absolute path
    pub fn include_dir(&self) -> PathBuf {
        match self.include_dirs.first() {
            Some(dir) => self.package_folder.join(dir),
            None => self.package_folder.join("include"),
        }
    }
}

/// Trait for the registry collaborator
pub trait PackageRegistry: Send + Sync {
    /// Look up a dependency satisfying `requirement`
    fn dependency_info(&self, requirement: &DependencyRequirement) -> Result<DependencyInfo>;

    /// Publish the layout of a built package, returning where it was written
    fn publish(&self, reference: &str, layout: &PackageLayout) -> Result<PathBuf>;
}

#[derive(Debug, Default, Deserialize)]
struct RegistryIndex {
    #[serde(default)]
    packages: BTreeMap<String, IndexEntry>,
}

#[derive(Debug, Deserialize)]
struct IndexEntry {
    version: String,
    package_folder: PathBuf,
    #[serde(default = "default_include_dirs")]
    include_dirs: Vec<String>,
    #[serde(default = "default_lib_dirs")]
    lib_dirs: Vec<String>,
}

fn default_include_dirs() -> Vec<String> {
    vec!["include".to_string()]
}

fn default_lib_dirs() -> Vec<String> {
    vec!["lib".to_string()]
}

/// Registry backed by a TOML index on disk
#[derive(Debug)]
pub struct LocalRegistry {
    index: RegistryIndex,
    base_dir: PathBuf,
}

impl LocalRegistry {
    /// Load an index file; relative package folders are resolved against
    /// the index's directory
    pub fn open(index_path: &Path) -> Result<Self> {
        let content = fs::read_to_string(index_path).map_err(|e| {
            Error::IoError(format!(
                "Failed to read registry index {}: {}",
                index_path.display(),
                e
            ))
        })?;
        let base_dir = index_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Self::from_toml(&content, base_dir)
    }

    pub fn from_toml(content: &str, base_dir: impl Into<PathBuf>) -> Result<Self> {
        let index: RegistryIndex = toml::from_str(content)
            .map_err(|e| Error::ParseError(format!("Invalid registry index: {}", e)))?;
        Ok(Self {
            index,
            base_dir: base_dir.into(),
        })
    }

    /// Registry with no dependencies; only publishing works
    pub fn empty() -> Self {
        Self {
            index: RegistryIndex::default(),
            base_dir: PathBuf::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.index.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.packages.is_empty()
    }
}

impl PackageRegistry for LocalRegistry {
    fn dependency_info(&self, requirement: &DependencyRequirement) -> Result<DependencyInfo> {
        let failure = |reason: String| Error::DependencyResolutionFailure {
            requirement: requirement.to_string(),
            reason,
        };

        let entry = self
            .index
            .packages
            .get(&requirement.name)
            .ok_or_else(|| failure("not in registry".to_string()))?;

        let version = Version::parse(&entry.version)
            .map_err(|e| failure(format!("bad version '{}': {}", entry.version, e)))?;
        if !requirement.range.satisfies(&version) {
            return Err(failure(format!(
                "registry has {} which does not satisfy {}",
                version, requirement.range
            )));
        }

        let package_folder = self.base_dir.join(&entry.package_folder);
        if !package_folder.is_dir() {
            return Err(failure(format!(
                "package folder {} does not exist",
                package_folder.display()
            )));
        }

        debug!("{} -> {}", requirement, package_folder.display());
        Ok(DependencyInfo {
            name: requirement.name.clone(),
            version,
            package_folder,
            include_dirs: entry.include_dirs.clone(),
            lib_dirs: entry.lib_dirs.clone(),
        })
    }

    fn publish(&self, reference: &str, layout: &PackageLayout) -> Result<PathBuf> {
        let path = layout.package_folder.join(PUBLISHED_LAYOUT_FILE);
        fs::create_dir_all(&layout.package_folder)?;
        fs::write(&path, layout.to_json()?).map_err(|e| {
            Error::IoError(format!("Failed to write {}: {}", path.display(), e))
        })?;

        info!("Published {} to {}", reference, path.display());
        Ok(path)
    }
}
