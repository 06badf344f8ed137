// src/recipe/kitchen/config.rs

//! Configuration types for the Kitchen

use std::path::{Path, PathBuf};

/// Directory name used under the user cache directory
const CACHE_DIR_NAME: &str = "mariadb-cpp-recipe";

/// Configuration for the Kitchen
#[derive(Debug, Clone)]
pub struct KitchenConfig {
    /// Downloaded archives and extracted source trees
    pub source_cache: PathBuf,
    /// Per-configuration build directories
    pub build_root: PathBuf,
    /// Per-configuration package folders
    pub package_root: PathBuf,
    /// Number of parallel build jobs
    pub jobs: u32,
    /// CMake executable
    pub cmake: PathBuf,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        let jobs = std::thread::available_parallelism()
            .map(|p| p.get() as u32)
            .unwrap_or(4);

        let base = dirs::cache_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join(CACHE_DIR_NAME);

        Self {
            source_cache: base.join("sources"),
            build_root: base.join("build"),
            package_root: base.join("packages"),
            jobs,
            cmake: PathBuf::from("cmake"),
        }
    }
}

impl KitchenConfig {
    /// Configuration with every directory under one root
    pub fn rooted_at(root: &Path) -> Self {
        Self {
            source_cache: root.join("sources"),
            build_root: root.join("build"),
            package_root: root.join("packages"),
            ..Self::default()
        }
    }

    /// Downloaded archives
    pub fn archive_dir(&self) -> PathBuf {
        self.source_cache.join("archives")
    }

    /// Extracted, unpatched source tree of a version
    pub fn source_dir(&self, version: &str) -> PathBuf {
        self.source_cache.join(format!("src-{}", version))
    }

    /// Patched copy of the sources for one configuration of a version
    pub fn work_dir(&self, version: &str, package_id: &str) -> PathBuf {
        self.build_root.join(version).join(package_id).join("src")
    }

    /// CMake binary directory for one configuration of a version
    pub fn build_dir(&self, version: &str, package_id: &str) -> PathBuf {
        self.build_root.join(version).join(package_id).join("build")
    }

    /// Package folder for one configuration
    pub fn package_dir(&self, version: &str, package_id: &str) -> PathBuf {
        self.package_root.join(version).join(package_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kitchen_config_default() {
        let config = KitchenConfig::default();
        assert!(config.jobs > 0);
        assert_eq!(config.cmake, PathBuf::from("cmake"));
        assert!(config.source_cache.ends_with("mariadb-cpp-recipe/sources"));
    }

    #[test]
    fn test_kitchen_config_rooted_at() {
        let config = KitchenConfig::rooted_at(Path::new("/tmp/kitchen"));
        assert_eq!(
            config.archive_dir(),
            PathBuf::from("/tmp/kitchen/sources/archives")
        );
        assert_eq!(config.source_dir("1.0.3"), PathBuf::from("/tmp/kitchen/sources/src-1.0.3"));
        assert_eq!(
            config.build_dir("1.0.3", "abc"),
            PathBuf::from("/tmp/kitchen/build/1.0.3/abc/build")
        );
        assert_ne!(config.build_dir("1.0.3", "abc"), config.build_dir("1.1.0", "abc"));
        assert_eq!(
            config.package_dir("1.0.3", "abc"),
            PathBuf::from("/tmp/kitchen/packages/1.0.3/abc")
        );
    }
}
