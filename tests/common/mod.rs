// tests/common/mod.rs

//! Shared test utilities and collaborator doubles for integration tests.

#![allow(dead_code)]

use mariadb_cpp_recipe::recipe::kitchen::{BuildTool, SourceFetcher};
use mariadb_cpp_recipe::recipe::{BuildVariableSet, LocalRegistry, SourceArchive};
use mariadb_cpp_recipe::{
    Arch, BuildType, Compiler, CompilerFamily, Os, PlatformDescriptor, Result,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Upstream build script with both patch anchors
pub const FIXTURE_CMAKE: &str = "\
CMAKE_MINIMUM_REQUIRED(VERSION 3.1)
PROJECT(mariadb-connector-cpp)
INCLUDE(SetValueMacro)
ADD_LIBRARY(${LIBRARY_NAME} SHARED ${MARIADB_SOURCES})
";

pub fn platform(
    os: Os,
    family: CompilerFamily,
    version: &str,
    build_type: BuildType,
) -> PlatformDescriptor {
    PlatformDescriptor::new(
        os,
        Arch::X86_64,
        Compiler::new(family, version).unwrap(),
        build_type,
    )
}

/// Linux, gcc 11, Release
pub fn linux_gcc11() -> PlatformDescriptor {
    platform(Os::Linux, CompilerFamily::Gcc, "11", BuildType::Release)
}

/// Fetcher that writes a fixture source tree instead of downloading
pub struct FixtureFetcher {
    cmake: String,
    calls: Mutex<usize>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::with_cmake(FIXTURE_CMAKE)
    }

    pub fn with_cmake(cmake: &str) -> Self {
        Self {
            cmake: cmake.to_string(),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl SourceFetcher for FixtureFetcher {
    fn fetch(&self, _source: &SourceArchive, dest: &Path) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        fs::create_dir_all(dest.join("src"))?;
        fs::write(dest.join("CMakeLists.txt"), &self.cmake)?;
        fs::write(dest.join("COPYING.LIB"), "GNU LESSER GENERAL PUBLIC LICENSE\n")?;
        fs::write(dest.join("src/Driver.cpp"), "// driver\n")?;
        Ok(())
    }
}

/// Build tool that records what it was asked to do and fakes an install
#[derive(Default)]
pub struct RecordingBuilder {
    pub configured: Mutex<Vec<(PathBuf, BuildVariableSet)>>,
    pub built: Mutex<Vec<(PathBuf, BuildType)>>,
    pub installed: Mutex<Vec<PathBuf>>,
}

impl RecordingBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Variables of the last configure call
    pub fn last_variables(&self) -> BuildVariableSet {
        self.configured.lock().unwrap().last().unwrap().1.clone()
    }

    /// Source dir of the last configure call
    pub fn last_source_dir(&self) -> PathBuf {
        self.configured.lock().unwrap().last().unwrap().0.clone()
    }
}

impl BuildTool for RecordingBuilder {
    fn configure(
        &self,
        source_dir: &Path,
        _build_dir: &Path,
        variables: &BuildVariableSet,
    ) -> Result<String> {
        self.configured
            .lock()
            .unwrap()
            .push((source_dir.to_path_buf(), variables.clone()));
        Ok("=== configure ===\n".to_string())
    }

    fn build(&self, build_dir: &Path, build_type: BuildType, _jobs: u32) -> Result<String> {
        self.built
            .lock()
            .unwrap()
            .push((build_dir.to_path_buf(), build_type));
        Ok("=== build ===\n".to_string())
    }

    fn install(&self, _build_dir: &Path, build_type: BuildType, prefix: &Path) -> Result<String> {
        self.installed.lock().unwrap().push(prefix.to_path_buf());

        let lib = if build_type == BuildType::Debug {
            prefix.join("lib/debug")
        } else {
            prefix.join("lib")
        };
        fs::create_dir_all(lib.join("plugin"))?;
        fs::create_dir_all(prefix.join("include/mariadb"))?;
        fs::write(lib.join("libmariadbcpp.a"), b"archive")?;
        fs::write(lib.join("plugin/caching_sha2_password.so"), b"plugin")?;
        fs::write(prefix.join("include/mariadb/conncpp.hpp"), b"// header")?;
        fs::write(prefix.join("INFO_SRC"), b"src info")?;
        fs::write(prefix.join("INFO_BIN"), b"bin info")?;
        Ok("=== install ===\n".to_string())
    }
}

/// Registry index with every dependency of the recipe, folders under `root`
pub fn full_registry(root: &Path) -> LocalRegistry {
    let deps = [
        ("mariadb-connector-c", "3.3.3"),
        ("zlib", "1.3.1"),
        ("zstd", "1.5.5"),
        ("openssl", "3.2.1"),
    ];

    let mut index = String::new();
    for (name, version) in deps {
        fs::create_dir_all(root.join(name).join("include")).unwrap();
        index.push_str(&format!(
            "[packages.{}]\nversion = \"{}\"\npackage_folder = \"{}\"\n\n",
            name, version, name
        ));
    }

    let path = root.join("registry.toml");
    fs::write(&path, index).unwrap();
    LocalRegistry::open(&path).unwrap()
}
