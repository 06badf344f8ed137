// src/recipe/variables.rs

//! Build variables handed to CMake

use crate::options::{OptionSet, SslBackend};
use crate::platform::PlatformDescriptor;
use std::fmt;

/// A single build variable value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildValue {
    Bool(bool),
    Str(String),
}

impl fmt::Display for BuildValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildValue::Bool(true) => f.write_str("ON"),
            BuildValue::Bool(false) => f.write_str("OFF"),
            BuildValue::Str(s) => f.write_str(s),
        }
    }
}

impl From<bool> for BuildValue {
    fn from(value: bool) -> Self {
        BuildValue::Bool(value)
    }
}

impl From<&str> for BuildValue {
    fn from(value: &str) -> Self {
        BuildValue::Str(value.to_string())
    }
}

impl From<String> for BuildValue {
    fn from(value: String) -> Self {
        BuildValue::Str(value)
    }
}

/// Ordered build variables plus cache variables
///
/// Setting an existing name replaces its value in place, so insertion order
/// is the order of first definition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildVariableSet {
    variables: Vec<(String, BuildValue)>,
    cache_variables: Vec<(String, BuildValue)>,
}

impl BuildVariableSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, name: &str, value: impl Into<BuildValue>) {
        upsert(&mut self.variables, name, value.into());
    }

    pub fn set_cache(&mut self, name: &str, value: impl Into<BuildValue>) {
        upsert(&mut self.cache_variables, name, value.into());
    }

    pub fn get(&self, name: &str) -> Option<&BuildValue> {
        lookup(&self.variables, name)
    }

    pub fn get_cache(&self, name: &str) -> Option<&BuildValue> {
        lookup(&self.cache_variables, name)
    }

    /// Regular variables in definition order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &BuildValue)> {
        self.variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Cache variables in definition order
    pub fn iter_cache(&self) -> impl Iterator<Item = (&str, &BuildValue)> {
        self.cache_variables.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.variables.len() + self.cache_variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render as `-DNAME=VALUE` arguments, regular variables first
    pub fn to_cmake_args(&self) -> Vec<String> {
        self.iter()
            .chain(self.iter_cache())
            .map(|(name, value)| format!("-D{}={}", name, value))
            .collect()
    }
}

fn upsert(entries: &mut Vec<(String, BuildValue)>, name: &str, value: BuildValue) {
    match entries.iter_mut().find(|(k, _)| k == name) {
        Some(entry) => entry.1 = value,
        None => entries.push((name.to_string(), value)),
    }
}

fn lookup<'a>(entries: &'a [(String, BuildValue)], name: &str) -> Option<&'a BuildValue> {
    entries.iter().find(|(k, _)| k == name).map(|(_, v)| v)
}

/// Value of `WITH_SSL` for a TLS backend
fn ssl_value(backend: SslBackend) -> BuildValue {
    match backend {
        SslBackend::None => BuildValue::Bool(false),
        other => BuildValue::Str(other.to_string()),
    }
}

/// Map options and platform onto the connector's CMake variables
///
/// The connector's own unit tests are always disabled, regardless of what
/// the caller wants. Install directories are fixed to `bin`, `lib` and
/// `lib/plugin` on every platform.
pub fn build_variables(options: &OptionSet, platform: &PlatformDescriptor) -> BuildVariableSet {
    let mut vars = BuildVariableSet::new();

    vars.set("USE_SYSTEM_INSTALLED_LIB", true);
    vars.set("WITH_UNIT_TESTS", false);
    vars.set("BUILD_SHARED_LIBS", options.shared);
    vars.set("MARIADB_LINK_DYNAMIC", false);
    vars.set("CONC_WITH_UNIT_TESTS", false);
    vars.set("WITH_SSL", ssl_value(options.with_ssl));
    vars.set("WITH_CURL", options.with_curl);
    vars.set("WITH_EXTERNAL_ZLIB", true);
    vars.set("INSTALL_BINDIR", "bin");
    vars.set("INSTALL_LIBDIR", "lib");
    vars.set("INSTALL_PLUGINDIR", "lib/plugin");
    vars.set("CMAKE_BUILD_TYPE", platform.build_type.to_string());
    if let Some(fpic) = options.fpic {
        vars.set("CMAKE_POSITION_INDEPENDENT_CODE", fpic);
    }

    // Relocatable shared libs on macOS
    vars.set_cache("CMAKE_POLICY_DEFAULT_CMP0042", "NEW");

    vars
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, BuildType, Compiler, CompilerFamily, Os};

    fn linux() -> PlatformDescriptor {
        PlatformDescriptor::new(
            Os::Linux,
            Arch::X86_64,
            Compiler::new(CompilerFamily::Gcc, "11").unwrap(),
            BuildType::Release,
        )
    }

    #[test]
    fn test_default_mapping() {
        let vars = build_variables(&OptionSet::default(), &linux());

        assert_eq!(vars.get("BUILD_SHARED_LIBS"), Some(&BuildValue::Bool(false)));
        assert_eq!(vars.get("WITH_SSL"), Some(&BuildValue::from("openssl")));
        assert_eq!(vars.get("WITH_UNIT_TESTS"), Some(&BuildValue::Bool(false)));
        assert_eq!(vars.get("INSTALL_PLUGINDIR"), Some(&BuildValue::from("lib/plugin")));
        assert_eq!(vars.get("CMAKE_BUILD_TYPE"), Some(&BuildValue::from("Release")));
        assert_eq!(
            vars.get("CMAKE_POSITION_INDEPENDENT_CODE"),
            Some(&BuildValue::Bool(true))
        );
        assert_eq!(
            vars.get_cache("CMAKE_POLICY_DEFAULT_CMP0042"),
            Some(&BuildValue::from("NEW"))
        );
    }

    #[test]
    fn test_unit_tests_always_disabled() {
        for shared in [false, true] {
            let options = OptionSet {
                shared,
                ..OptionSet::default()
            };
            let vars = build_variables(&options, &linux());
            assert_eq!(vars.get("WITH_UNIT_TESTS"), Some(&BuildValue::Bool(false)));
            assert_eq!(vars.get("CONC_WITH_UNIT_TESTS"), Some(&BuildValue::Bool(false)));
        }
    }

    #[test]
    fn test_no_ssl_maps_to_off() {
        let options = OptionSet {
            with_ssl: SslBackend::None,
            ..OptionSet::default()
        };
        let vars = build_variables(&options, &linux());
        assert_eq!(vars.get("WITH_SSL").unwrap().to_string(), "OFF");
    }

    #[test]
    fn test_removed_fpic_has_no_variable() {
        let options = OptionSet {
            shared: true,
            fpic: None,
            ..OptionSet::default()
        };
        let vars = build_variables(&options, &linux());
        assert_eq!(vars.get("BUILD_SHARED_LIBS"), Some(&BuildValue::Bool(true)));
        assert!(vars.get("CMAKE_POSITION_INDEPENDENT_CODE").is_none());
    }

    #[test]
    fn test_order_and_cmake_args() {
        let vars = build_variables(&OptionSet::default(), &linux());
        let args = vars.to_cmake_args();

        assert_eq!(args[0], "-DUSE_SYSTEM_INSTALLED_LIB=ON");
        assert_eq!(args[1], "-DWITH_UNIT_TESTS=OFF");
        assert_eq!(args[2], "-DBUILD_SHARED_LIBS=OFF");
        assert_eq!(args.last().unwrap(), "-DCMAKE_POLICY_DEFAULT_CMP0042=NEW");
        assert_eq!(args.len(), vars.len());
    }

    #[test]
    fn test_set_replaces_in_place() {
        let mut vars = BuildVariableSet::new();
        vars.set("A", "1");
        vars.set("B", "2");
        vars.set("A", "3");

        let names: Vec<&str> = vars.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(vars.get("A"), Some(&BuildValue::from("3")));
    }
}
