// src/platform/profile.rs

//! Profile files and `name=value` platform settings

use super::{Arch, BuildType, Compiler, CompilerFamily, Os, PlatformDescriptor};
use crate::error::{Error, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

const KNOWN_SETTINGS: &[&str] = &["os", "arch", "compiler", "compiler.version", "build_type"];

/// A profile file
///
/// ```toml
/// [settings]
/// os = "Linux"
/// arch = "x86_64"
/// compiler = "gcc"
/// "compiler.version" = "11"
/// build_type = "Release"
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub settings: BTreeMap<String, toml::Value>,
}

/// Parse a profile from a TOML string
pub fn parse_profile(content: &str) -> Result<Profile> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid profile: {}", e)))
}

/// Parse a profile from a file
pub fn parse_profile_file(path: &Path) -> Result<Profile> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::IoError(format!("Failed to read profile {}: {}", path.display(), e))
    })?;

    parse_profile(&content)
}

/// Raw settings accumulated before they are resolved into a descriptor
///
/// Later assignments win, so callers apply host detection first, then the
/// profile, then command-line overrides.
#[derive(Debug, Clone, Default)]
pub struct PlatformSettings {
    values: BTreeMap<String, String>,
}

impl PlatformSettings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Settings detected from the running host
    ///
    /// The compiler version cannot be detected and must come from a profile
    /// or an override.
    pub fn host() -> Self {
        let mut settings = Self::new();

        if let Some(os) = Os::from_host(std::env::consts::OS) {
            settings.values.insert("os".to_string(), os.to_string());
            let compiler = if os == Os::Macos {
                CompilerFamily::AppleClang
            } else {
                CompilerFamily::Gcc
            };
            settings
                .values
                .insert("compiler".to_string(), compiler.to_string());
        }
        if let Some(arch) = Arch::from_host(std::env::consts::ARCH) {
            settings.values.insert("arch".to_string(), arch.to_string());
        }
        settings
            .values
            .insert("build_type".to_string(), BuildType::default().to_string());

        debug!("Detected host settings: {:?}", settings.values);
        settings
    }

    /// Set a single setting
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let name = name.trim();
        if !KNOWN_SETTINGS.contains(&name) {
            return Err(Error::InvalidSetting(format!(
                "unknown setting '{}' (expected one of: {})",
                name,
                KNOWN_SETTINGS.join(", ")
            )));
        }
        self.values.insert(name.to_string(), value.trim().to_string());
        Ok(())
    }

    /// Apply a `name=value` assignment
    pub fn assign(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            Error::InvalidSetting(format!("expected name=value, got '{}'", assignment))
        })?;
        self.set(name, value)
    }

    /// Merge every setting from a profile
    pub fn apply_profile(&mut self, profile: &Profile) -> Result<()> {
        for (name, value) in &profile.settings {
            let value = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                // 11.10 would read back as 11.1
                toml::Value::Float(_) => {
                    return Err(Error::InvalidSetting(format!(
                        "setting '{}' must be quoted when it has a dot, e.g. \"11.10\"",
                        name
                    )));
                }
                other => {
                    return Err(Error::InvalidSetting(format!(
                        "setting '{}' must be a string or integer, got {}",
                        name,
                        other.type_str()
                    )));
                }
            };
            self.set(name, &value)?;
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(|s| s.as_str())
    }

    fn require(&self, name: &str) -> Result<&str> {
        self.get(name).ok_or_else(|| {
            Error::InvalidSetting(format!(
                "'{}' is not set; pass it with -s {}=... or a profile",
                name, name
            ))
        })
    }

    /// Resolve the accumulated settings into a platform descriptor
    pub fn resolve(&self) -> Result<PlatformDescriptor> {
        let os = parse_setting::<Os>("os", self.require("os")?)?;
        let arch = parse_setting::<Arch>("arch", self.require("arch")?)?;
        let family = parse_setting::<CompilerFamily>("compiler", self.require("compiler")?)?;
        let compiler = Compiler::new(family, self.require("compiler.version")?)?;
        let build_type = match self.get("build_type") {
            Some(value) => parse_setting::<BuildType>("build_type", value)?,
            None => BuildType::default(),
        };

        Ok(PlatformDescriptor::new(os, arch, compiler, build_type))
    }
}

fn parse_setting<T: FromStr>(name: &str, value: &str) -> Result<T> {
    T::from_str(value)
        .map_err(|_| Error::InvalidSetting(format!("unsupported {} '{}'", name, value)))
}
