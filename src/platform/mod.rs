// src/platform/mod.rs

//! Target platform description
//!
//! A `PlatformDescriptor` is the immutable set of settings a build is
//! resolved against: operating system, architecture, compiler and build
//! type. It is assembled from host detection, an optional profile file and
//! `name=value` overrides (see [`PlatformSettings`]).

mod profile;

pub use profile::{PlatformSettings, Profile, parse_profile, parse_profile_file};

use crate::error::{Error, Result};
use crate::version::Version;
use std::fmt;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Operating system family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Os {
    Linux,
    #[strum(to_string = "FreeBSD")]
    FreeBsd,
    Macos,
    Windows,
    Android,
    #[strum(to_string = "iOS")]
    Ios,
}

impl Os {
    /// Map `std::env::consts::OS` to an OS family
    pub fn from_host(os: &str) -> Option<Self> {
        match os {
            "linux" => Some(Os::Linux),
            "freebsd" => Some(Os::FreeBsd),
            "macos" => Some(Os::Macos),
            "windows" => Some(Os::Windows),
            "android" => Some(Os::Android),
            "ios" => Some(Os::Ios),
            _ => None,
        }
    }
}

/// CPU architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum Arch {
    #[strum(to_string = "x86")]
    X86,
    #[strum(to_string = "x86_64")]
    X86_64,
    #[strum(to_string = "armv7")]
    Armv7,
    #[strum(to_string = "armv8")]
    Armv8,
}

impl Arch {
    /// Map `std::env::consts::ARCH` to an architecture
    pub fn from_host(arch: &str) -> Option<Self> {
        match arch {
            "x86" => Some(Arch::X86),
            "x86_64" => Some(Arch::X86_64),
            "arm" => Some(Arch::Armv7),
            "aarch64" => Some(Arch::Armv8),
            _ => None,
        }
    }
}

/// Compiler identity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, AsRefStr)]
#[strum(ascii_case_insensitive)]
pub enum CompilerFamily {
    #[strum(to_string = "gcc")]
    Gcc,
    #[strum(to_string = "clang")]
    Clang,
    #[strum(to_string = "apple-clang")]
    AppleClang,
    #[strum(to_string = "msvc")]
    Msvc,
    #[strum(to_string = "Visual Studio")]
    VisualStudio,
    #[strum(to_string = "intel-cc")]
    IntelCc,
}

/// CMake build type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, AsRefStr,
)]
#[strum(ascii_case_insensitive)]
pub enum BuildType {
    Debug,
    #[default]
    Release,
    RelWithDebInfo,
    MinSizeRel,
}

/// Compiler family plus version
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Compiler {
    pub family: CompilerFamily,
    pub version: Version,
}

impl Compiler {
    pub fn new(family: CompilerFamily, version: &str) -> Result<Self> {
        let version = Version::parse(version).map_err(|e| {
            Error::InvalidSetting(format!("compiler.version '{}': {}", version, e))
        })?;
        Ok(Self { family, version })
    }
}

impl fmt::Display for Compiler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.family, self.version)
    }
}

/// The platform a build is resolved for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformDescriptor {
    pub os: Os,
    pub arch: Arch,
    pub compiler: Compiler,
    pub build_type: BuildType,
}

impl PlatformDescriptor {
    pub fn new(os: Os, arch: Arch, compiler: Compiler, build_type: BuildType) -> Self {
        Self {
            os,
            arch,
            compiler,
            build_type,
        }
    }

    pub fn is_windows(&self) -> bool {
        self.os == Os::Windows
    }

    /// Platforms whose libc splits math and resolver into separate libraries
    pub fn is_posix(&self) -> bool {
        matches!(self.os, Os::Linux | Os::FreeBsd | Os::Macos)
    }

    /// Path list separator for environment variables on this platform
    pub fn path_separator(&self) -> char {
        if self.is_windows() { ';' } else { ':' }
    }
}

impl fmt::Display for PlatformDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{} {} {}",
            self.os, self.arch, self.compiler, self.build_type
        )
    }
}
