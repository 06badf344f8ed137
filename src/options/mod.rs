// src/options/mod.rs

//! Recipe options
//!
//! Options are the user-facing knobs of the recipe. Defaults come from the
//! recipe manifest and overrides use conan-style `name=value` assignments:
//!
//! ```text
//! shared=True
//! fPIC=False
//! with_ssl=gnutls
//! with_curl=False
//! ```
//!
//! `fPIC` is meaningless on Windows and forced by shared builds, so
//! [`OptionSet::normalized`] drops it in both cases.

use crate::error::{Error, Result};
use crate::platform::PlatformDescriptor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// TLS backend the connector is built against
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(ascii_case_insensitive)]
pub enum SslBackend {
    /// No TLS support
    #[serde(alias = "false", alias = "False")]
    #[strum(to_string = "none", serialize = "false")]
    None,
    #[default]
    #[strum(to_string = "openssl")]
    Openssl,
    #[strum(to_string = "gnutls")]
    Gnutls,
    #[strum(to_string = "schannel")]
    Schannel,
}

/// Full option set of the recipe
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(default)]
pub struct OptionSet {
    pub shared: bool,

    /// Position-independent code; `None` once removed by normalization
    #[serde(rename = "fPIC", skip_serializing_if = "Option::is_none")]
    pub fpic: Option<bool>,

    pub with_ssl: SslBackend,

    pub with_curl: bool,
}

impl Default for OptionSet {
    fn default() -> Self {
        Self {
            shared: false,
            fpic: Some(true),
            with_ssl: SslBackend::Openssl,
            with_curl: true,
        }
    }
}

impl OptionSet {
    /// Names accepted by [`OptionSet::set`]
    pub const NAMES: &'static [&'static str] = &["shared", "fPIC", "with_ssl", "with_curl"];

    /// Set one option from its string form
    pub fn set(&mut self, name: &str, value: &str) -> Result<()> {
        let value = value.trim();
        match name.trim() {
            "shared" => self.shared = parse_bool(name, value)?,
            "fPIC" => self.fpic = Some(parse_bool(name, value)?),
            "with_ssl" => {
                self.with_ssl = SslBackend::from_str(value).map_err(|_| {
                    Error::InvalidOption(format!(
                        "with_ssl='{}' (expected False, openssl, gnutls or schannel)",
                        value
                    ))
                })?
            }
            "with_curl" => self.with_curl = parse_bool(name, value)?,
            other => {
                return Err(Error::InvalidOption(format!(
                    "unknown option '{}' (expected one of: {})",
                    other,
                    Self::NAMES.join(", ")
                )));
            }
        }
        Ok(())
    }

    /// Apply a `name=value` assignment
    pub fn assign(&mut self, assignment: &str) -> Result<()> {
        let (name, value) = assignment.split_once('=').ok_or_else(|| {
            Error::InvalidOption(format!("expected name=value, got '{}'", assignment))
        })?;
        self.set(name, value)
    }

    /// Look up an option's value by name, as used in requirement conditions
    ///
    /// Returns `None` for unknown names and for a removed `fPIC`.
    pub fn get(&self, name: &str) -> Option<String> {
        match name {
            "shared" => Some(self.shared.to_string()),
            "fPIC" => self.fpic.map(|v| v.to_string()),
            "with_ssl" => Some(self.with_ssl.to_string()),
            "with_curl" => Some(self.with_curl.to_string()),
            _ => None,
        }
    }

    /// Drop options that do not apply to the platform or build kind
    pub fn normalized(&self, platform: &PlatformDescriptor) -> OptionSet {
        let mut options = self.clone();
        if platform.is_windows() || options.shared {
            options.fpic = None;
        }
        options
    }
}

impl fmt::Display for OptionSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "shared={}", self.shared)?;
        if let Some(fpic) = self.fpic {
            write!(f, " fPIC={}", fpic)?;
        }
        write!(f, " with_ssl={} with_curl={}", self.with_ssl, self.with_curl)
    }
}

/// Conan-style boolean: `True`/`False`, case-insensitive, plus `1`/`0`
fn parse_bool(name: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "true" | "1" => Ok(true),
        "false" | "0" => Ok(false),
        _ => Err(Error::InvalidOption(format!(
            "{}='{}' (expected True or False)",
            name, value
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::{Arch, BuildType, Compiler, CompilerFamily, Os};

    fn platform(os: Os) -> PlatformDescriptor {
        PlatformDescriptor::new(
            os,
            Arch::X86_64,
            Compiler::new(CompilerFamily::Gcc, "11").unwrap(),
            BuildType::Release,
        )
    }

    #[test]
    fn test_defaults() {
        let options = OptionSet::default();
        assert!(!options.shared);
        assert_eq!(options.fpic, Some(true));
        assert_eq!(options.with_ssl, SslBackend::Openssl);
        assert!(options.with_curl);
    }

    #[test]
    fn test_assign_conan_style_values() {
        let mut options = OptionSet::default();
        options.assign("shared=True").unwrap();
        options.assign("with_ssl=False").unwrap();
        options.assign("with_curl=false").unwrap();

        assert!(options.shared);
        assert_eq!(options.with_ssl, SslBackend::None);
        assert!(!options.with_curl);
    }

    #[test]
    fn test_assign_rejects_unknown_and_invalid() {
        let mut options = OptionSet::default();
        assert!(matches!(options.assign("with_ldap=True"), Err(Error::InvalidOption(_))));
        assert!(matches!(options.assign("shared=maybe"), Err(Error::InvalidOption(_))));
        assert!(matches!(options.assign("with_ssl=wolfssl"), Err(Error::InvalidOption(_))));
        assert!(options.assign("shared").is_err());
    }

    #[test]
    fn test_normalize_drops_fpic_when_shared() {
        let options = OptionSet {
            shared: true,
            ..OptionSet::default()
        };
        assert_eq!(options.normalized(&platform(Os::Linux)).fpic, None);
    }

    #[test]
    fn test_normalize_drops_fpic_on_windows() {
        let options = OptionSet::default();
        assert_eq!(options.normalized(&platform(Os::Windows)).fpic, None);
    }

    #[test]
    fn test_normalize_keeps_fpic_for_static_posix() {
        let options = OptionSet {
            fpic: Some(false),
            ..OptionSet::default()
        };
        assert_eq!(options.normalized(&platform(Os::Linux)).fpic, Some(false));
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for shared in [false, true] {
            for os in [Os::Linux, Os::Macos, Os::Windows] {
                let options = OptionSet {
                    shared,
                    ..OptionSet::default()
                };
                let once = options.normalized(&platform(os));
                let twice = once.normalized(&platform(os));
                assert_eq!(once, twice);
            }
        }
    }

    #[test]
    fn test_get_by_name() {
        let options = OptionSet::default();
        assert_eq!(options.get("with_ssl").as_deref(), Some("openssl"));
        assert_eq!(options.get("shared").as_deref(), Some("false"));
        assert_eq!(options.get("nonexistent"), None);
    }

    #[test]
    fn test_serialize_omits_removed_fpic() {
        let options = OptionSet {
            shared: true,
            fpic: None,
            ..OptionSet::default()
        };
        let json = serde_json::to_string(&options).unwrap();
        assert!(!json.contains("fPIC"));
        assert!(json.contains(r#""with_ssl":"openssl""#));
    }

    #[test]
    fn test_deserialize_recipe_defaults() {
        let options: OptionSet = toml::from_str(
            r#"
shared = false
fPIC = true
with_ssl = "False"
with_curl = true
"#,
        )
        .unwrap();
        assert_eq!(options.with_ssl, SslBackend::None);
        assert_eq!(options.fpic, Some(true));
    }
}
