// src/recipe/format.rs

//! Recipe file format definitions
//!
//! A recipe is a TOML file holding the declarative metadata of the packaged
//! library: identity, default options, requirements and the source archive
//! of every known version.

use crate::options::OptionSet;
use crate::version::Version;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A complete recipe
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata
    pub package: PackageSection,

    /// Default option values
    #[serde(default)]
    pub options: OptionSet,

    /// Declared requirements, some conditional on options
    #[serde(default)]
    pub requires: Vec<RequirementSpec>,

    /// Source archive per upstream version
    #[serde(default)]
    pub sources: BTreeMap<String, SourceArchive>,
}

impl Recipe {
    /// `name/version` reference used in messages and on publish
    pub fn reference(&self, version: &str) -> String {
        format!("{}/{}", self.package.name, version)
    }

    /// Source archive for a version
    pub fn source(&self, version: &str) -> Option<&SourceArchive> {
        self.sources.get(version)
    }

    /// Highest version with a declared source
    pub fn latest_version(&self) -> Option<&str> {
        self.sources
            .keys()
            .filter_map(|v| Version::parse(v).ok().map(|parsed| (parsed, v)))
            .max_by(|(a, _), (b, _)| a.cmp(b))
            .map(|(_, v)| v.as_str())
    }

    /// pkg-config name published for consumers
    pub fn pkg_config_name(&self) -> &str {
        self.package
            .pkg_config_name
            .as_deref()
            .unwrap_or(&self.package.name)
    }
}

/// Package metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackageSection {
    /// Package name
    pub name: String,

    /// License identifier (SPDX)
    #[serde(default)]
    pub license: Option<String>,

    /// Recipe repository URL
    #[serde(default)]
    pub url: Option<String>,

    /// Upstream homepage
    #[serde(default)]
    pub homepage: Option<String>,

    /// Short description
    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub topics: Vec<String>,

    /// Name consumers use with pkg-config
    #[serde(default)]
    pub pkg_config_name: Option<String>,

    /// License file copied from the source tree into `licenses/`
    #[serde(default = "default_license_file")]
    pub license_file: String,
}

fn default_license_file() -> String {
    "COPYING.LIB".to_string()
}

/// A requirement as written in the recipe
///
/// ```toml
/// [[requires]]
/// reference = "openssl/[>=1.1 <4]"
/// when = { option = "with_ssl", equals = "openssl" }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequirementSpec {
    /// `name/version` or `name/[range]`
    pub reference: String,

    /// Only required when this option condition holds
    #[serde(default)]
    pub when: Option<OptionCondition>,
}

/// Equality test on one option value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionCondition {
    pub option: String,
    pub equals: String,
}

impl OptionCondition {
    pub fn new(option: impl Into<String>, equals: impl Into<String>) -> Self {
        Self {
            option: option.into(),
            equals: equals.into(),
        }
    }

    /// Evaluate against an option set; unknown options never match
    pub fn holds(&self, options: &OptionSet) -> bool {
        options
            .get(&self.option)
            .is_some_and(|value| value.eq_ignore_ascii_case(&self.equals))
    }
}

/// Upstream source archive
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceArchive {
    /// Archive URL (`.tar.gz`)
    pub url: String,

    /// Expected SHA-256 of the archive
    #[serde(default)]
    pub sha256: Option<String>,
}

impl SourceArchive {
    /// File name of the archive, taken from the URL
    pub fn filename(&self) -> &str {
        self.url
            .rsplit('/')
            .next()
            .filter(|name| !name.is_empty())
            .unwrap_or("source.tar.gz")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SslBackend;

    #[test]
    fn test_latest_version_uses_version_order() {
        let recipe: Recipe = toml::from_str(
            r#"
[package]
name = "demo"

[sources."1.0.9"]
url = "https://example.com/1.0.9.tar.gz"

[sources."1.0.10"]
url = "https://example.com/1.0.10.tar.gz"
"#,
        )
        .unwrap();

        assert_eq!(recipe.latest_version(), Some("1.0.10"));
        assert_eq!(recipe.reference("1.0.10"), "demo/1.0.10");
        assert_eq!(recipe.pkg_config_name(), "demo");
        assert_eq!(recipe.package.license_file, "COPYING.LIB");
    }

    #[test]
    fn test_condition_holds() {
        let condition = OptionCondition::new("with_ssl", "openssl");
        let mut options = OptionSet::default();
        assert!(condition.holds(&options));

        options.with_ssl = SslBackend::Gnutls;
        assert!(!condition.holds(&options));

        assert!(!OptionCondition::new("with_ldap", "true").holds(&options));
    }

    #[test]
    fn test_source_filename() {
        let source = SourceArchive {
            url: "https://github.com/org/repo/archive/refs/tags/1.0.3.tar.gz".to_string(),
            sha256: None,
        };
        assert_eq!(source.filename(), "1.0.3.tar.gz");
    }
}
