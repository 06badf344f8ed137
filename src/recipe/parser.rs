// src/recipe/parser.rs

//! Recipe file parsing

use crate::error::{Error, Result};
use crate::hash::is_sha256_hex;
use crate::options::OptionSet;
use crate::recipe::format::Recipe;
use crate::recipe::resolver::DependencyRequirement;
use std::path::Path;

/// The recipe shipped with this crate
const EMBEDDED_RECIPE: &str = include_str!("../../recipes/mariadb-connector-cpp.toml");

/// Parse a recipe from a TOML string
pub fn parse_recipe(content: &str) -> Result<Recipe> {
    toml::from_str(content).map_err(|e| Error::ParseError(format!("Invalid recipe: {}", e)))
}

/// Parse a recipe from a file
pub fn parse_recipe_file(path: &Path) -> Result<Recipe> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::IoError(format!("Failed to read recipe file: {}", e)))?;

    parse_recipe(&content)
}

/// Load the embedded MariaDB Connector/C++ recipe
pub fn embedded_recipe() -> Result<Recipe> {
    parse_recipe(EMBEDDED_RECIPE)
}

/// Validate a recipe for completeness and correctness
///
/// Hard errors are returned as `Err`; softer issues come back as warnings.
pub fn validate_recipe(recipe: &Recipe) -> Result<Vec<String>> {
    let mut warnings = Vec::new();

    if recipe.package.name.is_empty() {
        return Err(Error::ParseError("Recipe package name cannot be empty".to_string()));
    }

    for spec in &recipe.requires {
        DependencyRequirement::parse(&spec.reference)?;

        if let Some(condition) = &spec.when {
            if !OptionSet::NAMES.contains(&condition.option.as_str()) {
                return Err(Error::ParseError(format!(
                    "Requirement {} is conditional on unknown option '{}'",
                    spec.reference, condition.option
                )));
            }
        }
    }

    for (version, source) in &recipe.sources {
        match &source.sha256 {
            Some(sha) if !is_sha256_hex(sha) => {
                return Err(Error::ParseError(format!(
                    "Invalid sha256 for version {}: {}",
                    version, sha
                )));
            }
            Some(_) => {}
            None => warnings.push(format!("Source for version {} has no sha256", version)),
        }
    }

    if recipe.sources.is_empty() {
        warnings.push("No source archives declared".to_string());
    }
    if recipe.package.license.is_none() {
        warnings.push("Missing package license".to_string());
    }
    if recipe.package.description.is_none() {
        warnings.push("Missing package description".to_string());
    }

    Ok(warnings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::SslBackend;

    #[test]
    fn test_embedded_recipe_parses() {
        let recipe = embedded_recipe().unwrap();
        assert_eq!(recipe.package.name, "mariadb-connector-cpp");
        assert_eq!(recipe.package.license.as_deref(), Some("GPL-2.0"));
        assert_eq!(recipe.pkg_config_name(), "libmariadbcpp");
        assert_eq!(recipe.options, OptionSet::default());
        assert_eq!(recipe.requires.len(), 4);
        assert!(recipe.latest_version().is_some());

        // Only the unchecked source is a warning
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().all(|w| w.contains("sha256")));
    }

    #[test]
    fn test_parse_partial_options() {
        let recipe = parse_recipe(
            r#"
[package]
name = "test"

[options]
with_ssl = "gnutls"
"#,
        )
        .unwrap();

        assert_eq!(recipe.options.with_ssl, SslBackend::Gnutls);
        assert_eq!(recipe.options.fpic, Some(true));
        assert!(recipe.options.with_curl);
    }

    #[test]
    fn test_parse_invalid_recipe() {
        assert!(parse_recipe("this is not valid toml at all {}").is_err());
    }

    #[test]
    fn test_validate_empty_name() {
        let recipe = parse_recipe("[package]\nname = \"\"\n").unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_bad_reference() {
        let recipe = parse_recipe(
            r#"
[package]
name = "test"

[[requires]]
reference = "zlib"
"#,
        )
        .unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_unknown_condition_option() {
        let recipe = parse_recipe(
            r#"
[package]
name = "test"

[[requires]]
reference = "curl/8.4.0"
when = { option = "with_http", equals = "true" }
"#,
        )
        .unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_bad_checksum() {
        let recipe = parse_recipe(
            r#"
[package]
name = "test"

[sources."1.0"]
url = "https://example.com/test-1.0.tar.gz"
sha256 = "md5:abc123"
"#,
        )
        .unwrap();
        assert!(validate_recipe(&recipe).is_err());
    }

    #[test]
    fn test_validate_warnings() {
        let recipe = parse_recipe("[package]\nname = \"test\"\n").unwrap();
        let warnings = validate_recipe(&recipe).unwrap();
        assert!(warnings.iter().any(|w| w.contains("source")));
        assert!(warnings.iter().any(|w| w.contains("license")));
        assert!(warnings.iter().any(|w| w.contains("description")));
    }
}
