// src/error.rs

//! Error types for recipe resolution, building and packaging

use std::path::PathBuf;
use thiserror::Error;

/// Result type used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while resolving, building or packaging the connector
#[derive(Error, Debug)]
pub enum Error {
    /// The target operating system cannot be built for
    #[error("{package} doesn't support {os} for now")]
    UnsupportedPlatform { package: String, os: String },

    /// The compiler is older than the minimum required for C++11
    #[error(
        "{package} requires C++11, which your compiler does not support \
         ({compiler} {version} < {minimum})"
    )]
    CompilerTooOld {
        package: String,
        compiler: String,
        version: String,
        minimum: String,
    },

    /// A source edit could not find the text it anchors on
    #[error("patch anchor '{anchor}' not found in {}", file.display())]
    PatchAnchorNotFound { file: PathBuf, anchor: String },

    /// The registry could not supply a declared dependency
    #[error("failed to resolve dependency {requirement}: {reason}")]
    DependencyResolutionFailure { requirement: String, reason: String },

    /// The external build tool failed
    #[error("{phase} phase failed: {reason}")]
    ExternalBuildFailure { phase: String, reason: String },

    /// Fetching or extracting the source archive failed
    #[error("fetch failed: {0}")]
    FetchFailure(String),

    /// An option name or value is not recognised
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// A platform setting is missing or not recognised
    #[error("invalid setting: {0}")]
    InvalidSetting(String),

    /// Recipe, profile or registry index could not be parsed
    #[error("parse error: {0}")]
    ParseError(String),

    /// I/O failure with context
    #[error("I/O error: {0}")]
    IoError(String),

    /// Raw I/O failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error came from configuration validation rather than
    /// from a collaborator
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            Error::UnsupportedPlatform { .. }
                | Error::CompilerTooOld { .. }
                | Error::InvalidOption(_)
                | Error::InvalidSetting(_)
        )
    }
}
