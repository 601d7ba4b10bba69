//! Core error types for thrive configuration and file loading.
//!
//! All errors are explicit, typed, and recoverable - no panics allowed.

use std::path::PathBuf;

use thiserror::Error;

/// Core error type for loading configuration and catalog files.
#[derive(Debug, Error)]
pub enum Error {
    // I/O errors
    #[error("failed to read file '{path}': {reason}")]
    FileReadFailed { path: PathBuf, reason: String },

    #[error("file does not exist: {path}")]
    FileNotFound { path: PathBuf },

    // Parsing errors
    #[error("JSON parse error in '{path}': {reason}")]
    JsonParseFailed { path: PathBuf, reason: String },

    #[error("YAML parse error in '{path}': {reason}")]
    YamlParseFailed { path: PathBuf, reason: String },

    #[error("TOML parse error in '{path}': {reason}")]
    TomlParseFailed { path: PathBuf, reason: String },

    #[error("unsupported file format '{extension}' for '{path}' (expected toml, yaml, yml or json)")]
    UnsupportedFormat { path: PathBuf, extension: String },

    #[error("invalid configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl Error {
    /// Create a file read error.
    pub fn file_read_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::FileReadFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a JSON parse error.
    pub fn json_parse_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::JsonParseFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a YAML parse error.
    pub fn yaml_parse_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::YamlParseFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a TOML parse error.
    pub fn toml_parse_failed(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::TomlParseFailed {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            reason: reason.into(),
        }
    }
}

/// The standard Result type for core operations.
pub type Result<T> = std::result::Result<T, Error>;
