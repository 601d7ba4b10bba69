//! Configuration loading.
//!
//! # Hierarchy
//!
//! Configuration is resolved in this order (later overrides earlier):
//! 1. Built-in defaults
//! 2. Config file: `thrive.toml` in the working directory, or the path in `THRIVE_CONFIG`
//! 3. Environment variables: `THRIVE_LOG`
//!
//! # Example Config
//!
//! ```toml
//! log_filter = "thrive=debug,info"
//!
//! [catalogs]
//! milestone = "catalogs/milestone.yaml"
//! ```

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default config file name looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "thrive.toml";

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "THRIVE_CONFIG";

/// Environment variable overriding `log_filter`.
pub const LOG_FILTER_ENV: &str = "THRIVE_LOG";

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    /// `tracing_subscriber::EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    /// Catalog overrides per domain.
    #[serde(default)]
    pub catalogs: CatalogPaths,
}

/// Optional catalog definition files replacing the built-in catalogs.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CatalogPaths {
    pub milestone: Option<PathBuf>,
    pub manifestation: Option<PathBuf>,
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_filter: default_log_filter(),
            catalogs: CatalogPaths::default(),
        }
    }
}

impl Config {
    /// Load configuration from an explicit file.
    ///
    /// Relative catalog paths are resolved against the config file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails validation.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config: Self = read_document(path)?;

        if let Some(base) = path.parent() {
            config.catalogs = config.catalogs.resolved_against(base);
        }

        config.validate()?;
        Ok(config)
    }

    /// Resolve configuration from the environment.
    ///
    /// Uses `THRIVE_CONFIG` when set, otherwise `thrive.toml` if it exists,
    /// otherwise defaults. `THRIVE_LOG` overrides the log filter last.
    ///
    /// # Errors
    ///
    /// Returns an error if a config file is named or present but invalid.
    pub fn from_env() -> Result<Self> {
        let explicit = std::env::var_os(CONFIG_PATH_ENV).map(PathBuf::from);
        let implicit = PathBuf::from(DEFAULT_CONFIG_FILE);

        let config = match explicit {
            Some(path) => Self::load(path)?,
            None if implicit.exists() => Self::load(implicit)?,
            None => Self::default(),
        };

        Ok(config.with_env_overrides())
    }

    /// Apply `THRIVE_LOG` on top of whatever source produced this config.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_log_override(std::env::var(LOG_FILTER_ENV).ok())
    }

    /// Replace the log filter when `filter` is present and not blank.
    #[must_use]
    pub fn with_log_override(self, filter: Option<String>) -> Self {
        match filter {
            Some(filter) if !filter.trim().is_empty() => self.with_log_filter(filter),
            _ => self,
        }
    }

    /// Replace the log filter.
    #[must_use]
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns error if configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.log_filter.trim().is_empty() {
            return Err(Error::invalid_config("log_filter must not be empty"));
        }
        Ok(())
    }
}

impl CatalogPaths {
    fn resolved_against(self, base: &Path) -> Self {
        let resolve = |p: PathBuf| if p.is_relative() { base.join(p) } else { p };
        Self {
            milestone: self.milestone.map(resolve),
            manifestation: self.manifestation.map(resolve),
        }
    }
}

/// Read and deserialize a TOML, YAML or JSON document, chosen by file extension.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, has an unknown
/// extension, or does not deserialize into `T`.
pub fn read_document<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(Error::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::file_read_failed(path, e.to_string()))?;

    tracing::debug!(path = %path.display(), format = %extension, "Reading document");

    match extension.as_str() {
        "toml" => toml::from_str(&content).map_err(|e| Error::toml_parse_failed(path, e.to_string())),
        "yaml" | "yml" => serde_yaml::from_str(&content)
            .map_err(|e| Error::yaml_parse_failed(path, e.to_string())),
        "json" => serde_json::from_str(&content)
            .map_err(|e| Error::json_parse_failed(path, e.to_string())),
        _ => Err(Error::UnsupportedFormat {
            path: path.to_path_buf(),
            extension,
        }),
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::expect_used)]

    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.log_filter, "info");
        assert!(config.catalogs.milestone.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_toml_resolves_relative_catalog_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            dir.path(),
            "thrive.toml",
            "log_filter = \"debug\"\n[catalogs]\nmilestone = \"milestone.yaml\"\n",
        );

        let config = Config::load(&path).unwrap();
        assert_eq!(config.log_filter, "debug");
        assert_eq!(
            config.catalogs.milestone,
            Some(dir.path().join("milestone.yaml"))
        );
        assert!(config.catalogs.manifestation.is_none());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "thrive.toml", "");
        let config = Config::load(&path).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_log_override_applies_to_loaded_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "custom.toml", "log_filter = \"warn\"\n");
        let config = Config::load(&path).unwrap();

        let overridden = config.clone().with_log_override(Some("thrive=trace".to_string()));
        assert_eq!(overridden.log_filter, "thrive=trace");

        assert_eq!(config.clone().with_log_override(Some("  ".to_string())), config);
        assert_eq!(config.clone().with_log_override(None), config);
    }

    #[test]
    fn test_empty_log_filter_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "thrive.toml", "log_filter = \"  \"\n");
        let result = Config::load(&path);
        assert!(matches!(result, Err(Error::InvalidConfig { .. })));
    }

    #[test]
    fn test_read_document_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let yaml = write_file(dir.path(), "c.yml", "log_filter: warn\n");
        let json = write_file(dir.path(), "c.json", "{\"log_filter\": \"trace\"}");

        let from_yaml: Config = read_document(&yaml).unwrap();
        let from_json: Config = read_document(&json).unwrap();
        assert_eq!(from_yaml.log_filter, "warn");
        assert_eq!(from_json.log_filter, "trace");
    }

    #[test]
    fn test_read_document_errors() {
        let dir = tempfile::tempdir().unwrap();
        let txt = write_file(dir.path(), "c.txt", "log_filter = 1");
        let bad = write_file(dir.path(), "c.toml", "log_filter = [");

        assert!(matches!(
            read_document::<Config>(&txt),
            Err(Error::UnsupportedFormat { .. })
        ));
        assert!(matches!(
            read_document::<Config>(&bad),
            Err(Error::TomlParseFailed { .. })
        ));
        assert!(matches!(
            read_document::<Config>(dir.path().join("absent.toml")),
            Err(Error::FileNotFound { .. })
        ));
    }
}
