//! `AppConfig` struct and TOML loading.

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::Deserialize;
use url::Url;

/// Environment variable holding the OMDb API key.
pub const API_KEY_ENV: &str = "OMDB_API_KEY";

/// Top-level application configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct AppConfig {
    /// OMDb access settings.
    #[serde(default)]
    pub omdb: OmdbConfig,
}

/// OMDb access configuration.
#[derive(Debug, Deserialize, Default, PartialEq, Eq)]
pub struct OmdbConfig {
    /// API key, used when `OMDB_API_KEY` is unset.
    #[serde(default)]
    pub api_key: Option<String>,
    /// Base URL override.
    #[serde(default)]
    pub base_url: Option<String>,
    /// Minimum interval between requests in milliseconds.
    #[serde(default)]
    pub min_interval_ms: Option<u64>,
}

impl AppConfig {
    /// Loads config from a TOML file. Returns default if file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }
}

impl OmdbConfig {
    /// Picks the API key: `from_env` first, then the config file.
    ///
    /// # Errors
    ///
    /// Returns an error if neither source holds a non-blank key.
    pub fn api_key(&self, from_env: Option<String>) -> Result<String> {
        let key = from_env
            .filter(|k| !k.trim().is_empty())
            .or_else(|| self.api_key.clone().filter(|k| !k.trim().is_empty()));
        match key {
            Some(key) => Ok(key),
            None => bail!(
                "OMDb API key is required: set {API_KEY_ENV} or `api_key` under [omdb] in config.toml"
            ),
        }
    }

    /// Parses the base URL override, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured value is not a valid URL.
    pub fn base_url(&self) -> Result<Option<Url>> {
        self.base_url
            .as_deref()
            .map(|raw| Url::parse(raw).with_context(|| format!("invalid omdb.base_url: {raw}")))
            .transpose()
    }

    /// Returns the configured minimum request interval.
    #[must_use]
    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_default_config() {
        // Arrange & Act
        let config = AppConfig::default();

        // Assert
        assert!(config.omdb.api_key.is_none());
        assert!(config.omdb.base_url().unwrap().is_none());
        assert!(config.omdb.min_interval().is_none());
    }

    #[test]
    fn test_parse_omdb_section() {
        // Arrange
        let toml_str = r#"
[omdb]
api_key = "abc123"
base_url = "http://localhost:8080/"
min_interval_ms = 250
"#;

        // Act
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        // Assert
        assert_eq!(config.omdb.api_key.as_deref(), Some("abc123"));
        assert_eq!(
            config.omdb.base_url().unwrap().unwrap().as_str(),
            "http://localhost:8080/"
        );
        assert_eq!(config.omdb.min_interval(), Some(Duration::from_millis(250)));
    }

    #[test]
    fn test_partial_omdb_section_keeps_defaults() {
        // Arrange
        let toml_str = "[omdb]\napi_key = \"abc123\"\n";

        // Act
        let config: AppConfig = toml::from_str(toml_str).unwrap();

        // Assert
        assert_eq!(
            config.omdb.api_key(None).unwrap(),
            "abc123"
        );
        assert!(config.omdb.base_url().unwrap().is_none());
        assert!(config.omdb.min_interval().is_none());
    }

    #[test]
    fn test_invalid_base_url_is_error() {
        // Arrange
        let config = OmdbConfig {
            base_url: Some(String::from("not a url")),
            ..OmdbConfig::default()
        };

        // Act
        let result = config.base_url();

        // Assert
        assert!(result.unwrap_err().to_string().contains("omdb.base_url"));
    }

    #[test]
    fn test_api_key_prefers_environment() {
        // Arrange
        let config = OmdbConfig {
            api_key: Some(String::from("from-file")),
            ..OmdbConfig::default()
        };

        // Act & Assert
        assert_eq!(
            config.api_key(Some(String::from("from-env"))).unwrap(),
            "from-env"
        );
        assert_eq!(config.api_key(None).unwrap(), "from-file");
        assert_eq!(config.api_key(Some(String::from("  "))).unwrap(), "from-file");
    }

    #[test]
    fn test_missing_api_key_names_both_sources() {
        // Arrange
        let config = OmdbConfig::default();

        // Act
        let err = config.api_key(None).unwrap_err().to_string();

        // Assert
        assert!(err.contains("OMDB_API_KEY"));
        assert!(err.contains("[omdb]"));
    }

    #[test]
    fn test_load_nonexistent_returns_default() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.toml");

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_empty_file() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        // Act
        let config = AppConfig::load(&path).unwrap();

        // Assert
        assert_eq!(config, AppConfig::default());
    }
}
