//! Site configuration for the news model.

use crate::driver::DriverConfig;
use crate::wait::WaitOptions;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors loading a [`SiteConfig`]
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("Failed to read config {path}: {message}")]
    Io {
        /// Path that failed
        path: String,
        /// Error message
        message: String,
    },

    /// File is not valid YAML for this schema
    #[error("Failed to parse YAML: {0}")]
    Yaml(String),

    /// Values parsed but make no sense
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Where and how the news model drives the site
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Homepage URL; also the expected landing URL after reset
    pub base_url: String,
    /// Which homepage heading `clickArticle` opens (0-based)
    pub article_index: usize,
    /// Which search result the click actions open (0-based)
    pub search_result_index: usize,
    /// Query used by the search actions
    pub search_term: String,
    /// Visible text of the date filter option
    pub date_filter: String,
    /// Bounds for every page wait
    pub wait: WaitOptions,
    /// Browser settings
    pub driver: DriverConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://abcnews.go.com/".to_string(),
            article_index: 7,
            search_result_index: 1,
            search_term: "manslaughter".to_string(),
            date_filter: "Last Week".to_string(),
            wait: WaitOptions::default(),
            driver: DriverConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the search term
    #[must_use]
    pub fn with_search_term(mut self, term: impl Into<String>) -> Self {
        self.search_term = term.into();
        self
    }

    /// Set the wait bounds
    #[must_use]
    pub const fn with_wait(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// Parse and validate a YAML document
    ///
    /// # Errors
    /// Returns error if YAML is invalid or validation fails.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_yaml_ng::from_str(yaml).map_err(|e| ConfigError::Yaml(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or is invalid.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        Self::from_yaml(&yaml)
    }

    /// Render as YAML
    ///
    /// # Errors
    /// Returns error if serialization fails.
    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml_ng::to_string(self).map_err(|e| ConfigError::Yaml(e.to_string()))
    }

    /// Check values
    ///
    /// # Errors
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.search_term.trim().is_empty() {
            return Err(ConfigError::Invalid("search_term must not be empty".into()));
        }
        if self.date_filter.trim().is_empty() {
            return Err(ConfigError::Invalid("date_filter must not be empty".into()));
        }
        if self.wait.timeout_ms == 0 {
            return Err(ConfigError::Invalid("wait.timeout_ms must be positive".into()));
        }
        if self.wait.poll_interval_ms > self.wait.timeout_ms {
            return Err(ConfigError::Invalid(
                "wait.poll_interval_ms must not exceed wait.timeout_ms".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = SiteConfig::default();
        assert_eq!(config.base_url, "https://abcnews.go.com/");
        assert_eq!(config.article_index, 7);
        assert_eq!(config.search_result_index, 1);
        assert_eq!(config.search_term, "manslaughter");
        assert_eq!(config.date_filter, "Last Week");
        assert_eq!(config.wait.timeout_ms, 10_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = SiteConfig::from_yaml(
            "search_term: tax fraud\nwait:\n  timeout_ms: 500\n  poll_interval_ms: 10\n",
        )
        .unwrap();
        assert_eq!(config.search_term, "tax fraud");
        assert_eq!(config.wait.timeout_ms, 500);
        assert_eq!(config.article_index, 7);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = SiteConfig::from_yaml("base_url: ftp://x\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        let err = SiteConfig::from_yaml("search_term: '  '\n").unwrap_err();
        assert!(err.to_string().contains("search_term"));
        let err =
            SiteConfig::from_yaml("wait:\n  timeout_ms: 10\n  poll_interval_ms: 20\n").unwrap_err();
        assert!(err.to_string().contains("poll_interval_ms"));
    }

    #[test]
    fn test_bad_yaml() {
        let err = SiteConfig::from_yaml("article_index: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Yaml(_)));
    }

    #[test]
    fn test_from_file_and_back() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "base_url: https://news.test/\narticle_index: 2").unwrap();
        let config = SiteConfig::from_file(file.path()).unwrap();
        assert_eq!(config.base_url, "https://news.test/");
        assert_eq!(config.article_index, 2);

        let again = SiteConfig::from_yaml(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(again, config);
    }

    #[test]
    fn test_missing_file() {
        let err = SiteConfig::from_file(Path::new("/nonexistent/navprobe.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
