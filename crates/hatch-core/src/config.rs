//! Update client configuration.
//!
//! Loaded from JSON; every field has a default so a config file only needs
//! to name what differs (usually `manifest_url` and `download_url_template`).

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::app::RetryPolicy;

/// Placeholder replaced by the remote version in `download_url_template`.
pub const VERSION_PLACEHOLDER: &str = "{version}";

/// Maps a version string to the URL of its artifact.
pub type UrlBuilder = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// URL builder substituting [`VERSION_PLACEHOLDER`] in `template`.
pub fn template_url_builder(template: &str) -> UrlBuilder {
    let template = template.to_string();
    Arc::new(move |version: &str| template.replace(VERSION_PLACEHOLDER, version))
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateConfig {
    /// Remote manifest (`{ "version": "..." }`).
    pub manifest_url: String,
    pub download_url_template: String,
    /// App-private directory the artifacts are downloaded into.
    pub artifact_dir: PathBuf,
    pub artifact_prefix: String,
    /// Extension without the leading dot.
    pub artifact_ext: String,
    /// Version of the running build.
    pub current_version: String,
    pub check_timeout_ms: u64,
    /// Artifacts that survive a cleanup cycle.
    pub keep_latest: usize,
    pub check_retry: RetryPolicy,
    pub download_retry: RetryPolicy,
    /// Content-provider authority used to hand artifacts to the installer.
    pub content_authority: Option<String>,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            manifest_url: String::new(),
            download_url_template: String::new(),
            artifact_dir: PathBuf::from("updates"),
            artifact_prefix: "App".to_string(),
            artifact_ext: "apk".to_string(),
            current_version: env!("CARGO_PKG_VERSION").to_string(),
            check_timeout_ms: 10_000,
            keep_latest: 2,
            check_retry: RetryPolicy::linear(3, Duration::from_millis(2000)),
            download_retry: RetryPolicy::linear(3, Duration::from_millis(3000)),
            content_authority: None,
        }
    }
}

impl UpdateConfig {
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&content)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }

    /// Checks that do not depend on how the URL builder is supplied.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.manifest_url.trim().is_empty() {
            return Err(ConfigError::Invalid("manifest_url is empty".into()));
        }
        if self.artifact_prefix.is_empty() || self.artifact_ext.is_empty() {
            return Err(ConfigError::Invalid(
                "artifact_prefix and artifact_ext must not be empty".into(),
            ));
        }
        if self.check_timeout_ms == 0 {
            return Err(ConfigError::Invalid("check_timeout_ms must be positive".into()));
        }
        if self.check_retry.max_attempts == 0 || self.download_retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> UpdateConfig {
        UpdateConfig {
            manifest_url: "https://updates.example.com/manifest.json".into(),
            download_url_template: "https://updates.example.com/app-{version}.apk".into(),
            ..UpdateConfig::default()
        }
    }

    #[test]
    fn defaults_match_update_policy() {
        let config = UpdateConfig::default();
        assert_eq!(config.check_timeout(), Duration::from_secs(10));
        assert_eq!(config.keep_latest, 2);
        assert_eq!(config.check_retry.max_attempts, 3);
        assert_eq!(config.check_retry.base_delay(), Duration::from_secs(2));
        assert_eq!(config.download_retry.max_attempts, 3);
        assert_eq!(config.download_retry.base_delay(), Duration::from_secs(3));
        assert_eq!(config.current_version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = UpdateConfig::from_json_str(
            r#"{
                "manifest_url": "https://u.example.com/m.json",
                "artifact_prefix": "Shop",
                "download_retry": { "max_attempts": 5, "base_delay_ms": 100 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.artifact_prefix, "Shop");
        assert_eq!(config.artifact_ext, "apk");
        assert_eq!(config.download_retry.max_attempts, 5);
        assert_eq!(config.check_retry.max_attempts, 3);
    }

    #[test]
    fn missing_file_reports_path() {
        let err = UpdateConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(err.to_string().contains("/definitely/not/here.json"));
    }

    #[test]
    fn validate_rejects_empty_manifest_url() {
        let config = UpdateConfig::default();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn validate_rejects_zero_attempts() {
        let mut config = valid();
        config.check_retry.max_attempts = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn template_builder_substitutes_version() {
        let build = template_url_builder("https://cdn.example.com/{version}/app-{version}.apk");
        assert_eq!(build("1.4.0"), "https://cdn.example.com/1.4.0/app-1.4.0.apk");
    }
}
