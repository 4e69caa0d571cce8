//! Backend connection settings.
//!
//! Read from a TOML file, from the environment, or both (environment
//! wins). The API key is never logged.

use std::env;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;

use crate::error::{AdminError, AdminResult};

/// Base URL of the hosted backend.
pub const ENV_URL: &str = "VANGUARD_BACKEND_URL";
/// Anonymous or service API key.
pub const ENV_KEY: &str = "VANGUARD_BACKEND_KEY";
/// Storage bucket holding media files.
pub const ENV_BUCKET: &str = "VANGUARD_MEDIA_BUCKET";

/// Where and how to reach the hosted backend.
#[derive(Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.example.co`.
    pub url: String,
    /// API key sent as `apikey` and bearer token.
    pub api_key: String,
    /// Media bucket name.
    #[serde(default = "default_bucket")]
    pub media_bucket: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_bucket() -> String {
    "media".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl BackendConfig {
    /// Builds a config from explicit values.
    ///
    /// # Errors
    /// Returns [`AdminError::Config`] if the values are unusable.
    pub fn new(url: impl Into<String>, api_key: impl Into<String>) -> AdminResult<Self> {
        let config = Self {
            url: url.into(),
            api_key: api_key.into(),
            media_bucket: default_bucket(),
            timeout_secs: default_timeout_secs(),
        };
        config.validated()
    }

    /// Reads settings from `VANGUARD_BACKEND_*` environment variables.
    ///
    /// # Errors
    /// Returns [`AdminError::Config`] if the URL or key is missing.
    pub fn from_env() -> AdminResult<Self> {
        let url = env::var(ENV_URL).map_err(|_| AdminError::Config(format!("{ENV_URL} is not set")))?;
        let api_key = env::var(ENV_KEY).map_err(|_| AdminError::Config(format!("{ENV_KEY} is not set")))?;
        let mut config = Self::new(url, api_key)?;
        if let Ok(bucket) = env::var(ENV_BUCKET) {
            config.media_bucket = bucket;
        }
        config.validated()
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    /// Returns [`AdminError::Config`] for malformed or invalid settings.
    pub fn from_toml_str(source: &str) -> AdminResult<Self> {
        let config: Self = toml::from_str(source).map_err(|e| AdminError::Config(e.to_string()))?;
        config.validated()
    }

    /// Reads a TOML file, then applies any environment overrides.
    ///
    /// # Errors
    /// Returns [`AdminError::Config`] if the file is unreadable or invalid.
    pub fn load(path: impl AsRef<Path>) -> AdminResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)
            .map_err(|e| AdminError::Config(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&source)?.with_env_overrides()
    }

    /// Replaces fields with any `VANGUARD_BACKEND_*` variables that are set.
    ///
    /// # Errors
    /// Returns [`AdminError::Config`] if the result is invalid.
    pub fn with_env_overrides(mut self) -> AdminResult<Self> {
        for (key, field) in [
            (ENV_URL, &mut self.url),
            (ENV_KEY, &mut self.api_key),
            (ENV_BUCKET, &mut self.media_bucket),
        ] {
            if let Ok(value) = env::var(key) {
                tracing::info!(%key, "backend setting overridden from environment");
                *field = value;
            }
        }
        self.validated()
    }

    /// Request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    fn validated(mut self) -> AdminResult<Self> {
        self.url = self.url.trim().trim_end_matches('/').to_string();
        if !(self.url.starts_with("https://") || self.url.starts_with("http://")) {
            return Err(AdminError::Config(format!("url `{}` must start with http:// or https://", self.url)));
        }
        if self.api_key.trim().is_empty() {
            return Err(AdminError::Config("api_key must not be empty".to_string()));
        }
        if self.media_bucket.trim().is_empty() || self.media_bucket.contains('/') {
            return Err(AdminError::Config(format!("invalid media bucket `{}`", self.media_bucket)));
        }
        if self.timeout_secs == 0 {
            return Err(AdminError::Config("timeout_secs must be at least 1".to_string()));
        }
        Ok(self)
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("url", &self.url)
            .field("api_key", &"<redacted>")
            .field("media_bucket", &self.media_bucket)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_trimmed() {
        let config = BackendConfig::new("https://demo.example.co/", "key").unwrap();
        assert_eq!(config.url, "https://demo.example.co");
        assert_eq!(config.media_bucket, "media");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(BackendConfig::new("ftp://x", "key"), Err(AdminError::Config(_))));
        assert!(matches!(BackendConfig::new("https://x", "  "), Err(AdminError::Config(_))));
    }

    #[test]
    fn test_toml_with_defaults() {
        let config = BackendConfig::from_toml_str(
            r#"
            url = "http://localhost:54321"
            api_key = "anon"
            timeout_secs = 3
            "#,
        )
        .unwrap();
        assert_eq!(config.timeout_secs, 3);
        assert_eq!(config.media_bucket, "media");

        let err = BackendConfig::from_toml_str("url = \"http://x\"\napi_key = \"k\"\nretries = 2\n").unwrap_err();
        assert!(matches!(err, AdminError::Config(_)));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = BackendConfig::new("https://demo.example.co", "super-secret").unwrap();
        let shown = format!("{config:?}");
        assert!(!shown.contains("super-secret"));
    }
}
