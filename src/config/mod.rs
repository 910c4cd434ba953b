//! Configuration for the validation client.
//!
//! [`ValidationConfig`] carries the tunable parameters consumed by every
//! other component; [`ConfigStore`] holds the active configuration and
//! supports wholesale atomic replacement at runtime.

use std::path::PathBuf;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tracing::debug;

use crate::errors::{ValidationError, ValidationResult};

/// Default base URL for the validation API.
pub const DEFAULT_BASE_URL: &str = "https://api-mock.payments.jpmorgan.com/tsapi/v2";

/// Default per-attempt request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default maximum number of retries after the initial attempt.
pub const DEFAULT_MAX_RETRIES: u32 = 3;

/// Configuration for the validation client.
///
/// Created once at startup (usually via [`ValidationConfig::builder`] or
/// [`ValidationConfig::from_env`]) and replaced wholesale through
/// [`ConfigStore::replace`] when tuning needs to change at runtime. The
/// store performs no validation; callers are responsible for sane values.
#[derive(Debug, Clone)]
pub struct ValidationConfig {
    /// Base URL of the validation API.
    pub base_url: String,
    /// Per-attempt request timeout.
    pub timeout: Duration,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Whether successful responses are cached.
    pub enable_caching: bool,
    /// Whether per-request metrics are recorded.
    pub enable_metrics: bool,
    /// Whether transport handles are pooled between requests.
    pub enable_connection_pooling: bool,
    /// Path to a PEM client certificate presented during TLS handshakes.
    pub client_cert_path: Option<PathBuf>,
    /// Path to the PEM private key matching the client certificate.
    pub client_key_path: Option<PathBuf>,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_retries: DEFAULT_MAX_RETRIES,
            enable_caching: true,
            enable_metrics: true,
            enable_connection_pooling: true,
            client_cert_path: None,
            client_key_path: None,
        }
    }
}

impl ValidationConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configuration builder.
    pub fn builder() -> ValidationConfigBuilder {
        ValidationConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// Reads `VALIDATION_BASE_URL`, `VALIDATION_TIMEOUT_SECS`,
    /// `VALIDATION_MAX_RETRIES`, `VALIDATION_CLIENT_CERT`, and
    /// `VALIDATION_CLIENT_KEY`; unset variables keep their defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(base_url) = std::env::var("VALIDATION_BASE_URL") {
            config.base_url = base_url;
        }
        if let Some(secs) = std::env::var("VALIDATION_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.timeout = Duration::from_secs(secs);
        }
        if let Some(retries) = std::env::var("VALIDATION_MAX_RETRIES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            config.max_retries = retries;
        }
        if let Ok(cert) = std::env::var("VALIDATION_CLIENT_CERT") {
            config.client_cert_path = Some(PathBuf::from(cert));
        }
        if let Ok(key) = std::env::var("VALIDATION_CLIENT_KEY") {
            config.client_key_path = Some(PathBuf::from(key));
        }

        config
    }

    /// Builds the full URL for an endpoint path.
    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            endpoint.trim_start_matches('/')
        )
    }
}

/// Builder for [`ValidationConfig`].
#[derive(Debug, Default)]
pub struct ValidationConfigBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
    max_retries: Option<u32>,
    enable_caching: Option<bool>,
    enable_metrics: Option<bool>,
    enable_connection_pooling: Option<bool>,
    client_cert_path: Option<PathBuf>,
    client_key_path: Option<PathBuf>,
}

impl ValidationConfigBuilder {
    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets the per-attempt timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the maximum retry count.
    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Enables or disables response caching.
    pub fn enable_caching(mut self, enabled: bool) -> Self {
        self.enable_caching = Some(enabled);
        self
    }

    /// Enables or disables metrics recording.
    pub fn enable_metrics(mut self, enabled: bool) -> Self {
        self.enable_metrics = Some(enabled);
        self
    }

    /// Enables or disables connection pooling.
    pub fn enable_connection_pooling(mut self, enabled: bool) -> Self {
        self.enable_connection_pooling = Some(enabled);
        self
    }

    /// Sets the client certificate path.
    pub fn client_cert_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_cert_path = Some(path.into());
        self
    }

    /// Sets the client key path.
    pub fn client_key_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.client_key_path = Some(path.into());
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL is empty or not parseable.
    pub fn build(self) -> ValidationResult<ValidationConfig> {
        let defaults = ValidationConfig::default();
        let base_url = self.base_url.unwrap_or(defaults.base_url);

        if base_url.is_empty() {
            return Err(ValidationError::invalid_param(
                "base URL must not be empty",
                "base_url",
            ));
        }
        url::Url::parse(&base_url).map_err(|e| {
            ValidationError::invalid_param(format!("invalid base URL: {}", e), "base_url")
        })?;

        Ok(ValidationConfig {
            base_url,
            timeout: self.timeout.unwrap_or(defaults.timeout),
            max_retries: self.max_retries.unwrap_or(defaults.max_retries),
            enable_caching: self.enable_caching.unwrap_or(defaults.enable_caching),
            enable_metrics: self.enable_metrics.unwrap_or(defaults.enable_metrics),
            enable_connection_pooling: self
                .enable_connection_pooling
                .unwrap_or(defaults.enable_connection_pooling),
            client_cert_path: self.client_cert_path,
            client_key_path: self.client_key_path,
        })
    }
}

/// Holds the active configuration and hands out consistent snapshots.
///
/// Readers get a cheap `Arc` clone of the whole configuration: a request
/// in flight keeps the snapshot it started with, while components that
/// read per-use (pool, cache, metrics) observe replacements as soon as
/// they land. A replacement is all-or-nothing; readers never see a mix
/// of old and new fields.
#[derive(Debug)]
pub struct ConfigStore {
    inner: RwLock<Arc<ValidationConfig>>,
}

impl ConfigStore {
    /// Creates a store holding the given configuration.
    pub fn new(config: ValidationConfig) -> Self {
        Self {
            inner: RwLock::new(Arc::new(config)),
        }
    }

    /// Returns a snapshot of the current configuration.
    pub fn current(&self) -> Arc<ValidationConfig> {
        self.inner
            .read()
            .map(|guard| Arc::clone(&guard))
            .unwrap_or_else(|poisoned| Arc::clone(&poisoned.into_inner()))
    }

    /// Replaces the active configuration wholesale.
    ///
    /// No partial updates: callers wanting to change one field derive a
    /// full configuration from [`ConfigStore::current`] first.
    pub fn replace(&self, config: ValidationConfig) {
        debug!(
            base_url = %config.base_url,
            max_retries = config.max_retries,
            "Replacing active configuration"
        );
        let next = Arc::new(config);
        match self.inner.write() {
            Ok(mut guard) => *guard = next,
            Err(poisoned) => *poisoned.into_inner() = next,
        }
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ValidationConfig::default();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.max_retries, 3);
        assert!(config.enable_caching);
        assert!(config.enable_metrics);
        assert!(config.enable_connection_pooling);
        assert!(config.client_cert_path.is_none());
        assert!(config.client_key_path.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ValidationConfig::builder()
            .base_url("https://validation.example.com/v2")
            .timeout(Duration::from_secs(5))
            .max_retries(1)
            .enable_caching(false)
            .build()
            .unwrap();

        assert_eq!(config.base_url, "https://validation.example.com/v2");
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.max_retries, 1);
        assert!(!config.enable_caching);
        assert!(config.enable_metrics);
    }

    #[test]
    fn test_builder_rejects_empty_base_url() {
        let result = ValidationConfig::builder().base_url("").build();
        assert!(matches!(
            result,
            Err(ValidationError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_builder_rejects_unparseable_base_url() {
        let result = ValidationConfig::builder().base_url("not a url").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_endpoint_url_joins_with_single_slash() {
        let config = ValidationConfig::builder()
            .base_url("https://validation.example.com/v2/")
            .build()
            .unwrap();
        assert_eq!(
            config.endpoint_url("/validations/accounts"),
            "https://validation.example.com/v2/validations/accounts"
        );
        assert_eq!(
            config.endpoint_url("validations/entities"),
            "https://validation.example.com/v2/validations/entities"
        );
    }

    #[test]
    fn test_store_replace_is_wholesale() {
        let store = ConfigStore::default();
        let before = store.current();

        let mut next = (*store.current()).clone();
        next.max_retries = 9;
        next.enable_caching = false;
        store.replace(next);

        let after = store.current();
        assert_eq!(after.max_retries, 9);
        assert!(!after.enable_caching);

        // The old snapshot is unaffected by the swap.
        assert_eq!(before.max_retries, 3);
        assert!(before.enable_caching);
    }

    #[test]
    fn test_store_concurrent_readers_and_writer() {
        let store = Arc::new(ConfigStore::default());
        let mut handles = Vec::new();

        for i in 0..4u32 {
            let store = Arc::clone(&store);
            handles.push(std::thread::spawn(move || {
                for n in 0..50 {
                    let mut config = (*store.current()).clone();
                    config.max_retries = i * 100 + n;
                    store.replace(config);
                    // Snapshot must always be internally consistent.
                    let snapshot = store.current();
                    assert!(!snapshot.base_url.is_empty());
                }
            }));
        }

        for handle in handles {
            handle.join().unwrap();
        }
    }
}
