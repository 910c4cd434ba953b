//! Validation API client.
//!
//! Provides the main client interface: a configuration store, connection
//! pool, response cache, and metrics recorder wired into the validations
//! service.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use crate::auth::{HeaderProvider, ProgramCredentials};
use crate::cache::{CacheTuning, ResponseCache};
use crate::config::{ConfigStore, ValidationConfig, ValidationConfigBuilder};
use crate::errors::ValidationResult;
use crate::observability::{MetricsRecorder, MetricsSummary, MetricsTuning, RequestMetric};
use crate::pool::{
    ConnectionFactory, ConnectionPool, PoolStats, PoolTuning, ReqwestConnectionFactory,
    StaticConnectionFactory,
};
use crate::resilience::RetryTuning;
use crate::services::ValidationsService;
use crate::transport::HttpTransport;

/// The main validation client.
///
/// Owns the shared configuration, connection pool, response cache, and
/// metrics recorder, and exposes the validations service built on them.
///
/// # Example
///
/// ```rust,no_run
/// use validation_client::types::account::AccountValidationRequest;
/// use validation_client::types::common::{Account, Individual};
/// use validation_client::{ProgramCredentials, ValidationClient};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = ValidationClient::builder()
///         .credentials(
///             ProgramCredentials::new("CLIENTID", "VERIAUTH").with_program_id_type("AVS"),
///         )
///         .build()?;
///
///     let request = AccountValidationRequest::new(
///         Account::aba("12345", "122199983"),
///         Individual::new("Jane", "Abbott"),
///     );
///
///     let response = client.validations().validate_account(&request).await?;
///     println!("{}", response.body);
///     Ok(())
/// }
/// ```
pub struct ValidationClient {
    config: Arc<ConfigStore>,
    pool: Arc<ConnectionPool>,
    cache: Arc<ResponseCache>,
    metrics: Arc<MetricsRecorder>,
    validations: ValidationsService,
}

impl ValidationClient {
    /// Creates a new client builder.
    pub fn builder() -> ValidationClientBuilder {
        ValidationClientBuilder::new()
    }

    /// Creates a client from environment variables.
    ///
    /// Reads `VALIDATION_BASE_URL`, `VALIDATION_TIMEOUT_SECS`,
    /// `VALIDATION_MAX_RETRIES`, `VALIDATION_CLIENT_CERT`, and
    /// `VALIDATION_CLIENT_KEY`, falling back to defaults.
    pub fn from_env() -> ValidationResult<Self> {
        ValidationClientBuilder::from_config(ValidationConfig::from_env()).build()
    }

    /// Returns the validations service.
    pub fn validations(&self) -> &ValidationsService {
        &self.validations
    }

    /// Returns a snapshot of the active configuration.
    pub fn config(&self) -> Arc<ValidationConfig> {
        self.config.current()
    }

    /// Replaces the active configuration wholesale.
    ///
    /// The new value is not validated. Calls already in flight keep the
    /// snapshot they started with; later calls observe the new value.
    pub fn update_config(&self, config: ValidationConfig) {
        self.config.replace(config);
    }

    /// Returns a copy of the recorded request metrics.
    pub fn metrics_snapshot(&self) -> Vec<RequestMetric> {
        self.metrics.snapshot()
    }

    /// Aggregates the recorded request metrics.
    pub fn metrics_summary(&self) -> MetricsSummary {
        self.metrics.summary()
    }

    /// Clears the metrics log.
    pub fn reset_metrics(&self) {
        self.metrics.reset();
    }

    /// Returns connection pool statistics.
    pub fn pool_stats(&self) -> PoolStats {
        self.pool.stats()
    }

    /// Drops idle connections and clears the cache and metrics log.
    ///
    /// Safe to call more than once. Validations running concurrently with
    /// shutdown need external synchronization.
    pub fn shutdown(&self) {
        self.pool.clear();
        self.cache.clear();
        self.metrics.reset();
    }
}

impl std::fmt::Debug for ValidationClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationClient")
            .field("config", &self.config.current())
            .finish()
    }
}

/// Builder for the validation client.
pub struct ValidationClientBuilder {
    config_builder: ValidationConfigBuilder,
    credentials: Option<Arc<dyn HeaderProvider>>,
    transport: Option<Arc<dyn HttpTransport>>,
    pool_tuning: PoolTuning,
    cache_tuning: CacheTuning,
    metrics_tuning: MetricsTuning,
    retry_tuning: RetryTuning,
}

impl ValidationClientBuilder {
    /// Creates a new client builder.
    pub fn new() -> Self {
        Self {
            config_builder: ValidationConfig::builder(),
            credentials: None,
            transport: None,
            pool_tuning: PoolTuning::default(),
            cache_tuning: CacheTuning::default(),
            metrics_tuning: MetricsTuning::default(),
            retry_tuning: RetryTuning::default(),
        }
    }

    /// Creates a builder seeded from an existing configuration.
    pub fn from_config(config: ValidationConfig) -> Self {
        let mut config_builder = ValidationConfig::builder()
            .base_url(&config.base_url)
            .timeout(config.timeout)
            .max_retries(config.max_retries)
            .enable_caching(config.enable_caching)
            .enable_metrics(config.enable_metrics)
            .enable_connection_pooling(config.enable_connection_pooling);
        if let Some(cert) = &config.client_cert_path {
            config_builder = config_builder.client_cert_path(cert);
        }
        if let Some(key) = &config.client_key_path {
            config_builder = config_builder.client_key_path(key);
        }

        Self {
            config_builder,
            ..Self::new()
        }
    }

    /// Sets the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config_builder = self.config_builder.base_url(base_url);
        self
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config_builder = self.config_builder.timeout(timeout);
        self
    }

    /// Sets the timeout in seconds.
    pub fn timeout_secs(self, secs: u64) -> Self {
        self.timeout(Duration::from_secs(secs))
    }

    /// Sets the maximum retry count.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.config_builder = self.config_builder.max_retries(retries);
        self
    }

    /// Enables or disables response caching.
    pub fn enable_caching(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.enable_caching(enabled);
        self
    }

    /// Enables or disables metrics recording.
    pub fn enable_metrics(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.enable_metrics(enabled);
        self
    }

    /// Enables or disables connection pooling.
    pub fn enable_connection_pooling(mut self, enabled: bool) -> Self {
        self.config_builder = self.config_builder.enable_connection_pooling(enabled);
        self
    }

    /// Sets the client certificate and key used for mutual TLS.
    pub fn client_certificate(
        mut self,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.config_builder = self
            .config_builder
            .client_cert_path(cert_path)
            .client_key_path(key_path);
        self
    }

    /// Sets the program credentials applied to every request.
    pub fn credentials(mut self, credentials: ProgramCredentials) -> Self {
        self.credentials = Some(Arc::new(credentials));
        self
    }

    /// Sets a custom header provider in place of program credentials.
    pub fn header_provider(mut self, provider: Arc<dyn HeaderProvider>) -> Self {
        self.credentials = Some(provider);
        self
    }

    /// Sets a custom transport; every pooled handle will share it.
    pub fn transport(mut self, transport: Arc<dyn HttpTransport>) -> Self {
        self.transport = Some(transport);
        self
    }

    /// Sets the connection pool tuning.
    pub fn pool_tuning(mut self, tuning: PoolTuning) -> Self {
        self.pool_tuning = tuning;
        self
    }

    /// Sets the response cache tuning.
    pub fn cache_tuning(mut self, tuning: CacheTuning) -> Self {
        self.cache_tuning = tuning;
        self
    }

    /// Sets the metrics recorder tuning.
    pub fn metrics_tuning(mut self, tuning: MetricsTuning) -> Self {
        self.metrics_tuning = tuning;
        self
    }

    /// Sets the backoff shape for retries.
    ///
    /// The retry count itself follows the active configuration's
    /// `max_retries`; this tuning controls the delays between attempts.
    pub fn retry_tuning(mut self, tuning: RetryTuning) -> Self {
        self.retry_tuning = tuning;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ValidationError::InvalidArgument`] when
    /// the configured base URL is empty or unparseable.
    pub fn build(self) -> ValidationResult<ValidationClient> {
        let config = self.config_builder.build()?;
        let store = Arc::new(ConfigStore::new(config));

        let factory: Arc<dyn ConnectionFactory> = match self.transport {
            Some(transport) => Arc::new(StaticConnectionFactory::new(transport)),
            None => Arc::new(ReqwestConnectionFactory::new(Arc::clone(&store))),
        };

        let pool = Arc::new(ConnectionPool::new(
            Arc::clone(&store),
            factory,
            self.pool_tuning,
        ));
        let cache = Arc::new(ResponseCache::new(Arc::clone(&store), self.cache_tuning));
        let metrics = Arc::new(MetricsRecorder::new(
            Arc::clone(&store),
            self.metrics_tuning,
        ));

        let validations = ValidationsService::new(
            Arc::clone(&store),
            Arc::clone(&pool),
            Arc::clone(&cache),
            Arc::clone(&metrics),
            self.credentials,
            self.retry_tuning,
        );

        Ok(ValidationClient {
            config: store,
            pool,
            cache,
            metrics,
            validations,
        })
    }
}

impl Default for ValidationClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
