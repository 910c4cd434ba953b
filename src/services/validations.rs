//! Validation orchestration.

use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::auth::HeaderProvider;
use crate::cache::{request_fingerprint, ResponseCache};
use crate::config::{ConfigStore, ValidationConfig};
use crate::errors::{ValidationError, ValidationResult};
use crate::observability::{MetricsRecorder, RequestMetric};
use crate::pool::ConnectionPool;
use crate::resilience::{RetryPolicy, RetryTuning};
use crate::transport::HttpRequest;
use crate::types::account::AccountValidationRequest;
use crate::types::entity::EntityValidationRequest;
use crate::types::payroll::PayrollValidationRequest;
use crate::types::response::ValidationResponse;

/// Endpoint for account and payroll validations.
pub const ACCOUNTS_ENDPOINT: &str = "validations/accounts";

/// Endpoint for entity validations.
pub const ENTITIES_ENDPOINT: &str = "validations/entities";

/// Orchestrates a validation call across the cache, pool, retry engine,
/// and metrics recorder.
pub struct ValidationsService {
    config: Arc<ConfigStore>,
    pool: Arc<ConnectionPool>,
    cache: Arc<ResponseCache>,
    metrics: Arc<MetricsRecorder>,
    credentials: Option<Arc<dyn HeaderProvider>>,
    retry: RetryTuning,
}

impl ValidationsService {
    /// Creates a new validations service.
    pub fn new(
        config: Arc<ConfigStore>,
        pool: Arc<ConnectionPool>,
        cache: Arc<ResponseCache>,
        metrics: Arc<MetricsRecorder>,
        credentials: Option<Arc<dyn HeaderProvider>>,
        retry: RetryTuning,
    ) -> Self {
        Self {
            config,
            pool,
            cache,
            metrics,
            credentials,
            retry,
        }
    }

    /// Validates a payload against the given endpoint.
    ///
    /// Checks the response cache first; on a miss, sends the payload with
    /// retry and backoff, records a metric, and caches a successful
    /// response body.
    pub async fn validate(
        &self,
        endpoint: &str,
        payload: &str,
    ) -> ValidationResult<ValidationResponse> {
        self.validate_with_cancellation(endpoint, payload, &CancellationToken::new())
            .await
    }

    /// Validates a payload, aborting when the token is cancelled.
    ///
    /// Cancellation takes effect between retry attempts and during
    /// backoff waits; see
    /// [`RetryPolicy::execute_with_cancellation`](crate::resilience::RetryPolicy::execute_with_cancellation).
    #[instrument(skip(self, payload, token), fields(endpoint = %endpoint))]
    pub async fn validate_with_cancellation(
        &self,
        endpoint: &str,
        payload: &str,
        token: &CancellationToken,
    ) -> ValidationResult<ValidationResponse> {
        if endpoint.is_empty() {
            return Err(ValidationError::invalid_param(
                "endpoint must not be empty",
                "endpoint",
            ));
        }
        if payload.is_empty() {
            return Err(ValidationError::invalid_param(
                "payload must not be empty",
                "payload",
            ));
        }

        // Cache hits skip the network and the metrics log entirely.
        let fingerprint = request_fingerprint(endpoint, payload);
        if let Some(body) = self.cache.lookup(&fingerprint) {
            tracing::debug!("Returning cached response");
            return Ok(ValidationResponse {
                status: 200,
                body,
                request_id: None,
                from_cache: true,
            });
        }

        let started = Instant::now();
        let connection = self.pool.acquire()?;
        let config = self.config.current();
        let http_request = self.build_request(&config, endpoint, payload);

        let attempts = Arc::new(AtomicU32::new(0));
        let last_response_size = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy::new(self.retry.clone().with_max_retries(config.max_retries));

        let result = policy
            .execute_with_cancellation(token, || {
                let transport = connection.transport();
                let request = http_request.clone();
                let attempts = Arc::clone(&attempts);
                let last_response_size = Arc::clone(&last_response_size);
                async move {
                    attempts.fetch_add(1, Ordering::SeqCst);
                    let response = transport.send(request).await?;
                    last_response_size.store(response.body.len(), Ordering::SeqCst);
                    if response.is_success() {
                        Ok(response)
                    } else {
                        Err(ValidationError::from_status(
                            response.status,
                            response.request_id(),
                        ))
                    }
                }
            })
            .await;

        let attempts = attempts.load(Ordering::SeqCst);
        let (status, success) = match &result {
            Ok(response) => (response.status, true),
            Err(err) => (err.status().unwrap_or(0), false),
        };
        self.metrics.record(RequestMetric {
            endpoint: endpoint.to_string(),
            duration: started.elapsed(),
            retry_count: attempts.saturating_sub(1),
            response_size: last_response_size.load(Ordering::SeqCst),
            status,
            success,
            timestamp: Utc::now(),
        });

        // The handle goes back before any error propagates.
        self.pool.release(connection);

        match result {
            Ok(response) => {
                let body = response.body_string();
                self.cache.store(&fingerprint, body.clone());
                tracing::debug!(status = response.status, attempts, "Validation succeeded");
                Ok(ValidationResponse {
                    status: response.status,
                    body,
                    request_id: response.request_id(),
                    from_cache: false,
                })
            }
            Err(err) => {
                tracing::warn!(error = %err, attempts, "Validation failed");
                Err(err)
            }
        }
    }

    /// Validates a bank account and its holder.
    pub async fn validate_account(
        &self,
        request: &AccountValidationRequest,
    ) -> ValidationResult<ValidationResponse> {
        self.validate(ACCOUNTS_ENDPOINT, &request.to_payload()?).await
    }

    /// Validates an individual without naming an account.
    pub async fn validate_entity(
        &self,
        request: &EntityValidationRequest,
    ) -> ValidationResult<ValidationResponse> {
        self.validate(ENTITIES_ENDPOINT, &request.to_payload()?).await
    }

    /// Validates a payroll destination account.
    pub async fn validate_payroll(
        &self,
        request: &PayrollValidationRequest,
    ) -> ValidationResult<ValidationResponse> {
        self.validate(ACCOUNTS_ENDPOINT, &request.to_payload()?).await
    }

    /// Builds the HTTP request for one validation exchange.
    ///
    /// The URL and timeout come from the configuration snapshot taken for
    /// this call, so pooled handles created under an older configuration
    /// still target the current base URL.
    fn build_request(
        &self,
        config: &ValidationConfig,
        endpoint: &str,
        payload: &str,
    ) -> HttpRequest {
        let mut request = HttpRequest::post(config.endpoint_url(endpoint))
            .with_header("Content-Type", "application/json")
            .with_header("Accept", "application/json")
            .with_body(payload.as_bytes().to_vec())
            .with_timeout(config.timeout);

        if let Some(credentials) = &self.credentials {
            credentials.apply_headers(&mut request.headers);
        }

        request
    }
}

impl std::fmt::Debug for ValidationsService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidationsService")
            .field("retry", &self.retry)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::auth::ProgramCredentials;
    use crate::cache::CacheTuning;
    use crate::mocks::{fixtures, MockResponse, MockTransport};
    use crate::observability::MetricsTuning;
    use crate::pool::{PoolTuning, StaticConnectionFactory};
    use crate::transport::TransportError;

    struct Harness {
        transport: Arc<MockTransport>,
        store: Arc<ConfigStore>,
        pool: Arc<ConnectionPool>,
        metrics: Arc<MetricsRecorder>,
        service: ValidationsService,
    }

    fn harness(config: ValidationConfig) -> Harness {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(ConfigStore::new(config));
        let pool = Arc::new(ConnectionPool::new(
            Arc::clone(&store),
            Arc::new(StaticConnectionFactory::new(Arc::clone(&transport) as _)),
            PoolTuning::default(),
        ));
        let cache = Arc::new(ResponseCache::new(
            Arc::clone(&store),
            CacheTuning::default(),
        ));
        let metrics = Arc::new(MetricsRecorder::new(
            Arc::clone(&store),
            MetricsTuning::default(),
        ));
        let credentials: Arc<dyn HeaderProvider> =
            Arc::new(ProgramCredentials::new("CLIENTID", "VERIAUTH").with_program_id_type("AVS"));
        let service = ValidationsService::new(
            Arc::clone(&store),
            Arc::clone(&pool),
            Arc::clone(&cache),
            Arc::clone(&metrics),
            Some(credentials),
            RetryTuning::new().with_initial_backoff(Duration::from_millis(1)),
        );
        Harness {
            transport,
            store,
            pool,
            metrics,
            service,
        }
    }

    fn default_harness() -> Harness {
        harness(ValidationConfig::default())
    }

    #[tokio::test]
    async fn test_successful_validation_returns_body() {
        let h = default_harness();
        h.transport.queue(fixtures::verification_success());

        let response = h
            .service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.body, fixtures::VERIFICATION_SUCCESS);
        assert!(!response.from_cache);
        assert_eq!(h.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_request_carries_url_headers_and_payload() {
        let h = default_harness();
        h.transport.queue(fixtures::verification_success());

        h.service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await
            .unwrap();

        let request = h.transport.last_request().unwrap();
        assert_eq!(
            request.url,
            "https://api-mock.payments.jpmorgan.com/tsapi/v2/validations/accounts"
        );
        assert_eq!(
            request.headers.get("Content-Type"),
            Some(&"application/json".to_string())
        );
        assert_eq!(
            request.headers.get("x-client-id"),
            Some(&"CLIENTID".to_string())
        );
        assert_eq!(
            request.headers.get("x-program-id"),
            Some(&"VERIAUTH".to_string())
        );
        assert_eq!(
            request.body.as_deref(),
            Some(r#"[{"requestId":"r-1"}]"#.as_bytes())
        );
        assert_eq!(request.timeout, Some(Duration::from_secs(30)));
    }

    #[tokio::test]
    async fn test_empty_arguments_are_rejected_without_network() {
        let h = default_harness();

        let empty_endpoint = h.service.validate("", "payload").await;
        let empty_payload = h.service.validate(ACCOUNTS_ENDPOINT, "").await;

        assert!(matches!(
            empty_endpoint,
            Err(ValidationError::InvalidArgument { .. })
        ));
        assert!(matches!(
            empty_payload,
            Err(ValidationError::InvalidArgument { .. })
        ));
        assert_eq!(h.transport.request_count(), 0);
        assert!(h.metrics.snapshot().is_empty());
    }

    #[tokio::test]
    async fn test_persistent_503_exhausts_retries() {
        let h = default_harness();
        h.transport.set_default(fixtures::service_unavailable());

        let result = h
            .service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await;

        assert!(matches!(
            result,
            Err(ValidationError::Server { status: 503, .. })
        ));
        // Initial attempt plus the default budget of three retries.
        assert_eq!(h.transport.request_count(), 4);

        let snapshot = h.metrics.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].retry_count, 3);
        assert_eq!(snapshot[0].status, 503);
        assert!(!snapshot[0].success);
    }

    #[tokio::test]
    async fn test_404_fails_on_first_attempt() {
        let h = default_harness();
        h.transport.queue(fixtures::not_found());

        let result = h
            .service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await;

        assert!(matches!(
            result,
            Err(ValidationError::Client { status: 404, .. })
        ));
        assert_eq!(h.transport.request_count(), 1);

        let snapshot = h.metrics.snapshot();
        assert_eq!(snapshot[0].retry_count, 0);
        assert!(!snapshot[0].success);
    }

    #[tokio::test]
    async fn test_connect_failure_is_retried_to_success() {
        let h = default_harness();
        h.transport.queue_error(TransportError::Connection {
            message: "connection refused".to_string(),
        });
        h.transport.queue(fixtures::verification_success());

        let response = h
            .service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await
            .unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(h.transport.request_count(), 2);

        let snapshot = h.metrics.snapshot();
        assert_eq!(snapshot[0].retry_count, 1);
        assert!(snapshot[0].success);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_network_and_metrics() {
        let h = default_harness();
        h.transport.queue(fixtures::verification_success());
        let payload = r#"[{"requestId":"r-1"}]"#;

        let first = h.service.validate(ACCOUNTS_ENDPOINT, payload).await.unwrap();
        let second = h.service.validate(ACCOUNTS_ENDPOINT, payload).await.unwrap();

        assert_eq!(first.body, second.body);
        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(h.transport.request_count(), 1);
        assert_eq!(h.metrics.snapshot().len(), 1);
    }

    #[tokio::test]
    async fn test_caching_disabled_hits_network_every_call() {
        let mut config = ValidationConfig::default();
        config.enable_caching = false;
        let h = harness(config);
        h.transport.set_default(fixtures::verification_success());
        let payload = r#"[{"requestId":"r-1"}]"#;

        h.service.validate(ACCOUNTS_ENDPOINT, payload).await.unwrap();
        h.service.validate(ACCOUNTS_ENDPOINT, payload).await.unwrap();

        assert_eq!(h.transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let h = default_harness();
        h.transport.queue(fixtures::not_found());
        h.transport.queue(fixtures::verification_success());
        let payload = r#"[{"requestId":"r-1"}]"#;

        let first = h.service.validate(ACCOUNTS_ENDPOINT, payload).await;
        let second = h.service.validate(ACCOUNTS_ENDPOINT, payload).await.unwrap();

        assert!(first.is_err());
        assert!(!second.from_cache);
        assert_eq!(h.transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_connection_released_on_success_and_failure() {
        let h = default_harness();
        h.transport.queue(fixtures::verification_success());
        h.transport.queue(fixtures::not_found());

        h.service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await
            .unwrap();
        let _ = h
            .service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-2"}]"#)
            .await;

        // Both calls returned their handle; the second call reused the first's.
        assert_eq!(h.pool.idle_count(), 1);
        assert_eq!(h.pool.stats().reused, 1);
    }

    #[tokio::test]
    async fn test_max_retries_follows_config_updates() {
        let h = default_harness();
        h.transport.set_default(fixtures::service_unavailable());

        let mut config = (*h.store.current()).clone();
        config.max_retries = 1;
        h.store.replace(config);

        let result = h
            .service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await;

        assert!(result.is_err());
        assert_eq!(h.transport.request_count(), 2);
    }

    #[tokio::test]
    async fn test_cancellation_surfaces_cancelled_error() {
        let h = default_harness();
        h.transport.set_default(fixtures::service_unavailable());
        let token = CancellationToken::new();
        token.cancel();

        let result = h
            .service
            .validate_with_cancellation(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#, &token)
            .await;

        assert!(matches!(result, Err(ValidationError::Cancelled)));
        assert_eq!(h.transport.request_count(), 0);
        // The handle still went back to the pool.
        assert_eq!(h.pool.idle_count(), 1);
    }

    #[tokio::test]
    async fn test_typed_account_validation_round_trip() {
        use crate::types::common::{Account, Individual};

        let h = default_harness();
        h.transport.queue(fixtures::verification_success());

        let request = AccountValidationRequest::new(
            Account::aba("12345", "122199983"),
            Individual::new("Jane", "Abbott"),
        )
        .with_request_id("r-typed-1");

        let response = h.service.validate_account(&request).await.unwrap();
        assert!(response.is_success());

        let sent = h.transport.last_request().unwrap();
        assert!(sent.url.ends_with("/validations/accounts"));
        let body: serde_json::Value =
            serde_json::from_slice(sent.body.as_deref().unwrap()).unwrap();
        assert_eq!(body[0]["account"]["accountNumber"], "12345");
    }

    #[tokio::test]
    async fn test_entity_validation_targets_entities_endpoint() {
        use crate::types::common::Individual;

        let h = default_harness();
        h.transport.queue(fixtures::verification_success());

        let request = EntityValidationRequest::new(Individual::new("John", "Doe"));
        h.service.validate_entity(&request).await.unwrap();

        let sent = h.transport.last_request().unwrap();
        assert!(sent.url.ends_with("/validations/entities"));
    }

    #[tokio::test]
    async fn test_response_request_id_comes_from_header() {
        let h = default_harness();
        h.transport.queue(
            MockResponse::json(fixtures::VERIFICATION_SUCCESS).with_header("x-request-id", "req-42"),
        );

        let response = h
            .service
            .validate(ACCOUNTS_ENDPOINT, r#"[{"requestId":"r-1"}]"#)
            .await
            .unwrap();

        assert_eq!(response.request_id.as_deref(), Some("req-42"));
    }
}
