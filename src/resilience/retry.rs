//! Retry with exponential backoff.
//!
//! Drives an attempt/retry state machine: each attempt either succeeds,
//! fails terminally, or fails retryably. A retryable failure is retried
//! until the retry budget is spent, sleeping a deterministic doubling
//! backoff between attempts. Cancellation is honored between attempts
//! and during backoff waits, never mid-attempt.

use std::future::Future;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::config::DEFAULT_MAX_RETRIES;
use crate::errors::{ValidationError, ValidationResult};

/// Default backoff before the first retry.
pub const DEFAULT_INITIAL_BACKOFF: Duration = Duration::from_secs(1);

/// Default backoff growth factor.
pub const DEFAULT_BACKOFF_MULTIPLIER: f64 = 2.0;

/// Default ceiling on a single backoff wait.
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(60);

/// Retry configuration.
#[derive(Debug, Clone)]
pub struct RetryTuning {
    /// Maximum number of retries after the initial attempt.
    pub max_retries: u32,
    /// Backoff before the first retry.
    pub initial_backoff: Duration,
    /// Growth factor applied to the backoff after each retry.
    pub multiplier: f64,
    /// Ceiling on a single backoff wait.
    pub max_backoff: Duration,
}

impl Default for RetryTuning {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_backoff: DEFAULT_INITIAL_BACKOFF,
            multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_backoff: DEFAULT_MAX_BACKOFF,
        }
    }
}

impl RetryTuning {
    /// Creates tuning with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the retry budget.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Sets the backoff before the first retry.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    /// Sets the backoff growth factor.
    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    /// Sets the backoff ceiling.
    pub fn with_max_backoff(mut self, max_backoff: Duration) -> Self {
        self.max_backoff = max_backoff;
        self
    }

    /// Creates tuning that never retries.
    pub fn no_retries() -> Self {
        Self {
            max_retries: 0,
            ..Default::default()
        }
    }
}

/// Drives an operation through bounded retries with exponential backoff.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    tuning: RetryTuning,
}

impl RetryPolicy {
    /// Creates a policy from the given tuning.
    pub fn new(tuning: RetryTuning) -> Self {
        Self { tuning }
    }

    /// Executes an operation, retrying retryable failures.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> ValidationResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ValidationResult<T>>,
    {
        self.execute_with_cancellation(&CancellationToken::new(), operation)
            .await
    }

    /// Executes an operation, retrying retryable failures until the token
    /// is cancelled.
    ///
    /// Cancellation aborts before the next attempt or mid-backoff with
    /// [`ValidationError::Cancelled`]; an attempt already in flight runs
    /// to completion.
    #[instrument(skip_all, fields(max_retries = self.tuning.max_retries))]
    pub async fn execute_with_cancellation<F, Fut, T>(
        &self,
        token: &CancellationToken,
        operation: F,
    ) -> ValidationResult<T>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = ValidationResult<T>>,
    {
        let mut retries = 0;

        loop {
            if token.is_cancelled() {
                return Err(ValidationError::Cancelled);
            }

            match operation().await {
                Ok(result) => return Ok(result),
                Err(err) => {
                    if !err.is_retryable() || retries >= self.tuning.max_retries {
                        return Err(err);
                    }

                    let delay = self.backoff_delay(retries);
                    tracing::info!(
                        attempt = retries + 1,
                        max_retries = self.tuning.max_retries,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "Retrying after error"
                    );

                    tokio::select! {
                        _ = token.cancelled() => return Err(ValidationError::Cancelled),
                        _ = tokio::time::sleep(delay) => {}
                    }

                    retries += 1;
                }
            }
        }
    }

    /// Backoff before retry number `retries + 1`.
    ///
    /// The schedule is deterministic: `initial * multiplier^retries`,
    /// capped at `max_backoff`.
    fn backoff_delay(&self, retries: u32) -> Duration {
        let base = self.tuning.initial_backoff.as_millis() as f64
            * self.tuning.multiplier.powi(retries as i32);
        let capped = base.min(self.tuning.max_backoff.as_millis() as f64);
        Duration::from_millis(capped as u64)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(RetryTuning::default())
    }
}
