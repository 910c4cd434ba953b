//! In-memory metrics for validation requests.
//!
//! Every completed request appends one [`RequestMetric`] to a bounded
//! in-memory log. When the log is full, recording stops silently and the
//! earlier entries are preserved. Readers take a snapshot copy, so held
//! snapshots are unaffected by later recording or resets.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::config::ConfigStore;

/// Default maximum number of recorded metrics.
pub const DEFAULT_METRICS_CAPACITY: usize = 1000;

/// Tuning for the metrics recorder.
#[derive(Debug, Clone)]
pub struct MetricsTuning {
    /// Maximum number of entries the log retains.
    pub capacity: usize,
}

impl Default for MetricsTuning {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_METRICS_CAPACITY,
        }
    }
}

impl MetricsTuning {
    /// Creates tuning with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the log capacity.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}

/// One completed validation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestMetric {
    /// Endpoint path the request targeted.
    pub endpoint: String,
    /// Wall-clock time from the start of the call to its completion,
    /// retries and backoff included.
    pub duration: Duration,
    /// Number of retries performed after the initial attempt.
    pub retry_count: u32,
    /// Size of the response body in bytes, zero when no response arrived.
    pub response_size: usize,
    /// Final HTTP status, zero when the request never got a response.
    pub status: u16,
    /// Whether the call completed successfully.
    pub success: bool,
    /// When the request completed.
    pub timestamp: DateTime<Utc>,
}

/// Aggregate view over a metrics snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetricsSummary {
    /// Requests recorded.
    pub total_requests: u64,
    /// Requests that completed successfully.
    pub successful_requests: u64,
    /// Requests that failed.
    pub failed_requests: u64,
    /// Retries performed across all requests.
    pub total_retries: u64,
    /// Summed wall-clock duration across all requests.
    pub total_duration: Duration,
}

impl MetricsSummary {
    /// Average request duration.
    pub fn average_duration(&self) -> Duration {
        if self.total_requests == 0 {
            Duration::ZERO
        } else {
            self.total_duration / self.total_requests as u32
        }
    }

    /// Success rate as a percentage.
    pub fn success_rate(&self) -> f64 {
        if self.total_requests == 0 {
            100.0
        } else {
            (self.successful_requests as f64 / self.total_requests as f64) * 100.0
        }
    }
}

/// Bounded in-memory log of request metrics.
pub struct MetricsRecorder {
    config: Arc<ConfigStore>,
    tuning: MetricsTuning,
    log: Mutex<Vec<RequestMetric>>,
}

impl MetricsRecorder {
    /// Creates an empty recorder.
    pub fn new(config: Arc<ConfigStore>, tuning: MetricsTuning) -> Self {
        Self {
            config,
            tuning,
            log: Mutex::new(Vec::new()),
        }
    }

    /// Appends a metric to the log.
    ///
    /// Dropped silently when metrics are disabled or the log is full;
    /// entries already recorded are never overwritten.
    pub fn record(&self, metric: RequestMetric) {
        if !self.config.current().enable_metrics {
            return;
        }

        if let Ok(mut log) = self.log.lock() {
            if log.len() < self.tuning.capacity {
                log.push(metric);
            }
        }
    }

    /// Returns a copy of the recorded metrics, oldest first.
    ///
    /// Empty while metrics are disabled.
    pub fn snapshot(&self) -> Vec<RequestMetric> {
        if !self.config.current().enable_metrics {
            return Vec::new();
        }

        self.log.lock().map(|log| log.clone()).unwrap_or_default()
    }

    /// Aggregates the current snapshot.
    pub fn summary(&self) -> MetricsSummary {
        let snapshot = self.snapshot();
        let mut summary = MetricsSummary {
            total_requests: snapshot.len() as u64,
            ..MetricsSummary::default()
        };
        for metric in &snapshot {
            if metric.success {
                summary.successful_requests += 1;
            } else {
                summary.failed_requests += 1;
            }
            summary.total_retries += u64::from(metric.retry_count);
            summary.total_duration += metric.duration;
        }
        summary
    }

    /// Number of entries currently stored.
    pub fn len(&self) -> usize {
        self.log.lock().map(|log| log.len()).unwrap_or(0)
    }

    /// Whether the log holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drops every recorded metric, making room for new ones.
    pub fn reset(&self) {
        if let Ok(mut log) = self.log.lock() {
            log.clear();
        }
    }
}

impl std::fmt::Debug for MetricsRecorder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MetricsRecorder")
            .field("tuning", &self.tuning)
            .field("len", &self.len())
            .finish()
    }
}
