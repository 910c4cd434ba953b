//! Observability for the validation client.
//!
//! Structured logging rides on `tracing`; request-level metrics land in a
//! bounded in-memory log that callers can snapshot.

mod logging;
mod metrics;

pub use logging::{LogFormat, LoggingConfig};
pub use metrics::{
    MetricsRecorder, MetricsSummary, MetricsTuning, RequestMetric, DEFAULT_METRICS_CAPACITY,
};
