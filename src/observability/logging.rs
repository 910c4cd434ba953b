//! Logging setup built on `tracing`.
//!
//! The client itself only emits `tracing` events; installing a subscriber
//! is the application's choice. [`LoggingConfig::init`] is a convenience
//! for binaries that want a sensible default.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

/// Output format for emitted log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable multi-line output for local development.
    Pretty,
    /// Single-line output.
    #[default]
    Compact,
    /// Newline-delimited JSON for log shippers.
    Json,
}

/// Configuration for the global tracing subscriber.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG` when set.
    pub filter: String,
    /// Output format.
    pub format: LogFormat,
    /// Whether to include the event target in output.
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "validation_client=info".to_string(),
            format: LogFormat::default(),
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Creates a configuration with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the default filter directive.
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Sets the output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Installs the global subscriber.
    ///
    /// # Errors
    ///
    /// Fails when a global subscriber is already installed.
    pub fn init(&self) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.filter));
        let registry = tracing_subscriber::registry().with(filter);

        match self.format {
            LogFormat::Pretty => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .pretty()
                        .with_target(self.include_target),
                )
                .try_init()?,
            LogFormat::Compact => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .compact()
                        .with_target(self.include_target),
                )
                .try_init()?,
            LogFormat::Json => registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(self.include_target),
                )
                .try_init()?,
        }

        Ok(())
    }
}
