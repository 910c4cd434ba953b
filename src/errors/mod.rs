//! Error types for the validation client.
//!
//! Provides the error taxonomy for all failure modes: argument validation,
//! pool exhaustion, transport failures, server/client HTTP errors, payload
//! serialization failures, and caller-driven cancellation.

use thiserror::Error;

/// Result type alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Error type for validation client operations.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Invalid argument (empty endpoint/payload, incomplete typed request).
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Error message describing the invalid argument.
        message: String,
        /// The parameter that caused the error.
        param: Option<String>,
    },

    /// Connection pool could not produce a transport handle.
    #[error("Connection pool exhausted: {message}")]
    PoolExhausted {
        /// Error message describing the acquisition failure.
        message: String,
    },

    /// Transport-level failure (connect failure, timeout, TLS).
    #[error("Transport error: {message}")]
    Transport {
        /// Error message.
        message: String,
        /// Whether the failure is worth retrying (connect/timeout are,
        /// TLS and malformed-response failures are not).
        retryable: bool,
    },

    /// Server error (5xx status codes).
    #[error("Server error (HTTP {status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Request ID for correlation.
        request_id: Option<String>,
    },

    /// Client error (4xx and other non-5xx failure statuses).
    #[error("Client error (HTTP {status}): {message}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Error message.
        message: String,
        /// Request ID for correlation.
        request_id: Option<String>,
    },

    /// Payload serialization failed.
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message.
        message: String,
    },

    /// The caller revoked the cancellation token.
    #[error("Request cancelled")]
    Cancelled,
}

impl ValidationError {
    /// Returns true if this error is retryable.
    ///
    /// Server errors (always 5xx) and transport connect/timeout failures
    /// are retryable; everything else terminates the attempt loop.
    pub fn is_retryable(&self) -> bool {
        match self {
            ValidationError::Server { .. } => true,
            ValidationError::Transport { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Returns the HTTP status associated with this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ValidationError::Server { status, .. } | ValidationError::Client { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    /// Creates an invalid argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        ValidationError::InvalidArgument {
            message: message.into(),
            param: None,
        }
    }

    /// Creates an invalid argument error naming the offending parameter.
    pub fn invalid_param(message: impl Into<String>, param: impl Into<String>) -> Self {
        ValidationError::InvalidArgument {
            message: message.into(),
            param: Some(param.into()),
        }
    }

    /// Creates a pool exhaustion error.
    pub fn pool_exhausted(message: impl Into<String>) -> Self {
        ValidationError::PoolExhausted {
            message: message.into(),
        }
    }

    /// Creates a retryable transport error.
    pub fn transport(message: impl Into<String>) -> Self {
        ValidationError::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    /// Creates a server error.
    pub fn server(status: u16, message: impl Into<String>) -> Self {
        ValidationError::Server {
            status,
            message: message.into(),
            request_id: None,
        }
    }

    /// Creates a client error.
    pub fn client(status: u16, message: impl Into<String>) -> Self {
        ValidationError::Client {
            status,
            message: message.into(),
            request_id: None,
        }
    }

    /// Classifies a non-2xx HTTP status into a server or client error.
    pub fn from_status(status: u16, request_id: Option<String>) -> Self {
        if (500..600).contains(&status) {
            ValidationError::Server {
                status,
                message: format!("HTTP {}", status),
                request_id,
            }
        } else {
            ValidationError::Client {
                status,
                message: format!("HTTP {}", status),
                request_id,
            }
        }
    }
}

impl From<reqwest::Error> for ValidationError {
    fn from(err: reqwest::Error) -> Self {
        ValidationError::Transport {
            retryable: err.is_timeout() || err.is_connect(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        ValidationError::Serialization {
            message: err.to_string(),
        }
    }
}

impl From<crate::transport::TransportError> for ValidationError {
    fn from(err: crate::transport::TransportError) -> Self {
        use crate::transport::TransportError;

        match err {
            TransportError::Connection { message } => ValidationError::Transport {
                message,
                retryable: true,
            },
            TransportError::Timeout { timeout } => ValidationError::Transport {
                message: format!("request timed out after {:?}", timeout),
                retryable: true,
            },
            TransportError::Tls { message } => ValidationError::Transport {
                message,
                retryable: false,
            },
            TransportError::InvalidResponse { message } => ValidationError::Transport {
                message,
                retryable: false,
            },
        }
    }
}
