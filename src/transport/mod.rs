//! HTTP transport layer for the validation client.
//!
//! Provides the transport abstraction the rest of the crate talks to
//! (`perform a request, get back status + body or a transport error`)
//! and the reqwest-backed implementation handed out by the connection
//! pool.

mod http;

pub use http::{HttpMethod, HttpRequest, HttpResponse, HttpTransport, ReqwestTransport};

use std::time::Duration;

/// Transport error types.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Connection establishment failed.
    #[error("Connection error: {message}")]
    Connection {
        /// Error message.
        message: String,
    },

    /// The attempt exceeded its timeout.
    #[error("Timeout after {timeout:?}")]
    Timeout {
        /// Timeout duration.
        timeout: Duration,
    },

    /// TLS setup failed (bad certificate or key material).
    #[error("TLS error: {message}")]
    Tls {
        /// Error message.
        message: String,
    },

    /// The exchange completed but the response could not be read.
    #[error("Invalid response: {message}")]
    InvalidResponse {
        /// Error message.
        message: String,
    },
}
