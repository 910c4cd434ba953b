//! Validation call responses.

use serde::de::DeserializeOwned;

use crate::errors::ValidationResult;

/// Outcome of a completed validation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationResponse {
    /// Final HTTP status.
    pub status: u16,

    /// Raw response body, exactly as the server returned it.
    pub body: String,

    /// Correlation id echoed by the server, when present.
    pub request_id: Option<String>,

    /// Whether the body was served from the response cache.
    pub from_cache: bool,
}

impl ValidationResponse {
    /// Whether the call completed with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserializes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`crate::errors::ValidationError::Serialization`] when the
    /// body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> ValidationResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}
