//! Request identification for the validation API.
//!
//! The API authenticates callers through static program headers rather
//! than a token exchange: `x-client-id` names the calling system,
//! `x-program-id` and `x-program-id-type` name the validation program
//! the request runs under.

use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;

/// Applies caller identification headers to outgoing requests.
pub trait HeaderProvider: Send + Sync {
    /// Applies identification headers to the request header map.
    fn apply_headers(&self, headers: &mut HashMap<String, String>);
}

/// Program credentials for the validation API.
///
/// Carries the client id (treated as a secret, since it identifies and
/// authorizes the calling institution) plus the program id and its type,
/// e.g. program `VERIAUTH` with type `AVS` for account verification.
pub struct ProgramCredentials {
    client_id: SecretString,
    program_id: String,
    program_id_type: Option<String>,
}

impl ProgramCredentials {
    /// Creates credentials for a client and program.
    pub fn new(client_id: impl Into<String>, program_id: impl Into<String>) -> Self {
        Self {
            client_id: SecretString::new(client_id.into()),
            program_id: program_id.into(),
            program_id_type: None,
        }
    }

    /// Sets the program id type header value.
    pub fn with_program_id_type(mut self, id_type: impl Into<String>) -> Self {
        self.program_id_type = Some(id_type.into());
        self
    }

    /// Returns the program id.
    pub fn program_id(&self) -> &str {
        &self.program_id
    }

    /// Gets a hint of the client id for debugging (last 4 characters).
    pub fn client_id_hint(&self) -> String {
        let id = self.client_id.expose_secret();
        if id.len() > 4 {
            format!("...{}", &id[id.len() - 4..])
        } else {
            "****".to_string()
        }
    }
}

impl HeaderProvider for ProgramCredentials {
    fn apply_headers(&self, headers: &mut HashMap<String, String>) {
        headers.insert(
            "x-client-id".to_string(),
            self.client_id.expose_secret().to_string(),
        );
        headers.insert("x-program-id".to_string(), self.program_id.clone());
        if let Some(id_type) = &self.program_id_type {
            headers.insert("x-program-id-type".to_string(), id_type.clone());
        }
    }
}

impl std::fmt::Debug for ProgramCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramCredentials")
            .field("client_id", &"[REDACTED]")
            .field("client_id_hint", &self.client_id_hint())
            .field("program_id", &self.program_id)
            .field("program_id_type", &self.program_id_type)
            .finish()
    }
}
