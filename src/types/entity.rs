//! Entity validation requests.

use serde::Serialize;
use uuid::Uuid;

use crate::errors::{ValidationError, ValidationResult};
use crate::types::common::Individual;

/// Request to validate an individual without naming an account.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityValidationRequest {
    /// Caller-supplied request id; a v4 UUID is generated when absent.
    pub request_id: Option<String>,

    /// Individual under validation.
    pub individual: Individual,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Wire<'a> {
    request_id: &'a str,
    entity: EntityWire<'a>,
}

#[derive(Serialize)]
struct EntityWire<'a> {
    individual: &'a Individual,
}

impl EntityValidationRequest {
    /// Creates a request for the given individual.
    pub fn new(individual: Individual) -> Self {
        Self {
            request_id: None,
            individual,
        }
    }

    /// Pins the request id instead of generating one.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }

    /// Checks that every required field is present.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidArgument`] naming the offending
    /// field.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.individual.first_name.is_empty() || self.individual.last_name.is_empty() {
            return Err(ValidationError::invalid_param(
                "individual name must not be empty",
                "individual",
            ));
        }
        Ok(())
    }

    /// Serializes the request to its wire payload.
    pub fn to_payload(&self) -> ValidationResult<String> {
        self.validate()?;
        let request_id = self
            .request_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let wire = [Wire {
            request_id: &request_id,
            entity: EntityWire {
                individual: &self.individual,
            },
        }];
        Ok(serde_json::to_string(&wire)?)
    }
}
