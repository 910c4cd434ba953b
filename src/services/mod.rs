//! Service implementations for the validation API.

mod validations;

pub use validations::{ValidationsService, ACCOUNTS_ENDPOINT, ENTITIES_ENDPOINT};
