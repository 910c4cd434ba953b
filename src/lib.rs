//! Payments Validation Client Library
//!
//! A production-ready Rust client for the J.P. Morgan payments validation
//! API. Wraps the `validations/accounts` and `validations/entities`
//! endpoints with connection pooling, response caching, retry with
//! exponential backoff, and request metrics.
//!
//! # Features
//!
//! - **Typed Requests**: Account, entity, and payroll validation builders
//!   that produce the exact wire payloads
//! - **Resilience**: Deterministic retry with doubling backoff for 5xx and
//!   transport failures; 4xx fails fast
//! - **Connection Pooling**: Idle transport handles are reused across calls
//! - **Response Caching**: Successful bodies are cached with an LRU bound
//!   and absolute TTL
//! - **Live Reconfiguration**: The active configuration can be replaced
//!   wholesale at any time; every call observes the current value
//! - **Observability**: `tracing` events plus an in-memory metrics log
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use validation_client::{
//!     Account, AccountValidationRequest, Individual, ProgramCredentials, ValidationClient,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ValidationClient::builder()
//!         .credentials(
//!             ProgramCredentials::new("CLIENTID", "VERIAUTH").with_program_id_type("AVS"),
//!         )
//!         .build()?;
//!
//!     let request = AccountValidationRequest::new(
//!         Account::aba("12345", "122199983"),
//!         Individual::new("Jane", "Abbott"),
//!     );
//!
//!     let response = client.validations().validate_account(&request).await?;
//!     println!("{}", response.body);
//!     Ok(())
//! }
//! ```
//!
//! # Live Reconfiguration
//!
//! ```rust
//! use std::time::Duration;
//! use validation_client::ValidationClient;
//!
//! fn main() -> Result<(), validation_client::ValidationError> {
//!     let client = ValidationClient::builder().build()?;
//!
//!     let mut config = (*client.config()).clone();
//!     config.timeout = Duration::from_secs(5);
//!     config.max_retries = 1;
//!     client.update_config(config);
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod auth;
pub mod cache;
pub mod client;
pub mod config;
pub mod errors;
pub mod observability;
pub mod pool;
pub mod resilience;
pub mod services;
pub mod transport;
pub mod types;

// Re-exports for convenience
pub use auth::ProgramCredentials;
pub use client::{ValidationClient, ValidationClientBuilder};
pub use config::{ConfigStore, ValidationConfig};
pub use errors::{ValidationError, ValidationResult};

// Type re-exports
pub use types::account::AccountValidationRequest;
pub use types::common::{
    Account, Amount, ClearingSystemId, FinancialInstitutionId, Individual, Transaction,
};
pub use types::entity::EntityValidationRequest;
pub use types::payroll::PayrollValidationRequest;
pub use types::response::ValidationResponse;

#[cfg(any(test, feature = "mocks"))]
pub mod mocks;
