//! Resilience layer for validation requests.
//!
//! Retry with exponential backoff around transient transport and server
//! failures.

mod retry;

pub use retry::{
    RetryPolicy, RetryTuning, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_INITIAL_BACKOFF,
    DEFAULT_MAX_BACKOFF,
};
