//! Resilient HTTP transport: retry loop, backoff policy, error classification.

pub mod backoff;
pub mod client;
pub mod errors;

pub use backoff::{backoff_delay, backoff_delay_with_jitter};
pub use client::ResilientClient;
pub use errors::ApiError;
