//! Utilities shared by every connector

pub mod retry;

pub use retry::{RetryConfig, apply_jitter, retry, retry_with_backoff};
