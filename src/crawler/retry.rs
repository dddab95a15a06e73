//! Fixed-delay retry for transient failures
//!
//! The same policy wraps classification fetches and downloads. Only errors
//! that report themselves as transient are retried; anything else is returned
//! on the first occurrence.

use crate::config::HttpConfig;
use crate::{FetchError, SiphonError};
use std::future::Future;
use std::time::Duration;

/// Errors that can tell whether another attempt may succeed
pub trait Retryable {
    fn is_retryable(&self) -> bool;
}

impl Retryable for FetchError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

impl Retryable for SiphonError {
    fn is_retryable(&self) -> bool {
        self.is_transient()
    }
}

/// Retry policy parameterized by attempt count and delay
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one; never below one
    max_attempts: u32,

    /// Pause between two attempts
    delay: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Builds the policy from the HTTP section of the configuration
    pub fn from_config(config: &HttpConfig) -> Self {
        Self::new(config.retry_attempts, config.retry_delay)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the attempts are exhausted
    ///
    /// `label` only appears in log lines.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_retryable() && attempt < self.max_attempts => {
                    tracing::debug!(
                        "Attempt {}/{} for {} failed: {}; retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        label,
                        e,
                        self.delay
                    );
                    attempt += 1;
                    tokio::time::sleep(self.delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&HttpConfig::default())
    }
}
