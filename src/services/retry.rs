//! Bounded exponential backoff for transient API failures.
//!
//! The delay before retry `n` (starting at 0) is
//! `backoff_factor * 2^n + jitter`, with jitter drawn uniformly from `[0, 1)`
//! seconds. The policy sleeps on the calling thread.

use std::time::Duration;

use log::{debug, error, warn};
use rand::Rng;

use crate::services::error::{ApiError, ErrorKind};

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_BACKOFF_FACTOR: f64 = 1.0;
/// Upper bound on a single backoff sleep.
pub const MAX_DELAY: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt (total attempts = 1 + max_retries).
    max_retries: u32,
    /// Base delay in seconds, doubled on each retry.
    backoff_factor: f64,
    retry_on: Vec<ErrorKind>,
    sleep: fn(Duration),
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            backoff_factor: DEFAULT_BACKOFF_FACTOR,
            retry_on: vec![ErrorKind::RateLimit, ErrorKind::Server],
            sleep: std::thread::sleep,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, backoff_factor: f64) -> Self {
        Self {
            max_retries,
            backoff_factor: backoff_factor.max(0.0),
            ..Default::default()
        }
    }

    /// Policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self::new(0, 0.0)
    }

    /// Replaces the set of error kinds that trigger a retry.
    pub fn with_retry_on(mut self, kinds: &[ErrorKind]) -> Self {
        self.retry_on = kinds.to_vec();
        self
    }

    /// Also retry connection-level failures (DNS, refused, timeout).
    pub fn with_transport_retries(mut self) -> Self {
        if !self.retry_on.contains(&ErrorKind::Transport) {
            self.retry_on.push(ErrorKind::Transport);
        }
        self
    }

    /// Overrides how the policy waits between attempts.
    pub fn with_sleep(mut self, sleep: fn(Duration)) -> Self {
        self.sleep = sleep;
        self
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub fn backoff_factor(&self) -> f64 {
        self.backoff_factor
    }

    pub fn is_retryable(&self, error: &ApiError) -> bool {
        self.retry_on.contains(&error.kind())
    }

    /// Delay before the retry with the given zero-based index, capped at
    /// [`MAX_DELAY`].
    pub fn delay_for(&self, retry_index: u32) -> Duration {
        let jitter: f64 = rand::rng().random();
        let exponent = retry_index.min(30) as i32;
        let seconds = self.backoff_factor * 2f64.powi(exponent) + jitter;
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(MAX_DELAY)
            .min(MAX_DELAY)
    }

    /// Runs `operation` until it succeeds, fails with a non-retryable error,
    /// or the retry budget is spent. The last error is returned unchanged.
    pub fn run<T, F>(&self, operation_name: &str, mut operation: F) -> Result<T, ApiError>
    where
        F: FnMut(u32) -> Result<T, ApiError>,
    {
        let mut attempt = 0;

        loop {
            match operation(attempt) {
                Ok(value) => {
                    if attempt > 0 {
                        debug!(
                            "{} succeeded after {} attempts",
                            operation_name,
                            attempt + 1
                        );
                    }
                    return Ok(value);
                }
                Err(error) => {
                    if !self.is_retryable(&error) {
                        debug!("{} failed with non-retryable error: {}", operation_name, error);
                        return Err(error);
                    }

                    if attempt >= self.max_retries {
                        error!(
                            "{} failed after {} attempts: {}",
                            operation_name,
                            attempt + 1,
                            error
                        );
                        return Err(error);
                    }

                    let delay = self.delay_for(attempt);
                    warn!(
                        "{} failed (attempt {}), retrying in {:?}: {}",
                        operation_name,
                        attempt + 1,
                        delay,
                        error
                    );

                    (self.sleep)(delay);
                    attempt += 1;
                }
            }
        }
    }
}
