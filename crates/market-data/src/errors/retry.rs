use std::future::Future;
use std::time::Duration;

use tracing::warn;

/// Classification for retry policy.
///
/// Used to determine whether a failed upstream call may be attempted again.
///
/// | Class | Retry? |
/// |-------|--------|
/// | `Never` | No, the failure is terminal for this request |
/// | `WithBackoff` | Yes, after an exponentially growing delay |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Never retry - authentication failure, bad request, undecodable body.
    /// Retrying the same request cannot succeed.
    Never,

    /// Retry with exponential backoff.
    ///
    /// Used for transport failures, timeouts, rate limiting (429) and
    /// upstream server errors (5xx).
    WithBackoff,
}

impl RetryClass {
    /// Classifies an HTTP status code returned by an upstream service.
    ///
    /// `None` stands for "no response at all" (connect error, timeout).
    pub fn for_status(status: Option<u16>) -> Self {
        match status {
            None => RetryClass::WithBackoff,
            Some(429) => RetryClass::WithBackoff,
            Some(code) if (500..600).contains(&code) => RetryClass::WithBackoff,
            Some(_) => RetryClass::Never,
        }
    }
}

/// Errors that know their own [`RetryClass`].
pub trait Retryable {
    fn retry_class(&self) -> RetryClass;
}

/// Bounded exponential backoff.
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first one. `1` disables retries.
    pub max_attempts: u32,

    /// Delay before the second attempt.
    pub initial_backoff: Duration,

    /// Upper bound for any single delay.
    pub max_backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(250),
            max_backoff: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    /// A policy that performs exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Delay to wait after the given (1-based) failed attempt.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }

    /// Runs `operation` until it succeeds, fails terminally, or the attempt
    /// budget is spent. The closure is invoked once per attempt so that every
    /// attempt builds (and signs) a fresh request.
    pub async fn run<T, E, F, Fut>(&self, label: &str, mut operation: F) -> Result<T, E>
    where
        E: Retryable + std::fmt::Display,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err)
                    if attempt < max_attempts && err.retry_class() == RetryClass::WithBackoff =>
                {
                    let delay = self.backoff_for(attempt);
                    warn!(
                        "{} attempt {}/{} failed: {}. Retrying in {:?}",
                        label, attempt, max_attempts, err, delay
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
