//! Resilient calls
//!
//! Bounded exponential-backoff retry around a single remote operation.
//! Every failed attempt is logged with its attempt count and the delay
//! before the next try; exhaustion is logged and the last error returned.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

/// Classification of a failure as worth retrying or not.
///
/// Only consulted when the policy has `classify_errors` set; terminal
/// failures are then surfaced on the first attempt.
pub trait Retryable {
    /// Whether another attempt could succeed
    fn is_retryable(&self) -> bool {
        true
    }
}

/// Retry policy for remote calls
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts including the first (values below 1 act as 1)
    pub max_attempts: u32,
    /// Delay before the first retry
    pub base_delay: Duration,
    /// Upper bound for any single delay
    pub max_delay: Duration,
    /// Upper bound (exclusive) of the random jitter added to each delay
    pub max_jitter: Duration,
    /// Stop on the first error that `Retryable` marks terminal
    pub classify_errors: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(60),
            max_jitter: Duration::from_secs(1),
            classify_errors: false,
        }
    }
}

impl RetryPolicy {
    /// Policy that retries without sleeping between attempts
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            max_jitter: Duration::ZERO,
            classify_errors: false,
        }
    }

    /// Delay after the given failed attempt (1-indexed):
    /// `min(max_delay, base_delay * 2^(attempt-1) + jitter)`.
    ///
    /// `jitter_fraction` is a draw from `[0, 1)` scaled by `max_jitter`.
    pub fn delay_for_attempt(&self, attempt: u32, jitter_fraction: f64) -> Duration {
        let exponent = attempt.saturating_sub(1);
        let factor = 2u32.checked_pow(exponent).unwrap_or(u32::MAX);
        let backoff = self.base_delay.saturating_mul(factor);
        let jitter = self.max_jitter.mul_f64(jitter_fraction.clamp(0.0, 1.0));
        backoff.saturating_add(jitter).min(self.max_delay)
    }

    fn attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }
}

/// Run `call` until it succeeds or the policy's attempts are used up.
///
/// Every error is retried unless the policy classifies errors, in which
/// case a non-retryable error ends the loop at once.
///
/// The calling task sleeps between attempts; nothing else is mutated.
///
/// # Arguments
/// * `policy` - Attempt budget and backoff parameters
/// * `operation` - Name used in log lines
/// * `call` - Produces one attempt's future
///
/// # Returns
/// * `Ok(T)` - The first successful result
/// * `Err(E)` - The last error once attempts run out, or a terminal error
///   under a classifying policy
pub async fn retry_with_backoff<T, E, F, Fut>(
    policy: &RetryPolicy,
    operation: &str,
    mut call: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + Display,
{
    let max_attempts = policy.attempts();
    let mut attempt = 0;

    loop {
        attempt += 1;
        let error = match call().await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        if policy.classify_errors && !error.is_retryable() {
            tracing::error!(
                operation = operation,
                attempt = attempt,
                error = %error,
                "Remote call failed with a non-retryable error"
            );
            return Err(error);
        }

        if attempt >= max_attempts {
            tracing::error!(
                operation = operation,
                attempts = attempt,
                error = %error,
                "Remote call failed after exhausting all attempts"
            );
            return Err(error);
        }

        let delay = policy.delay_for_attempt(attempt, rand::random::<f64>());
        tracing::warn!(
            operation = operation,
            attempt = attempt,
            max_attempts = max_attempts,
            delay_ms = delay.as_millis() as u64,
            error = %error,
            "Remote call failed, retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
