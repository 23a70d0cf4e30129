use crate::error::FetchError;
use rand::Rng;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// Backoff schedule for transient retrieval failures.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on every further retry.
    pub base_delay: Duration,
    pub max_delay: Duration,
    /// Adds up to half of `base_delay` of random jitter, never past `max_delay`.
    pub jitter: bool,
}

impl RetryPolicy {
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            jitter: false,
        }
    }

    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let multiplier = 1u32.checked_shl(attempt).unwrap_or(u32::MAX);
        let capped = self
            .base_delay
            .checked_mul(multiplier)
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if !self.jitter {
            return capped;
        }

        let jitter_range_ms = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX) / 2;
        let remaining_ms =
            u64::try_from(self.max_delay.saturating_sub(capped).as_millis()).unwrap_or(0);
        let limit = jitter_range_ms.min(remaining_ms);
        if limit == 0 {
            return capped;
        }

        let jitter_ms = rand::thread_rng().gen_range(0..limit);
        (capped + Duration::from_millis(jitter_ms)).min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, fails permanently, or the retry budget is spent.
///
/// Only errors for which [`FetchError::is_transient`] holds are retried. The
/// token is checked before every attempt and raced against both the attempt
/// and the backoff sleep, so cancellation drops the in-flight future and
/// reports [`FetchError::Cancelled`].
pub async fn retry_with_backoff<F, Fut, T>(
    policy: &RetryPolicy,
    cancel: &CancellationToken,
    operation: F,
) -> Result<T, FetchError>
where
    F: Fn(u32) -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    let mut attempt = 0u32;
    loop {
        if cancel.is_cancelled() {
            return Err(FetchError::Cancelled);
        }

        let outcome = tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            outcome = operation(attempt) => outcome,
        };

        let err = match outcome {
            Ok(value) => return Ok(value),
            Err(err) if !err.is_transient() => return Err(err),
            Err(err) => err,
        };

        if attempt >= policy.max_retries {
            return Err(FetchError::RetriesExhausted {
                attempts: attempt + 1,
                last: Box::new(err),
            });
        }

        let delay = policy.delay_for_attempt(attempt);
        warn!(
            attempt = attempt + 1,
            max = policy.max_retries,
            delay_ms = delay.as_millis() as u64,
            error = %err,
            "Retrying after transient error"
        );
        tokio::select! {
            _ = cancel.cancelled() => return Err(FetchError::Cancelled),
            _ = tokio::time::sleep(delay) => {}
        }
        attempt += 1;
    }
}
