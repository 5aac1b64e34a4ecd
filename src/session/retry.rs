//! Retry policies
//!
//! Two independent layers retry against the flaky upstream: a transport
//! loop inside the session's `send` absorbs transient 5xx answers, and an
//! application-level policy re-runs whole logical operations (authenticate,
//! seed fetch, endpoint call, status check, body parse) on any retryable
//! failure.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tracing::warn;

use crate::error::{Error, Result};

/// HTTP statuses the transport loop retries beneath the application policy.
pub(crate) const TRANSPORT_RETRY_STATUSES: [u16; 4] = [500, 502, 503, 504];

/// Transport backoff: `base * 2^(attempt - 1)`, capped at 2^10 steps.
pub(crate) fn transport_backoff(base: Duration, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(10);
    base.saturating_mul(1u32 << shift)
}

/// Application-level retry policy.
///
/// The upstream rate-limits and flakes routinely, so the default favors
/// eventual success over fast failure: a fixed 3 second pause between
/// attempts and no attempt limit. Callers that cannot afford an unbounded
/// loop set `max_attempts`, `deadline`, or both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Fixed pause between attempts
    pub delay: Duration,

    /// Maximum number of attempts; unbounded when `None`
    pub max_attempts: Option<u32>,

    /// Overall time budget measured from the first attempt; unbounded when
    /// `None`
    pub deadline: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            delay: Duration::from_secs(3),
            max_attempts: None,
            deadline: None,
        }
    }
}

impl RetryPolicy {
    /// Unbounded policy with a custom fixed delay
    pub fn fixed(delay: Duration) -> Self {
        Self {
            delay,
            ..Self::default()
        }
    }

    /// Single attempt, no retries
    pub fn no_retry() -> Self {
        Self {
            delay: Duration::ZERO,
            max_attempts: Some(1),
            deadline: None,
        }
    }

    /// Bound the number of attempts (minimum one)
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts.max(1));
        self
    }

    /// Bound the total time spent across attempts and pauses
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Policy described by the retry section of the configuration
    pub fn from_settings(settings: &crate::config::RetrySettings) -> Self {
        Self {
            delay: settings.attempt_delay(),
            max_attempts: settings.max_attempts,
            deadline: settings.deadline_ms.map(Duration::from_millis),
        }
    }

    /// Run `op` until it succeeds, fails non-retryably, or hits a bound.
    /// The last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };

            if !err.is_retryable() {
                return Err(err);
            }
            if let Some(max) = self.max_attempts
                && attempt >= max
            {
                warn!(attempt, error = %err, "giving up after max attempts");
                return Err(err);
            }
            if let Some(deadline) = self.deadline
                && started.elapsed() + self.delay >= deadline
            {
                warn!(attempt, error = %err, "giving up at deadline");
                return Err(err);
            }

            warn!(
                attempt,
                delay_ms = self.delay.as_millis() as u64,
                error = %err,
                "operation failed, retrying"
            );
            tokio::time::sleep(self.delay).await;
        }
    }
}
