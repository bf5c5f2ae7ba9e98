//! Bounded exponential-backoff retry engine
//!
//! Wraps one asynchronous remote call in a retry loop. The loop is an
//! explicit state machine: each pass attempts the call, then either resolves
//! (success), fails (fatal classification or exhausted budget) or schedules
//! another attempt after a backoff delay. Waiting suspends the task via
//! `tokio::time::sleep`; no thread blocks during backoff.
//!
//! Error classification is injected per operation. The engine itself only
//! distinguishes "retry this" from "give up now"; benign outcomes (such as a
//! 404 on an idempotent delete) are mapped to successes by the operation's
//! attempt closure before the engine ever sees them.

use std::time::Duration;

use futures::future::BoxFuture;
use rand::Rng;
use tracing::warn;

use crate::error::{DriveError, Result};

/// Backoff parameters for one retry loop.
///
/// The delay before attempt `n + 1` is
/// `min(max_delay, base_delay * multiplier^(n - 1))`, optionally multiplied
/// by a random factor in `[1, 2)` when `jitter` is on. The cap applies after
/// jitter, so a computed delay never exceeds `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. Always at least 1.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub multiplier: f64,
    pub max_delay: Duration,
    pub jitter: bool,
}

impl RetryPolicy {
    /// Policy with the backoff shape used across all Drive calls: 1 second
    /// base, tripling per attempt, capped at 60 seconds, jittered.
    pub fn new(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay: Duration::from_secs(1),
            multiplier: 3.0,
            max_delay: Duration::from_secs(60),
            jitter: true,
        }
    }

    pub fn with_base_delay(mut self, base_delay: Duration) -> Self {
        self.base_delay = base_delay;
        self
    }

    pub fn with_multiplier(mut self, multiplier: f64) -> Self {
        self.multiplier = multiplier;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    pub fn with_jitter(mut self, jitter: bool) -> Self {
        self.jitter = jitter;
        self
    }

    /// Delay to wait after a failed attempt `attempt` (1-based).
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponential =
            self.base_delay.as_secs_f64() * self.multiplier.powi(attempt.saturating_sub(1) as i32);

        let seconds = if self.jitter {
            exponential * rand::rng().random_range(1.0..2.0)
        } else {
            exponential
        };

        // Cap before constructing the Duration: the uncapped exponential
        // overflows Duration's range within a few dozen attempts.
        Duration::from_secs_f64(seconds.min(self.max_delay.as_secs_f64()))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(5)
    }
}

/// Per-operation-family retry policies held by the client.
///
/// The families mirror the budgets the operations have always used: five
/// attempts for listing and plain mutations, six for copy, permission
/// reads/updates, property merges and downloads.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Listing pages and create/update/delete style calls
    pub standard: RetryPolicy,
    /// Copy, permission listing/update and property merges
    pub extended: RetryPolicy,
    /// Streaming downloads
    pub download: RetryPolicy,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            standard: RetryPolicy::new(5),
            extended: RetryPolicy::new(6),
            download: RetryPolicy::new(6),
        }
    }
}

/// Verdict of an error classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Retry per policy until the budget runs out
    Transient,
    /// Surface to the caller immediately, no further attempts
    Fatal,
}

/// Default classification: every remote fault is worth retrying.
pub fn classify_transient(_err: &DriveError) -> ErrorClass {
    ErrorClass::Transient
}

/// Classification for permission-sensitive calls: a 403 carrying the
/// insufficient-permissions message is terminal, everything else retries.
pub fn classify_permission_guarded(err: &DriveError) -> ErrorClass {
    if err.is_insufficient_permissions() {
        ErrorClass::Fatal
    } else {
        ErrorClass::Transient
    }
}

/// Run `attempt` under `policy`, retrying transient failures with backoff.
///
/// `attempt` receives the 1-based attempt number and performs exactly one
/// remote call. Fatal classification is consulted before the remaining-budget
/// check, so a fatal error is surfaced even when attempts remain. On
/// exhaustion the last observed error is returned verbatim.
pub async fn execute_with_retry<'f, T>(
    policy: &RetryPolicy,
    classify: impl Fn(&DriveError) -> ErrorClass,
    mut attempt: impl FnMut(u32) -> BoxFuture<'f, Result<T>>,
) -> Result<T> {
    let mut attempt_no = 1u32;

    loop {
        match attempt(attempt_no).await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if classify(&err) == ErrorClass::Fatal {
                    warn!(attempt = attempt_no, error = %err, "request failed with non-retryable error");
                    return Err(err);
                }

                if attempt_no >= policy.max_attempts {
                    warn!(
                        attempts = attempt_no,
                        error = %err,
                        "request failed, retry budget exhausted"
                    );
                    return Err(err);
                }

                let delay = policy.delay_for_attempt(attempt_no);
                warn!(
                    attempt = attempt_no,
                    max_attempts = policy.max_attempts,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt_no += 1;
            }
        }
    }
}
