//! Bounded retry wrapper with configurable backoff
//!
//! Usable independently of the recovery facade: re-invokes an
//! arbitrary fallible operation up to a fixed attempt ceiling,
//! filtering on which failures are worth retrying. Unlike the
//! executor, this wrapper re-raises the underlying failure on
//! exhaustion so callers can still fail the overall operation.

use std::time::Duration;
use tokio::time::sleep;
use tracing::debug;

/// Default attempt ceiling
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Backoff policy between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Backoff {
    /// Same wait before every re-attempt
    Fixed(Duration),

    /// `base * multiplier^(attempt-1)`, capped at `cap`
    Exponential {
        base: Duration,
        multiplier: f64,
        cap: Duration,
    },
}

impl Backoff {
    /// Conventional binary exponential: 1s base, doubling, 16s cap
    pub fn exponential() -> Self {
        Backoff::Exponential {
            base: Duration::from_secs(1),
            multiplier: 2.0,
            cap: Duration::from_secs(16),
        }
    }
}

/// Bounded retry policy
#[derive(Debug, Clone)]
pub struct BoundedRetry {
    /// Attempt ceiling (always treated as at least 1)
    max_attempts: u32,

    /// Wait policy between failed attempts
    backoff: Backoff,

    /// Add ±25% random variation to each wait
    enable_jitter: bool,
}

impl Default for BoundedRetry {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, Backoff::exponential())
    }
}

impl BoundedRetry {
    pub fn new(max_attempts: u32, backoff: Backoff) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
            enable_jitter: false,
        }
    }

    pub fn with_jitter(mut self) -> Self {
        self.enable_jitter = true;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Run `operation` until it succeeds, a non-retryable failure
    /// occurs, or attempts are exhausted.
    ///
    /// Non-retryable failures propagate immediately without consuming
    /// an attempt's backoff. On exhaustion the final failure is
    /// re-raised, never swallowed.
    pub async fn run<F, Fut, T, E>(
        &self,
        retryable: impl Fn(&E) -> bool,
        mut operation: F,
    ) -> Result<T, E>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let mut attempt = 1;

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !retryable(&e) {
                        return Err(e);
                    }

                    if attempt >= self.max_attempts {
                        debug!(attempt, error = %e, "retry attempts exhausted");
                        return Err(e);
                    }

                    let delay = self.delay_for(attempt);
                    debug!(attempt, delay_ms = delay.as_millis() as u64, error = %e, "retrying after backoff");
                    sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }

    /// Wait before re-attempt number `attempt + 1` (1-based attempts)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let raw = match self.backoff {
            Backoff::Fixed(wait) => wait,
            Backoff::Exponential {
                base,
                multiplier,
                cap,
            } => {
                let scaled = base.as_secs_f64() * multiplier.powi(attempt.saturating_sub(1) as i32);
                Duration::from_secs_f64(scaled).min(cap)
            }
        };

        if self.enable_jitter {
            let jitter_band = raw.as_secs_f64() / 4.0;
            let offset = (rand::random::<f64>() * 2.0 - 1.0) * jitter_band;
            Duration::from_secs_f64((raw.as_secs_f64() + offset).max(0.0))
        } else {
            raw
        }
    }

    /// Upper bound on total time spent sleeping across a full run
    /// (jitter excluded)
    pub fn max_total_wait(&self) -> Duration {
        (1..self.max_attempts).fold(Duration::ZERO, |total, attempt| {
            total
                + match self.backoff {
                    Backoff::Fixed(wait) => wait,
                    Backoff::Exponential { .. } => self.delay_for(attempt),
                }
        })
    }
}
