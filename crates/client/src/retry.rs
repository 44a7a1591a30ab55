//! Retry policy with exponential backoff and jitter.
//!
//! Retries are a transport concern: destination code treats every call as
//! at-most-once and never loops on its own.

use rand::Rng;
use std::time::Duration;

/// Configuration for retry behavior.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    /// Maximum number of retries after the first attempt.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Upper bound for any computed delay.
    pub max_delay: Duration,
    /// How the delay grows between retries.
    pub backoff: BackoffStrategy,
    /// Honour `Retry-After` on 429 responses (capped by `max_retry_after`).
    pub respect_retry_after: bool,
    pub max_retry_after: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            backoff: BackoffStrategy::ExponentialWithJitter { factor: 2.0 },
            respect_retry_after: true,
            max_retry_after: Duration::from_secs(60),
        }
    }
}

impl RetryConfig {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self
    }

    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    pub fn with_backoff(mut self, backoff: BackoffStrategy) -> Self {
        self.backoff = backoff;
        self
    }

    /// A config that never retries.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 0,
            ..Default::default()
        }
    }
}

/// Backoff strategy for determining retry delays.
#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    /// Same delay every time.
    Constant,
    /// `initial * (retry + 1)`.
    Linear,
    /// `initial * factor^retry`.
    Exponential { factor: f64 },
    /// Exponential plus a random share of the base delay.
    ExponentialWithJitter { factor: f64 },
}

impl BackoffStrategy {
    /// Delay before retry number `retry` (0-indexed), capped at `max_delay`.
    pub fn delay(&self, retry: u32, initial_delay: Duration, max_delay: Duration) -> Duration {
        let exponential = |factor: f64| initial_delay.as_secs_f64() * factor.powi(retry as i32);

        let seconds = match *self {
            BackoffStrategy::Constant => initial_delay.as_secs_f64(),
            BackoffStrategy::Linear => initial_delay.as_secs_f64() * f64::from(retry + 1),
            BackoffStrategy::Exponential { factor } => exponential(factor),
            BackoffStrategy::ExponentialWithJitter { factor } => {
                let base = exponential(factor);
                base + rand::rng().random::<f64>() * base
            }
        };

        if !seconds.is_finite() || seconds >= max_delay.as_secs_f64() {
            max_delay
        } else {
            Duration::from_secs_f64(seconds)
        }
    }
}

/// Per-request retry state.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
    retries: u32,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config, retries: 0 }
    }

    /// Number of retries handed out so far.
    pub fn attempt(&self) -> u32 {
        self.retries
    }

    /// Delay before the next retry, or `None` once the budget is spent.
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Option<Duration> {
        if self.retries >= self.config.max_attempts {
            return None;
        }

        let delay = match retry_after {
            Some(server_delay) if self.config.respect_retry_after => {
                server_delay.min(self.config.max_retry_after)
            }
            _ => self.config.backoff.delay(
                self.retries,
                self.config.initial_delay,
                self.config.max_delay,
            ),
        };

        self.retries += 1;
        Some(delay)
    }
}
