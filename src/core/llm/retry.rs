//! Retry Policy
//!
//! Classifies failed attempts and computes backoff delays. The client loop
//! only asks "what now?" and sleeps through an injected [`Sleeper`], which
//! keeps the schedule testable without real waiting.

use super::error::LLMError;
use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;

/// Default number of attempts, including the first one
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Default base delay for exponential backoff
pub const DEFAULT_BACKOFF_BASE: Duration = Duration::from_millis(1000);

/// Upper bound on any computed backoff delay
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(30);

/// What to do after a failed attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Provider told us how long to wait
    RetryAfter(Duration),
    /// Transient failure, wait per the backoff schedule
    Backoff,
    /// Retrying cannot help
    Fail,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub factor: f64,
    pub max_delay: Duration,
    /// Relative jitter, 0.25 means +/-25%
    pub jitter_ratio: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            base_delay: DEFAULT_BACKOFF_BASE,
            factor: 2.0,
            max_delay: DEFAULT_MAX_BACKOFF,
            jitter_ratio: 0.25,
        }
    }
}

impl RetryPolicy {
    pub fn with_max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter_ratio = 0.0;
        self
    }

    pub fn classify(&self, error: &LLMError) -> RetryDecision {
        if error.is_transport() {
            return RetryDecision::Backoff;
        }
        match error.status() {
            Some(429) => match error.retry_after() {
                Some(wait) => RetryDecision::RetryAfter(wait),
                None => RetryDecision::Backoff,
            },
            Some(status) if status >= 500 => RetryDecision::Backoff,
            _ => RetryDecision::Fail,
        }
    }

    /// Delay before retry number `step` (1-based) without jitter:
    /// `base * factor^(step-1)`, capped at `max_delay`.
    pub fn nominal_delay(&self, step: u32) -> Duration {
        let exponent = step.saturating_sub(1) as i32;
        let millis = self.base_delay.as_millis() as f64 * self.factor.powi(exponent);
        let capped = millis.min(self.max_delay.as_millis() as f64);
        Duration::from_millis(capped.max(0.0) as u64)
    }

    /// Nominal delay perturbed by `jitter` in `[-1.0, 1.0]` scaled by
    /// `jitter_ratio`, then capped again.
    pub fn backoff_delay(&self, step: u32, jitter: f64) -> Duration {
        let nominal = self.nominal_delay(step).as_millis() as f64;
        let offset = nominal * self.jitter_ratio * jitter.clamp(-1.0, 1.0);
        let millis = (nominal + offset).clamp(0.0, self.max_delay.as_millis() as f64);
        Duration::from_millis(millis as u64)
    }

    pub fn jittered_delay(&self, step: u32) -> Duration {
        let jitter = if self.jitter_ratio > 0.0 {
            rand::thread_rng().gen_range(-1.0..=1.0)
        } else {
            0.0
        };
        self.backoff_delay(step, jitter)
    }
}

/// Parse a `Retry-After` header value: delta-seconds or an HTTP-date.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Some(Duration::from_secs(secs));
    }
    if let Ok(secs) = value.parse::<f64>() {
        // Unrepresentable waits fall back to the backoff schedule
        return Duration::try_from_secs_f64(secs).ok();
    }
    let at = chrono::DateTime::parse_from_rfc2822(value).ok()?;
    let wait = at.with_timezone(&chrono::Utc) - chrono::Utc::now();
    Some(wait.to_std().unwrap_or(Duration::ZERO))
}

/// Source of waiting, swapped for a fake in tests
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Sleeps on the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
