//! Per-user generation rate limiting
//!
//! Counts successful generations in a trailing window straight from the
//! audit log. Read-then-insert-elsewhere: concurrent requests from one user
//! can overshoot the ceiling by a request or two.

use super::store::GenerationLog;
use std::sync::Arc;

/// Default ceiling of successful generations per window
pub const DEFAULT_HOURLY_LIMIT: u32 = 10;

pub struct RateLimiter {
    log: Arc<dyn GenerationLog>,
    limit: u32,
    window: chrono::Duration,
}

impl RateLimiter {
    pub fn new(log: Arc<dyn GenerationLog>, limit: u32) -> Self {
        Self {
            log,
            limit,
            window: chrono::Duration::minutes(60),
        }
    }

    pub fn with_window(mut self, window: chrono::Duration) -> Self {
        self.window = window;
        self
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// True when the user is strictly below the ceiling.
    ///
    /// Fails open: if the count cannot be read the request is permitted and
    /// a warning is logged.
    pub async fn allow(&self, user_id: &str) -> bool {
        let since = chrono::Utc::now() - self.window;
        match self.log.count_generations_since(user_id, since).await {
            Ok(count) => {
                log::debug!("User {} has {} generation(s) in window (limit {})", user_id, count, self.limit);
                count < self.limit
            }
            Err(e) => {
                log::warn!(
                    "Rate limit check unavailable for user {}, permitting request: {}",
                    user_id,
                    e
                );
                true
            }
        }
    }
}
