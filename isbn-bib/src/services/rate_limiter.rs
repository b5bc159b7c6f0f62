//! Cooperative rate limiting between sequential lookups
//!
//! The first call of a run goes out immediately; every later call is
//! preceded by the full configured delay.

use std::time::Duration;

/// Fixed-delay rate limiter, one per run
#[derive(Debug)]
pub struct RateLimiter {
    delay: Duration,
    primed: bool,
}

impl RateLimiter {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            primed: false,
        }
    }

    /// Wait if necessary before the next call
    pub async fn wait(&mut self) {
        if self.primed && !self.delay.is_zero() {
            tracing::debug!("Rate limiting: waiting {:?}", self.delay);
            tokio::time::sleep(self.delay).await;
        }
        self.primed = true;
    }
}
