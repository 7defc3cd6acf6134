//! Minimum-delay rate limiter for a single market data client.
//!
//! Enforces a fixed gap between consecutive outbound requests. The limiter
//! owns its `last_request` stamp; callers can only `acquire()`. Concurrent
//! callers are serialized: the state lock is held across the wait, so each
//! caller observes the previous caller's stamp.

use std::time::Duration;

use log::debug;
use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::provider::RateLimit;

/// Enforces a minimum delay between consecutive requests.
#[derive(Debug)]
pub struct RateLimiter {
    min_delay: Duration,
    last_request: Mutex<Option<Instant>>,
}

impl RateLimiter {
    /// Create a limiter with the given minimum gap.
    ///
    /// A zero delay disables waiting entirely.
    pub fn new(min_delay: Duration) -> Self {
        Self {
            min_delay,
            last_request: Mutex::new(None),
        }
    }

    /// Limiter that never waits.
    pub fn disabled() -> Self {
        Self::new(Duration::ZERO)
    }

    pub fn from_rate_limit(limit: &RateLimit) -> Self {
        Self::new(limit.min_delay)
    }

    pub fn min_delay(&self) -> Duration {
        self.min_delay
    }

    /// Wait until at least `min_delay` has elapsed since the previous
    /// request, then record the current instant as the new last request.
    ///
    /// The first call never waits.
    pub async fn acquire(&self) {
        if self.min_delay.is_zero() {
            return;
        }

        let mut last_request = self.last_request.lock().await;
        if let Some(previous) = *last_request {
            let elapsed = previous.elapsed();
            if elapsed < self.min_delay {
                let wait = self.min_delay - elapsed;
                debug!("Rate limiting: waiting {:.2}s", wait.as_secs_f64());
                tokio::time::sleep(wait).await;
            }
        }
        *last_request = Some(Instant::now());
    }
}
