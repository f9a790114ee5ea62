use std::sync::Arc;
use std::time::Duration;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};

/// One cell per `interval`, no burst
fn spacing_quota(interval: Duration) -> Option<Quota> {
    Quota::with_period(interval)
}

/// Spaces outbound catalog requests
///
/// Backed by a GCRA limiter with a burst of one, so consecutive request
/// starts are at least `interval` apart however many tasks share it. A
/// zero interval disables throttling. Clones share the same limiter.
#[derive(Clone)]
pub struct RequestThrottle {
    interval: Duration,
    limiter: Option<Arc<DefaultDirectRateLimiter>>,
}

impl RequestThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            limiter: spacing_quota(interval).map(|quota| Arc::new(RateLimiter::direct(quota))),
        }
    }

    /// Waits until this caller may start a request
    pub async fn acquire(&self) {
        if let Some(limiter) = &self.limiter {
            limiter.until_ready().await;
            tracing::trace!(interval_ms = self.interval.as_millis() as u64, "Throttle slot acquired");
        }
    }
}

impl std::fmt::Debug for RequestThrottle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestThrottle")
            .field("interval", &self.interval)
            .finish()
    }
}
