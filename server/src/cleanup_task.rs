use std::sync::Arc;
use std::time::{Duration, Instant};

use common::log;

use crate::rate_limiter::RateLimiter;

/// Periodically forgets rate-limit windows that have run out.
pub struct CleanupTask {
    limiters: Vec<Arc<RateLimiter>>,
    check_interval: Duration,
}

impl CleanupTask {
    pub fn new(limiters: Vec<Arc<RateLimiter>>, check_interval: Duration) -> Self {
        Self {
            limiters,
            check_interval,
        }
    }

    pub async fn run(&self) {
        let mut interval = tokio::time::interval(self.check_interval);

        loop {
            interval.tick().await;
            self.cleanup_expired(Instant::now());
        }
    }

    fn cleanup_expired(&self, now: Instant) -> usize {
        let mut total = 0;
        for limiter in &self.limiters {
            let removed = limiter.prune(now);
            if removed > 0 {
                log!(
                    "Pruned {} expired '{}' rate-limit windows ({} still tracked)",
                    removed,
                    limiter.name(),
                    limiter.tracked_clients()
                );
            }
            total += removed;
        }
        total
    }
}
