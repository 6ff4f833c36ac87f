use std::time::{Duration, Instant};

/// Fixed-cadence tick source driven by the caller's clock. At most one tick
/// fires per poll; if the caller falls behind, missed ticks are dropped
/// instead of being replayed in a burst.
#[derive(Clone, Debug)]
pub struct TickScheduler {
    interval: Duration,
    next_deadline: Option<Instant>,
}

impl TickScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            next_deadline: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.next_deadline.is_some()
    }

    pub fn start(&mut self, now: Instant) {
        self.next_deadline = Some(now + self.interval);
    }

    pub fn stop(&mut self) {
        self.next_deadline = None;
    }

    /// Time left until the next tick, if the scheduler is running.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.next_deadline
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        let Some(deadline) = self.next_deadline else {
            return false;
        };
        if now < deadline {
            return false;
        }

        let mut next = deadline + self.interval;
        if next <= now {
            next = now + self.interval;
        }
        self.next_deadline = Some(next);
        true
    }
}
