use std::time::{Duration, Instant};

use super::scheduler::TickScheduler;
use super::session::{GameSession, SessionError, TickOutcome};
use super::session_rng::SessionRng;
use super::types::{Direction, Grid};

/// Receives the final score of a finished game. Only called for scores above zero.
pub trait ScoreReporter {
    fn report_final_score(&mut self, score: u32);
}

/// Owns a session together with its scheduler and randomness, and wires the
/// game-over path: stop ticking, then hand a non-zero score to the reporter.
pub struct GameLoop {
    session: GameSession,
    scheduler: TickScheduler,
    rng: SessionRng,
}

impl GameLoop {
    pub fn new(grid: Grid, tick_interval: Duration, mut rng: SessionRng) -> Result<Self, SessionError> {
        let session = GameSession::new(grid, &mut rng)?;
        Ok(Self::with_session(session, tick_interval, rng))
    }

    /// Drives an already built session, such as one from `GameSession::with_layout`.
    pub fn with_session(session: GameSession, tick_interval: Duration, rng: SessionRng) -> Self {
        Self {
            session,
            scheduler: TickScheduler::new(tick_interval),
            rng,
        }
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn is_ticking(&self) -> bool {
        self.scheduler.is_running()
    }

    pub fn time_until_next_tick(&self, now: Instant) -> Option<Duration> {
        self.scheduler.time_until_next(now)
    }

    pub fn start(&mut self, now: Instant) -> bool {
        if !self.session.start() {
            return false;
        }
        self.scheduler.start(now);
        true
    }

    /// Pausing keeps the scheduler running; paused ticks are no-ops.
    pub fn toggle_pause(&mut self) -> bool {
        self.session.toggle_pause()
    }

    pub fn restart(&mut self, now: Instant) {
        self.session.reset(&mut self.rng);
        self.scheduler.start(now);
    }

    pub fn request_direction(&mut self, direction: Direction) -> bool {
        self.session.request_direction(direction)
    }

    /// Runs the tick that is due at `now`, if any.
    pub fn poll(&mut self, now: Instant, reporter: &mut impl ScoreReporter) -> Option<TickOutcome> {
        if !self.scheduler.poll(now) {
            return None;
        }

        let outcome = self.session.tick(&mut self.rng);
        if let TickOutcome::GameOver { final_score, .. } = outcome {
            self.scheduler.stop();
            if final_score > 0 {
                reporter.report_final_score(final_score);
            }
        }
        Some(outcome)
    }
}
