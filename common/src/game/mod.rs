mod food;
mod game_loop;
mod scheduler;
mod session;
mod session_rng;
mod snake;
mod types;

pub use food::place_food;
pub use game_loop::{GameLoop, ScoreReporter};
pub use scheduler::TickScheduler;
pub use session::{GameOverReason, GameSession, SessionError, SessionStatus, TickOutcome};
pub use session_rng::SessionRng;
pub use snake::Snake;
pub use types::{Axis, Cell, Direction, Grid};

use std::time::Duration;

pub const GRID_SIZE: i32 = 20;
pub const CELL_SIZE: u32 = 20;
pub const TICK_INTERVAL: Duration = Duration::from_millis(100);
