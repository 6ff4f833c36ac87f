use thiserror::Error;

use super::food::place_food;
use super::session_rng::SessionRng;
use super::snake::Snake;
use super::types::{Cell, Direction, Grid};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameOverReason {
    WallCollision,
    SelfCollision,
    /// The snake covers every cell, so no food can be placed.
    BoardFilled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStatus {
    Idle,
    Running,
    Paused,
    GameOver(GameOverReason),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// Not running (idle, paused or already over); nothing changed.
    Skipped,
    Moved,
    AteFood { score: u32 },
    GameOver { reason: GameOverReason, final_score: u32 },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("grid {width}x{height} is too small for the starting snake")]
    GridTooSmall { width: i32, height: i32 },
    #[error("snake must have at least one cell and must not overlap itself")]
    InvalidSnake,
    #[error("cell ({}, {}) is outside the grid", .0.x, .0.y)]
    OutOfBounds(Cell),
    #[error("food at ({}, {}) overlaps the snake", .0.x, .0.y)]
    FoodOnSnake(Cell),
}

/// One client-owned game: snake, committed and pending direction, food,
/// score and lifecycle state. All mutation goes through `tick`, the input
/// methods and the lifecycle methods.
#[derive(Clone, Debug)]
pub struct GameSession {
    grid: Grid,
    snake: Snake,
    direction: Direction,
    pending_direction: Option<Direction>,
    food: Option<Cell>,
    score: u32,
    status: SessionStatus,
}

impl GameSession {
    /// A fresh idle session: three cells centred on the grid, heading right.
    pub fn new(grid: Grid, rng: &mut SessionRng) -> Result<Self, SessionError> {
        if grid.width < 4 || grid.height < 1 {
            return Err(SessionError::GridTooSmall {
                width: grid.width,
                height: grid.height,
            });
        }
        Ok(Self::fresh(grid, rng))
    }

    /// An idle session with an explicit layout.
    pub fn with_layout(
        grid: Grid,
        cells: impl IntoIterator<Item = Cell>,
        direction: Direction,
        food: Cell,
    ) -> Result<Self, SessionError> {
        let snake = Snake::from_cells(cells).ok_or(SessionError::InvalidSnake)?;
        if let Some(outside) = snake.cells().find(|c| !grid.contains(*c)) {
            return Err(SessionError::OutOfBounds(outside));
        }
        if !grid.contains(food) {
            return Err(SessionError::OutOfBounds(food));
        }
        if snake.contains(food) {
            return Err(SessionError::FoodOnSnake(food));
        }

        Ok(Self {
            grid,
            snake,
            direction,
            pending_direction: None,
            food: Some(food),
            score: 0,
            status: SessionStatus::Idle,
        })
    }

    fn fresh(grid: Grid, rng: &mut SessionRng) -> Self {
        let head = grid.center();
        let snake = Snake::from_cells([head, Cell::new(head.x - 1, head.y), Cell::new(head.x - 2, head.y)])
            .expect("starting cells are distinct");
        let food = place_food(&grid, &snake, rng);

        Self {
            grid,
            snake,
            direction: Direction::Right,
            pending_direction: None,
            food,
            score: 0,
            status: SessionStatus::Idle,
        }
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn pending_direction(&self) -> Option<Direction> {
        self.pending_direction
    }

    pub fn food(&self) -> Option<Cell> {
        self.food
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == SessionStatus::Running
    }

    pub fn is_paused(&self) -> bool {
        self.status == SessionStatus::Paused
    }

    pub fn is_game_over(&self) -> bool {
        matches!(self.status, SessionStatus::GameOver(_))
    }

    /// Idle -> Running. Any other state is left alone.
    pub fn start(&mut self) -> bool {
        if self.status != SessionStatus::Idle {
            return false;
        }
        self.status = SessionStatus::Running;
        true
    }

    pub fn toggle_pause(&mut self) -> bool {
        self.status = match self.status {
            SessionStatus::Running => SessionStatus::Paused,
            SessionStatus::Paused => SessionStatus::Running,
            SessionStatus::Idle | SessionStatus::GameOver(_) => return false,
        };
        true
    }

    /// Discards the current game and starts a new one immediately.
    pub fn reset(&mut self, rng: &mut SessionRng) {
        *self = Self::fresh(self.grid, rng);
        self.status = SessionStatus::Running;
    }

    /// Buffers a turn for the next tick. Only perpendicular turns are taken,
    /// judged against the committed direction, and only while running. A later
    /// request in the same tick replaces an earlier one.
    pub fn request_direction(&mut self, direction: Direction) -> bool {
        if self.status != SessionStatus::Running || direction.axis() == self.direction.axis() {
            return false;
        }
        self.pending_direction = Some(direction);
        true
    }

    pub fn tick(&mut self, rng: &mut SessionRng) -> TickOutcome {
        if self.status != SessionStatus::Running {
            return TickOutcome::Skipped;
        }

        if let Some(direction) = self.pending_direction.take() {
            self.direction = direction;
        }

        let next_head = self.snake.head().step(self.direction);

        if !self.grid.contains(next_head) {
            return self.finish(GameOverReason::WallCollision);
        }
        // Checked against the pre-move body, tail included.
        if self.snake.contains(next_head) {
            return self.finish(GameOverReason::SelfCollision);
        }

        self.snake.push_head(next_head);

        if self.food == Some(next_head) {
            self.score += 1;
            self.food = place_food(&self.grid, &self.snake, rng);
            if self.food.is_none() {
                return self.finish(GameOverReason::BoardFilled);
            }
            TickOutcome::AteFood { score: self.score }
        } else {
            self.snake.pop_tail();
            TickOutcome::Moved
        }
    }

    fn finish(&mut self, reason: GameOverReason) -> TickOutcome {
        self.status = SessionStatus::GameOver(reason);
        self.pending_direction = None;
        TickOutcome::GameOver {
            reason,
            final_score: self.score,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn running(cells: &[(i32, i32)], direction: Direction, food: (i32, i32)) -> GameSession {
        let mut session = GameSession::with_layout(
            Grid::square(20),
            cells.iter().map(|&(x, y)| Cell::new(x, y)),
            direction,
            Cell::new(food.0, food.1),
        )
        .unwrap();
        assert!(session.start());
        session
    }

    fn body(session: &GameSession) -> Vec<(i32, i32)> {
        session.snake().cells().map(|c| (c.x, c.y)).collect()
    }

    #[test]
    fn test_new_session_layout() {
        let mut rng = SessionRng::new(42);
        let session = GameSession::new(Grid::square(20), &mut rng).unwrap();
        assert_eq!(body(&session), vec![(10, 10), (9, 10), (8, 10)]);
        assert_eq!(session.direction(), Direction::Right);
        assert_eq!(session.status(), SessionStatus::Idle);
        assert_eq!(session.score(), 0);
        let food = session.food().unwrap();
        assert!(!session.snake().contains(food));
    }

    #[test]
    fn test_new_rejects_tiny_grid() {
        let mut rng = SessionRng::new(1);
        assert!(matches!(
            GameSession::new(Grid::square(2), &mut rng),
            Err(SessionError::GridTooSmall { .. })
        ));
    }

    #[test]
    fn test_with_layout_validation() {
        let grid = Grid::square(20);
        assert_eq!(
            GameSession::with_layout(grid, [Cell::new(0, 0)], Direction::Right, Cell::new(0, 0)).unwrap_err(),
            SessionError::FoodOnSnake(Cell::new(0, 0))
        );
        assert_eq!(
            GameSession::with_layout(grid, [Cell::new(20, 0)], Direction::Right, Cell::new(1, 1)).unwrap_err(),
            SessionError::OutOfBounds(Cell::new(20, 0))
        );
        assert_eq!(
            GameSession::with_layout(grid, [Cell::new(1, 0), Cell::new(1, 0)], Direction::Right, Cell::new(5, 5))
                .unwrap_err(),
            SessionError::InvalidSnake
        );
    }

    #[test]
    fn test_tick_eats_food_and_grows() {
        let mut rng = SessionRng::new(42);
        let mut session = running(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (11, 10));

        let outcome = session.tick(&mut rng);

        assert_eq!(outcome, TickOutcome::AteFood { score: 1 });
        assert_eq!(session.score(), 1);
        assert_eq!(body(&session), vec![(11, 10), (10, 10), (9, 10), (8, 10)]);
        let food = session.food().unwrap();
        assert!(!session.snake().contains(food));
        assert!(session.grid().contains(food));
    }

    #[test]
    fn test_tick_moves_without_growing() {
        let mut rng = SessionRng::new(42);
        let mut session = running(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));
        assert_eq!(session.tick(&mut rng), TickOutcome::Moved);
        assert_eq!(body(&session), vec![(11, 10), (10, 10), (9, 10)]);
        assert_eq!(session.score(), 0);
    }

    #[test]
    fn test_leaving_left_edge_ends_game() {
        let mut rng = SessionRng::new(42);
        let mut session = running(&[(0, 5), (1, 5), (2, 5)], Direction::Left, (10, 10));
        let outcome = session.tick(&mut rng);
        assert_eq!(
            outcome,
            TickOutcome::GameOver {
                reason: GameOverReason::WallCollision,
                final_score: 0
            }
        );
        assert_eq!(session.status(), SessionStatus::GameOver(GameOverReason::WallCollision));
        assert_eq!(body(&session), vec![(0, 5), (1, 5), (2, 5)]);
    }

    #[test]
    fn test_wall_collision_reports_score() {
        let mut rng = SessionRng::new(42);
        let mut session = running(&[(18, 3), (17, 3)], Direction::Right, (19, 3));
        assert_eq!(session.tick(&mut rng), TickOutcome::AteFood { score: 1 });
        assert_eq!(
            session.tick(&mut rng),
            TickOutcome::GameOver {
                reason: GameOverReason::WallCollision,
                final_score: 1
            }
        );
    }

    #[test]
    fn test_running_into_body_ends_game() {
        let mut rng = SessionRng::new(42);
        let mut session = running(&[(5, 5), (6, 5), (6, 6), (5, 6), (4, 6)], Direction::Down, (0, 0));
        assert_eq!(
            session.tick(&mut rng),
            TickOutcome::GameOver {
                reason: GameOverReason::SelfCollision,
                final_score: 0
            }
        );
    }

    #[test]
    fn test_chasing_own_tail_is_a_collision() {
        let mut rng = SessionRng::new(42);
        let mut session = running(&[(5, 5), (6, 5), (6, 6), (5, 6)], Direction::Down, (0, 0));
        assert_eq!(session.snake().tail(), Cell::new(5, 6));
        assert_eq!(
            session.tick(&mut rng),
            TickOutcome::GameOver {
                reason: GameOverReason::SelfCollision,
                final_score: 0
            }
        );
    }

    #[test]
    fn test_reversal_is_rejected() {
        let mut session = running(&[(10, 10), (9, 10)], Direction::Right, (0, 0));
        assert!(!session.request_direction(Direction::Left));
        assert!(!session.request_direction(Direction::Right));
        assert_eq!(session.pending_direction(), None);
    }

    #[test]
    fn test_double_press_cannot_reverse_within_one_tick() {
        let mut rng = SessionRng::new(3);
        let mut session = running(&[(10, 10), (9, 10), (8, 10)], Direction::Right, (0, 0));
        assert!(session.request_direction(Direction::Up));
        assert!(!session.request_direction(Direction::Left));
        session.tick(&mut rng);
        assert_eq!(session.direction(), Direction::Up);
        assert_eq!(session.snake().head(), Cell::new(10, 9));
    }

    #[test]
    fn test_last_perpendicular_request_wins() {
        let mut rng = SessionRng::new(3);
        let mut session = running(&[(10, 10), (9, 10)], Direction::Right, (0, 0));
        assert!(session.request_direction(Direction::Up));
        assert!(session.request_direction(Direction::Down));
        session.tick(&mut rng);
        assert_eq!(session.direction(), Direction::Down);
        assert_eq!(session.pending_direction(), None);
    }

    #[test]
    fn test_input_ignored_unless_running() {
        let mut rng = SessionRng::new(3);
        let mut session = GameSession::new(Grid::square(20), &mut rng).unwrap();
        assert!(!session.request_direction(Direction::Up));

        session.start();
        session.toggle_pause();
        assert!(!session.request_direction(Direction::Up));
    }

    #[test]
    fn test_paused_tick_is_a_no_op() {
        let mut rng = SessionRng::new(3);
        let mut session = running(&[(10, 10), (9, 10)], Direction::Right, (0, 0));
        assert!(session.toggle_pause());
        assert_eq!(session.tick(&mut rng), TickOutcome::Skipped);
        assert_eq!(session.snake().head(), Cell::new(10, 10));

        assert!(session.toggle_pause());
        assert_eq!(session.tick(&mut rng), TickOutcome::Moved);
        assert_eq!(session.snake().head(), Cell::new(11, 10));
    }

    #[test]
    fn test_lifecycle_transitions() {
        let mut rng = SessionRng::new(5);
        let mut session = GameSession::new(Grid::square(20), &mut rng).unwrap();
        assert_eq!(session.tick(&mut rng), TickOutcome::Skipped);
        assert!(!session.toggle_pause());
        assert!(session.start());
        assert!(!session.start());

        let mut over = running(&[(0, 0)], Direction::Up, (5, 5));
        over.tick(&mut rng);
        assert!(over.is_game_over());
        assert!(!over.start());
        assert!(!over.toggle_pause());
        assert_eq!(over.tick(&mut rng), TickOutcome::Skipped);

        over.reset(&mut rng);
        assert!(over.is_running());
        assert_eq!(over.score(), 0);
        assert_eq!(body(&over), vec![(10, 10), (9, 10), (8, 10)]);
    }

    #[test]
    fn test_filling_the_board_ends_game() {
        let mut rng = SessionRng::new(9);
        let grid = Grid { width: 3, height: 1 };
        let mut session =
            GameSession::with_layout(grid, [Cell::new(1, 0), Cell::new(0, 0)], Direction::Right, Cell::new(2, 0))
                .unwrap();
        session.start();
        assert_eq!(
            session.tick(&mut rng),
            TickOutcome::GameOver {
                reason: GameOverReason::BoardFilled,
                final_score: 1
            }
        );
        assert_eq!(session.food(), None);
        assert_eq!(session.snake().len(), 3);
    }

    #[test]
    fn test_random_play_keeps_invariants() {
        let directions = [Direction::Left, Direction::Right, Direction::Up, Direction::Down];
        for seed in 0..20u64 {
            let mut rng = SessionRng::new(seed);
            let mut input_rng = SessionRng::new(seed + 1000);
            let mut session = GameSession::new(Grid::square(10), &mut rng).unwrap();
            session.start();

            let mut previous_direction = session.direction();
            while session.is_running() {
                let wanted = directions[input_rng.random_range(0..directions.len())];
                session.request_direction(wanted);

                let length_before = session.snake().len();
                let outcome = session.tick(&mut rng);
                match outcome {
                    TickOutcome::Moved => assert_eq!(session.snake().len(), length_before),
                    TickOutcome::AteFood { .. } => assert_eq!(session.snake().len(), length_before + 1),
                    TickOutcome::GameOver { .. } => assert_eq!(session.snake().len(), length_before),
                    TickOutcome::Skipped => unreachable!("session is running"),
                }

                assert!(!session.direction().is_opposite(previous_direction));
                previous_direction = session.direction();

                if let Some(food) = session.food() {
                    assert!(!session.snake().contains(food));
                }
            }
        }
    }
}
