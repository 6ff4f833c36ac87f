use crate::game::{Direction, GameSession};

use super::canvas::{Canvas, Rgba};

#[derive(Clone, Copy, Debug)]
pub struct Palette {
    pub background: Rgba,
    pub grid_line: Rgba,
    pub head: Rgba,
    pub body: Rgba,
    pub eye: Rgba,
    pub food: Rgba,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            background: Rgba::from_hex(0x1a1a2e),
            grid_line: Rgba::from_hex(0x0f3460),
            head: Rgba::from_hex(0x4caf50),
            body: Rgba::from_hex(0x66bb6a),
            eye: Rgba::WHITE,
            food: Rgba::from_hex(0xf44336),
        }
    }
}

const GRID_LINE_WIDTH: f32 = 0.5;
const SEGMENT_GAP: f32 = 2.0;
const EYE_SIZE: f32 = 3.0;
const EYE_OFFSET: f32 = 6.0;

/// Draws a session. Holds no game state; every frame is derived from the
/// session passed in.
#[derive(Clone, Copy, Debug)]
pub struct Renderer {
    cell_size: f32,
    palette: Palette,
}

impl Renderer {
    pub fn new(cell_size: f32) -> Self {
        Self {
            cell_size,
            palette: Palette::default(),
        }
    }

    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    pub fn canvas_size(&self, session: &GameSession) -> (f32, f32) {
        let grid = session.grid();
        (
            grid.width as f32 * self.cell_size,
            grid.height as f32 * self.cell_size,
        )
    }

    pub fn draw(&self, session: &GameSession, canvas: &mut impl Canvas) {
        canvas.clear(self.palette.background);
        self.draw_grid(session, canvas);
        self.draw_snake(session, canvas);
        self.draw_food(session, canvas);
    }

    fn draw_grid(&self, session: &GameSession, canvas: &mut impl Canvas) {
        let (width, height) = self.canvas_size(session);
        let grid = session.grid();

        for i in 0..=grid.width {
            let x = i as f32 * self.cell_size;
            canvas.line((x, 0.0), (x, height), GRID_LINE_WIDTH, self.palette.grid_line);
        }
        for i in 0..=grid.height {
            let y = i as f32 * self.cell_size;
            canvas.line((0.0, y), (width, y), GRID_LINE_WIDTH, self.palette.grid_line);
        }
    }

    fn draw_snake(&self, session: &GameSession, canvas: &mut impl Canvas) {
        let size = self.cell_size - SEGMENT_GAP;

        for (index, segment) in session.snake().cells().enumerate() {
            let x = segment.x as f32 * self.cell_size;
            let y = segment.y as f32 * self.cell_size;
            let color = if index == 0 { self.palette.head } else { self.palette.body };
            canvas.fill_rect(x, y, size, size, color);

            if index == 0 {
                for (eye_x, eye_y) in self.eye_positions(x, y, session.direction()) {
                    canvas.fill_rect(eye_x, eye_y, EYE_SIZE, EYE_SIZE, self.palette.eye);
                }
            }
        }
    }

    /// Eyes sit on the leading edge of the head.
    fn eye_positions(&self, x: f32, y: f32, direction: Direction) -> [(f32, f32); 2] {
        let near = 4.0;
        let far = 11.0;
        match direction {
            Direction::Right => [(x + EYE_OFFSET + 6.0, y + near), (x + EYE_OFFSET + 6.0, y + far)],
            Direction::Left => [(x + EYE_OFFSET - 2.0, y + near), (x + EYE_OFFSET - 2.0, y + far)],
            Direction::Down => [(x + near, y + EYE_OFFSET + 6.0), (x + far, y + EYE_OFFSET + 6.0)],
            Direction::Up => [(x + near, y + EYE_OFFSET - 2.0), (x + far, y + EYE_OFFSET - 2.0)],
        }
    }

    fn draw_food(&self, session: &GameSession, canvas: &mut impl Canvas) {
        let Some(food) = session.food() else {
            return;
        };
        let half = self.cell_size / 2.0;
        canvas.fill_circle(
            food.x as f32 * self.cell_size + half,
            food.y as f32 * self.cell_size + half,
            half - 2.0,
            self.palette.food,
        );
    }
}
