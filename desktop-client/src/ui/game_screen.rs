use std::time::{Duration, Instant};

use common::game::{
    CELL_SIZE, Direction, GRID_SIZE, GameLoop, GameOverReason, Grid, ScoreReporter, SessionError,
    SessionRng, SessionStatus,
};
use common::{log, log_warn};
use common::render::Renderer;
use eframe::egui::{self, Align2, Color32, FontId, RichText};

use super::painter_canvas::PainterCanvas;
use crate::state::{ClientCommand, CommandSender};

/// Forwards a finished game's score to the API task.
struct ScoreSubmitter<'a> {
    sender: &'a CommandSender,
    token: &'a str,
}

impl ScoreSubmitter<'_> {
    fn submit(&self, score: u32) -> bool {
        let sent = self.sender.send(ClientCommand::SubmitScore {
            token: self.token.to_string(),
            score,
        });
        if !sent {
            log_warn!("API task is gone, score {} was not submitted", score);
        }
        sent
    }
}

impl ScoreReporter for ScoreSubmitter<'_> {
    fn report_final_score(&mut self, score: u32) {
        log!("Game over with score {}, submitting", score);
        self.submit(score);
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct GameFrame {
    /// Set when the running score beat the stored local best.
    pub new_high_score: Option<u32>,
    pub logout_requested: bool,
}

fn direction_from_input(input: &egui::InputState) -> Option<Direction> {
    if input.key_pressed(egui::Key::ArrowUp) || input.key_pressed(egui::Key::W) {
        Some(Direction::Up)
    } else if input.key_pressed(egui::Key::ArrowDown) || input.key_pressed(egui::Key::S) {
        Some(Direction::Down)
    } else if input.key_pressed(egui::Key::ArrowLeft) || input.key_pressed(egui::Key::A) {
        Some(Direction::Left)
    } else if input.key_pressed(egui::Key::ArrowRight) || input.key_pressed(egui::Key::D) {
        Some(Direction::Right)
    } else {
        None
    }
}

fn game_over_text(reason: GameOverReason) -> &'static str {
    match reason {
        GameOverReason::WallCollision => "You hit the wall",
        GameOverReason::SelfCollision => "You ran into yourself",
        GameOverReason::BoardFilled => "The board is full!",
    }
}

pub struct GameScreen {
    game_loop: GameLoop,
    renderer: Renderer,
}

impl GameScreen {
    pub fn new(tick_interval: Duration) -> Result<Self, SessionError> {
        let game_loop = GameLoop::new(
            Grid::square(GRID_SIZE),
            tick_interval,
            SessionRng::from_random(),
        )?;
        Ok(Self {
            game_loop,
            renderer: Renderer::new(CELL_SIZE as f32),
        })
    }

    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        ctx: &egui::Context,
        token: &str,
        username: &str,
        high_score: u32,
        sender: &CommandSender,
    ) -> GameFrame {
        let now = Instant::now();
        let mut frame = GameFrame::default();

        self.handle_input(ctx, now);

        let mut submitter = ScoreSubmitter { sender, token };
        self.game_loop.poll(now, &mut submitter);

        let session = self.game_loop.session();
        let score = session.score();
        if score > high_score {
            frame.new_high_score = Some(score);
        }

        ui.horizontal(|ui| {
            ui.label(RichText::new(format!("🐍 {}", username)).strong());
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("Logout").clicked() {
                    frame.logout_requested = true;
                }
            });
        });
        ui.horizontal(|ui| {
            ui.heading(format!("Score: {}", score));
            ui.add_space(20.0);
            ui.heading(format!("High Score: {}", high_score.max(score)));
        });
        ui.add_space(8.0);

        self.draw_board(ui);

        ui.add_space(8.0);
        self.show_controls(ui, now);
        ui.label("Arrow keys or WASD to steer, Space to pause");

        if let Some(wait) = self.game_loop.time_until_next_tick(now) {
            ctx.request_repaint_after(wait);
        }

        frame
    }

    fn handle_input(&mut self, ctx: &egui::Context, now: Instant) {
        let (direction, space) =
            ctx.input(|i| (direction_from_input(i), i.key_pressed(egui::Key::Space)));

        if space {
            match self.game_loop.session().status() {
                SessionStatus::Idle => {
                    self.game_loop.start(now);
                }
                _ => {
                    self.game_loop.toggle_pause();
                }
            }
        }
        if let Some(direction) = direction {
            self.game_loop.request_direction(direction);
        }
    }

    fn draw_board(&self, ui: &mut egui::Ui) {
        let session = self.game_loop.session();
        let (width, height) = self.renderer.canvas_size(session);
        let (response, painter) =
            ui.allocate_painter(egui::vec2(width, height), egui::Sense::hover());
        let rect = response.rect;

        let mut canvas = PainterCanvas::new(&painter, rect);
        self.renderer.draw(session, &mut canvas);

        let overlay = match session.status() {
            SessionStatus::Idle => Some(("Press Start to play".to_string(), Color32::WHITE)),
            SessionStatus::Paused => Some(("Paused".to_string(), Color32::YELLOW)),
            SessionStatus::GameOver(reason) => Some((
                format!(
                    "Game Over!\n{}\nFinal score: {}",
                    game_over_text(reason),
                    session.score()
                ),
                Color32::WHITE,
            )),
            SessionStatus::Running => None,
        };

        if let Some((text, color)) = overlay {
            painter.rect_filled(rect, 0.0, Color32::from_black_alpha(160));
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                text,
                FontId::proportional(22.0),
                color,
            );
        }
    }

    fn show_controls(&mut self, ui: &mut egui::Ui, now: Instant) {
        let status = self.game_loop.session().status();
        ui.horizontal(|ui| match status {
            SessionStatus::Idle => {
                if ui.button("Start").clicked() {
                    self.game_loop.start(now);
                }
            }
            SessionStatus::Running | SessionStatus::Paused => {
                let label = if status == SessionStatus::Paused {
                    "Resume"
                } else {
                    "Pause"
                };
                if ui.button(label).clicked() {
                    self.game_loop.toggle_pause();
                }
                if ui.button("Restart").clicked() {
                    self.game_loop.restart(now);
                }
            }
            SessionStatus::GameOver(_) => {
                if ui.button("Play Again").clicked() {
                    self.game_loop.restart(now);
                }
            }
        });
    }
}
