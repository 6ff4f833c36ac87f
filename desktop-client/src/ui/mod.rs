mod app;
mod auth_screen;
mod game_screen;
mod leaderboard_panel;
mod painter_canvas;

pub use app::SnakeApp;
