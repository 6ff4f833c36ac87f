use std::time::Instant;

use common::{log, log_error, log_warn};
use eframe::egui::{self, Color32, RichText};

use super::auth_screen::AuthScreen;
use super::game_screen::GameScreen;
use super::leaderboard_panel::LeaderboardPanel;
use crate::config::{CachedAuth, ClientConfig, ClientConfigManager};
use crate::state::{ApiEvent, ClientCommand, CommandSender, SharedState};

enum Screen {
    /// Checking a cached token with the server.
    Verifying,
    Auth(AuthScreen),
    Playing(GameScreen),
}

pub struct SnakeApp {
    config_manager: ClientConfigManager,
    config: ClientConfig,
    shared_state: SharedState,
    command_sender: CommandSender,
    screen: Screen,
    leaderboard: LeaderboardPanel,
    notice: Option<String>,
}

impl SnakeApp {
    pub fn new(
        config_manager: ClientConfigManager,
        config: ClientConfig,
        shared_state: SharedState,
        command_sender: CommandSender,
    ) -> Self {
        let screen = match &config.auth {
            Some(auth) => {
                command_sender.send(ClientCommand::VerifySession {
                    token: auth.token.clone(),
                });
                Screen::Verifying
            }
            None => Screen::Auth(AuthScreen::new()),
        };

        Self {
            leaderboard: LeaderboardPanel::new(config.leaderboard_refresh()),
            config_manager,
            config,
            shared_state,
            command_sender,
            screen,
            notice: None,
        }
    }

    fn persist(&mut self, update: impl FnOnce(&mut ClientConfig)) {
        match self.config_manager.update_config(update) {
            Ok(config) => self.config = config,
            Err(err) => log_error!("Failed to save client config: {}", err),
        }
    }

    fn enter_game(&mut self) {
        match GameScreen::new(self.config.tick_interval()) {
            Ok(game) => {
                self.leaderboard.reset();
                self.screen = Screen::Playing(game);
            }
            Err(err) => {
                log_error!("Cannot create game session: {}", err);
                self.screen = Screen::Auth(AuthScreen::with_error(err.to_string()));
            }
        }
    }

    fn sign_out(&mut self, reason: Option<String>) {
        self.persist(|config| config.auth = None);
        self.leaderboard.reset();
        self.screen = Screen::Auth(match reason {
            Some(reason) => AuthScreen::with_error(reason),
            None => AuthScreen::new(),
        });
    }

    fn handle_event(&mut self, event: ApiEvent) {
        match event {
            ApiEvent::Authenticated { token, user } => {
                log!("Signed in as {}", user.username);
                self.persist(|config| {
                    config.auth = Some(CachedAuth {
                        token,
                        username: user.username,
                        user_id: user.id.to_string(),
                    });
                });
                self.enter_game();
            }
            ApiEvent::AuthFailed(message) => {
                if let Screen::Auth(auth) = &mut self.screen {
                    auth.set_error(message);
                }
            }
            ApiEvent::SessionVerified(user) => {
                self.persist(|config| {
                    if let Some(auth) = config.auth.as_mut() {
                        auth.username = user.username;
                    }
                });
                if matches!(self.screen, Screen::Verifying) {
                    self.enter_game();
                }
            }
            ApiEvent::SessionExpired(message) => {
                log_warn!("Session rejected by server: {}", message);
                self.sign_out(Some("Your session has expired, please log in again".to_string()));
            }
            ApiEvent::VerifyUnavailable(message) => {
                // Keep the cached session; the server may just be down.
                self.notice = Some(message);
                if matches!(self.screen, Screen::Verifying) {
                    self.enter_game();
                }
            }
            ApiEvent::ScoreSaved(record) => {
                log!("Score {} saved", record.score);
                self.leaderboard.request_refresh_now();
            }
            ApiEvent::LeaderboardLoaded(entries) => self.leaderboard.set_leaderboard(Ok(entries)),
            ApiEvent::LeaderboardFailed(message) => {
                self.leaderboard.set_leaderboard(Err(message))
            }
            ApiEvent::UserScoresLoaded(scores) => self.leaderboard.set_recent_scores(Ok(scores)),
            ApiEvent::UserScoresFailed(message) => {
                self.leaderboard.set_recent_scores(Err(message))
            }
        }
    }

    fn show_playing(&mut self, ctx: &egui::Context) {
        let Some(auth) = self.config.auth.clone() else {
            self.sign_out(None);
            return;
        };
        let Screen::Playing(game) = &mut self.screen else {
            return;
        };

        let now = Instant::now();
        if self.leaderboard.is_due(now) {
            self.leaderboard.refresh(now, &auth.token, &self.command_sender);
        }
        ctx.request_repaint_after(self.leaderboard.time_until_due(now));

        let mut refresh_clicked = false;
        egui::SidePanel::right("leaderboard_panel")
            .resizable(false)
            .min_width(260.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical().show(ui, |ui| {
                    refresh_clicked = self.leaderboard.show(ui, &auth.username);
                });
            });

        let frame = egui::CentralPanel::default()
            .show(ctx, |ui| {
                game.show(
                    ui,
                    ctx,
                    &auth.token,
                    &auth.username,
                    self.config.high_score,
                    &self.command_sender,
                )
            })
            .inner;

        if refresh_clicked {
            self.leaderboard.refresh(now, &auth.token, &self.command_sender);
        }
        if let Some(high_score) = frame.new_high_score {
            self.persist(|config| config.high_score = high_score);
        }
        if frame.logout_requested {
            log!("Logged out");
            self.sign_out(None);
        }
    }
}

impl eframe::App for SnakeApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.shared_state.has_context() {
            self.shared_state.set_context(ctx.clone());
        }

        for event in self.shared_state.drain_events() {
            self.handle_event(event);
        }

        if let Some(notice) = self.notice.clone() {
            egui::TopBottomPanel::top("notice").show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(RichText::new(notice).color(Color32::LIGHT_RED));
                    if ui.small_button("✕").clicked() {
                        self.notice = None;
                    }
                });
            });
        }

        if matches!(self.screen, Screen::Playing(_)) {
            self.show_playing(ctx);
            return;
        }

        match &mut self.screen {
            Screen::Verifying => {
                egui::CentralPanel::default().show(ctx, |ui| {
                    ui.centered_and_justified(|ui| {
                        ui.label("Checking saved session...");
                    });
                });
            }
            Screen::Auth(auth) => {
                let command = egui::CentralPanel::default()
                    .show(ctx, |ui| auth.show(ui))
                    .inner;
                if let Some(command) = command {
                    log!("Sending {} request", command.label());
                    if !self.command_sender.send(command) {
                        auth.set_error("Background worker stopped, please restart".to_string());
                    }
                }
            }
            Screen::Playing(_) => {}
        }
    }
}
