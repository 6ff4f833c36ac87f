use std::time::{Duration, Instant};

use chrono::{DateTime, Local, Utc};
use common::api::{LeaderboardEntry, UserScoreEntry};
use eframe::egui::{self, Color32, RichText};

use crate::state::{ClientCommand, CommandSender};

const GOLD: Color32 = Color32::from_rgb(0xff, 0xd7, 0x00);
const SILVER: Color32 = Color32::from_rgb(0xc0, 0xc0, 0xc0);
const BRONZE: Color32 = Color32::from_rgb(0xcd, 0x7f, 0x32);
const HIGHLIGHT: Color32 = Color32::from_rgb(0x4c, 0xaf, 0x50);

pub enum Loadable<T> {
    Loading,
    Loaded(T),
    Failed(String),
}

/// "Today", "Yesterday", "N days ago" within a week, else a calendar date.
pub fn format_relative_date(date: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let days = (now - date).num_days().abs();
    match days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        2..=6 => format!("{} days ago", days),
        _ => date.with_timezone(&Local).format("%Y-%m-%d").to_string(),
    }
}

fn rank_style(rank: usize) -> (Option<&'static str>, Option<Color32>) {
    match rank {
        1 => (Some("🥇"), Some(GOLD)),
        2 => (Some("🥈"), Some(SILVER)),
        3 => (Some("🥉"), Some(BRONZE)),
        _ => (None, None),
    }
}

/// Global top scores plus the signed-in player's latest games.
pub struct LeaderboardPanel {
    leaderboard: Loadable<Vec<LeaderboardEntry>>,
    recent_scores: Loadable<Vec<UserScoreEntry>>,
    refresh_interval: Duration,
    last_refresh: Option<Instant>,
}

impl LeaderboardPanel {
    pub fn new(refresh_interval: Duration) -> Self {
        Self {
            leaderboard: Loadable::Loading,
            recent_scores: Loadable::Loading,
            refresh_interval,
            last_refresh: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.last_refresh
            .is_none_or(|last| now.duration_since(last) >= self.refresh_interval)
    }

    pub fn time_until_due(&self, now: Instant) -> Duration {
        match self.last_refresh {
            Some(last) => self.refresh_interval.saturating_sub(now.duration_since(last)),
            None => Duration::ZERO,
        }
    }

    pub fn refresh(&mut self, now: Instant, token: &str, sender: &CommandSender) {
        self.last_refresh = Some(now);
        sender.send(ClientCommand::RefreshLeaderboard {
            token: Some(token.to_string()),
        });
        sender.send(ClientCommand::RefreshUserScores {
            token: token.to_string(),
        });
    }

    /// Makes the panel due on the next frame.
    pub fn request_refresh_now(&mut self) {
        self.last_refresh = None;
    }

    pub fn reset(&mut self) {
        self.leaderboard = Loadable::Loading;
        self.recent_scores = Loadable::Loading;
        self.last_refresh = None;
    }

    pub fn set_leaderboard(&mut self, result: Result<Vec<LeaderboardEntry>, String>) {
        self.leaderboard = match result {
            Ok(entries) => Loadable::Loaded(entries),
            Err(message) => Loadable::Failed(message),
        };
    }

    pub fn set_recent_scores(&mut self, result: Result<Vec<UserScoreEntry>, String>) {
        self.recent_scores = match result {
            Ok(scores) => Loadable::Loaded(scores),
            Err(message) => Loadable::Failed(message),
        };
    }

    /// Returns true when the refresh button was clicked.
    pub fn show(&self, ui: &mut egui::Ui, username: &str) -> bool {
        let now = Utc::now();
        let mut refresh_clicked = false;

        ui.horizontal(|ui| {
            ui.heading("🏆 Leaderboard");
            if ui.button("Refresh").clicked() {
                refresh_clicked = true;
            }
        });
        ui.separator();

        match &self.leaderboard {
            Loadable::Loading => {
                ui.label("Loading leaderboard...");
            }
            Loadable::Failed(message) => {
                ui.colored_label(Color32::LIGHT_RED, "Failed to load leaderboard");
                ui.small(message);
            }
            Loadable::Loaded(entries) if entries.is_empty() => {
                ui.label("No scores yet. Be the first!");
            }
            Loadable::Loaded(entries) => {
                egui::Grid::new("leaderboard_grid")
                    .num_columns(3)
                    .striped(true)
                    .show(ui, |ui| {
                        for entry in entries {
                            self.show_entry(ui, entry, username, now);
                            ui.end_row();
                        }
                    });
            }
        }

        ui.add_space(16.0);
        ui.heading("Your recent scores");
        ui.separator();

        match &self.recent_scores {
            Loadable::Loading => {
                ui.label("Loading your scores...");
            }
            Loadable::Failed(_) => {
                ui.colored_label(Color32::LIGHT_RED, "Failed to load your scores");
            }
            Loadable::Loaded(scores) if scores.is_empty() => {
                ui.label("No scores yet. Start playing!");
            }
            Loadable::Loaded(scores) => {
                egui::Grid::new("recent_scores_grid")
                    .num_columns(2)
                    .show(ui, |ui| {
                        for entry in scores.iter().take(crate::api_task::RECENT_SCORES) {
                            ui.label(format_relative_date(entry.game_date, now));
                            ui.strong(entry.score.to_string());
                            ui.end_row();
                        }
                    });
            }
        }

        refresh_clicked
    }

    fn show_entry(
        &self,
        ui: &mut egui::Ui,
        entry: &LeaderboardEntry,
        username: &str,
        now: DateTime<Utc>,
    ) {
        let (medal, rank_color) = rank_style(entry.rank);
        let rank_text = match medal {
            Some(medal) => format!("{} #{}", medal, entry.rank),
            None => format!("#{}", entry.rank),
        };
        let mut rank_label = RichText::new(rank_text).strong();
        if let Some(color) = rank_color {
            rank_label = rank_label.color(color);
        }
        ui.label(rank_label);

        let is_me = entry.is_current_user || entry.username == username;
        ui.vertical(|ui| {
            let name = RichText::new(&entry.username);
            ui.label(if is_me { name.color(HIGHLIGHT).strong() } else { name });
            ui.small(format_relative_date(entry.date, now));
        });

        ui.label(RichText::new(entry.score.to_string()).strong());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 18, 0, 0).unwrap()
    }

    #[test]
    fn test_relative_dates() {
        assert_eq!(format_relative_date(now() - ChronoDuration::hours(5), now()), "Today");
        assert_eq!(format_relative_date(now() - ChronoDuration::hours(30), now()), "Yesterday");
        assert_eq!(format_relative_date(now() - ChronoDuration::days(4), now()), "4 days ago");
        assert_eq!(format_relative_date(now() - ChronoDuration::days(6), now()), "6 days ago");
    }

    #[test]
    fn test_old_dates_use_calendar_format() {
        let formatted = format_relative_date(now() - ChronoDuration::days(30), now());
        assert_eq!(formatted.len(), 10);
        assert!(formatted.starts_with("2024-05-1"));
    }

    #[test]
    fn test_medals_for_top_three() {
        assert_eq!(rank_style(1), (Some("🥇"), Some(GOLD)));
        assert_eq!(rank_style(3).1, Some(BRONZE));
        assert_eq!(rank_style(4), (None, None));
    }

    #[test]
    fn test_refresh_schedule() {
        let mut panel = LeaderboardPanel::new(Duration::from_secs(30));
        let start = Instant::now();
        assert!(panel.is_due(start));

        let (tx, _rx) = tokio::sync::mpsc::unbounded_channel();
        panel.refresh(start, "token", &CommandSender::new(tx));
        assert!(!panel.is_due(start + Duration::from_secs(29)));
        assert!(panel.is_due(start + Duration::from_secs(30)));
        assert_eq!(
            panel.time_until_due(start + Duration::from_secs(10)),
            Duration::from_secs(20)
        );
    }
}
