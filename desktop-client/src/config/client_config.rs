use std::time::Duration;

use common::config::{ConfigManager, FileContentConfigProvider, Validate, YamlConfigSerializer};
use common::game::TICK_INTERVAL;
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "snake_client_config.yaml";

pub type ClientConfigManager = ConfigManager<FileContentConfigProvider, ClientConfig, YamlConfigSerializer>;

fn get_config_path() -> String {
    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        return exe_dir.join(CONFIG_FILE_NAME).to_string_lossy().into_owned();
    }
    CONFIG_FILE_NAME.to_string()
}

/// Uses the given path, or the file next to the executable.
pub fn get_config_manager(path: Option<&str>) -> ClientConfigManager {
    match path {
        Some(path) => ConfigManager::from_yaml_file(path),
        None => ConfigManager::from_yaml_file(&get_config_path()),
    }
}

/// Session remembered between runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedAuth {
    pub token: String,
    pub username: String,
    pub user_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub server_url: String,
    pub tick_interval_ms: u64,
    pub leaderboard_refresh_secs: u64,
    pub auth: Option<CachedAuth>,
    /// Best local score. Kept apart from the server's figure.
    pub high_score: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            server_url: "http://localhost:5000/api".to_string(),
            tick_interval_ms: TICK_INTERVAL.as_millis() as u64,
            leaderboard_refresh_secs: 30,
            auth: None,
            high_score: 0,
        }
    }
}

impl ClientConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn leaderboard_refresh(&self) -> Duration {
        Duration::from_secs(self.leaderboard_refresh_secs)
    }
}

impl Validate for ClientConfig {
    fn validate(&self) -> Result<(), String> {
        if !(self.server_url.starts_with("http://") || self.server_url.starts_with("https://")) {
            return Err(format!("server_url must be an http(s) URL, got '{}'", self.server_url));
        }
        if self.tick_interval_ms == 0 {
            return Err("tick_interval_ms must be positive".to_string());
        }
        if self.leaderboard_refresh_secs == 0 {
            return Err("leaderboard_refresh_secs must be positive".to_string());
        }
        if let Some(auth) = &self.auth
            && auth.token.is_empty()
        {
            return Err("cached auth token must not be empty".to_string());
        }
        Ok(())
    }
}
