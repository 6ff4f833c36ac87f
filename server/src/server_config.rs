use std::time::Duration;

use common::config::Validate;
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_PATH: &str = "snake_server_config.yaml";
pub const DEFAULT_JWT_SECRET: &str = "change-me-in-production";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub window_secs: u64,
    pub max_requests: u32,
    pub auth_max_requests: u32,
    pub cleanup_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 15 * 60,
            max_requests: 100,
            auth_max_requests: 5,
            cleanup_interval_secs: 300,
        }
    }
}

impl RateLimitConfig {
    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    /// `<n>` followed by `s`, `m`, `h` or `d`.
    pub jwt_expiry: String,
    pub rate_limit: RateLimitConfig,
    pub request_timeout_ms: u64,
    /// JSON snapshot file; in-memory only when absent.
    pub store_path: Option<String>,
    pub log_requests: bool,
    pub environment: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            jwt_expiry: "7d".to_string(),
            rate_limit: RateLimitConfig::default(),
            request_timeout_ms: 10_000,
            store_path: None,
            log_requests: true,
            environment: "development".to_string(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn token_expiry(&self) -> Result<Duration, String> {
        parse_duration(&self.jwt_expiry)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl Validate for ServerConfig {
    fn validate(&self) -> Result<(), String> {
        if self.host.trim().is_empty() {
            return Err("host must not be empty".to_string());
        }
        if self.jwt_secret.is_empty() {
            return Err("jwt_secret must not be empty".to_string());
        }
        self.token_expiry()?;
        if self.rate_limit.window_secs == 0 {
            return Err("rate_limit.window_secs must be positive".to_string());
        }
        if self.rate_limit.max_requests == 0 || self.rate_limit.auth_max_requests == 0 {
            return Err("rate limit request counts must be positive".to_string());
        }
        if self.rate_limit.cleanup_interval_secs == 0 {
            return Err("rate_limit.cleanup_interval_secs must be positive".to_string());
        }
        if self.request_timeout_ms == 0 {
            return Err("request_timeout_ms must be positive".to_string());
        }
        Ok(())
    }
}

/// Parses durations such as `90s`, `15m`, `12h` or `7d`.
pub fn parse_duration(value: &str) -> Result<Duration, String> {
    let value = value.trim();
    let Some(unit) = value.chars().last() else {
        return Err("duration must not be empty".to_string());
    };

    let seconds_per_unit = match unit {
        's' => 1,
        'm' => 60,
        'h' => 3600,
        'd' => 86_400,
        _ => return Err(format!("unknown duration unit in '{}'", value)),
    };

    let amount: u64 = value[..value.len() - unit.len_utf8()]
        .parse()
        .map_err(|_| format!("invalid duration '{}'", value))?;
    if amount == 0 {
        return Err(format!("duration '{}' must be positive", value));
    }

    amount
        .checked_mul(seconds_per_unit)
        .map(Duration::from_secs)
        .ok_or_else(|| format!("duration '{}' is too large", value))
}
