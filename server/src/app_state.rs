use std::sync::Arc;
use std::time::Duration;

use crate::auth::{AuthService, TokenService};
use crate::leaderboard::Leaderboard;
use crate::rate_limiter::RateLimiter;
use crate::server_config::ServerConfig;
use crate::store::Store;

const GLOBAL_LIMIT_MESSAGE: &str = "Too many requests from this IP, please try again later.";
const AUTH_LIMIT_MESSAGE: &str = "Too many authentication attempts, please try again later.";

#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub leaderboard: Leaderboard,
    pub global_limiter: Arc<RateLimiter>,
    pub auth_limiter: Arc<RateLimiter>,
    pub request_timeout: Duration,
    pub log_requests: bool,
}

impl AppState {
    pub fn new(store: Arc<dyn Store>, config: &ServerConfig) -> Result<Self, String> {
        let tokens = TokenService::new(&config.jwt_secret, config.token_expiry()?);
        let window = config.rate_limit.window();

        Ok(Self {
            auth: AuthService::new(store.clone(), tokens),
            leaderboard: Leaderboard::new(store),
            global_limiter: Arc::new(RateLimiter::new(
                "global",
                GLOBAL_LIMIT_MESSAGE,
                config.rate_limit.max_requests,
                window,
            )),
            auth_limiter: Arc::new(RateLimiter::new(
                "auth",
                AUTH_LIMIT_MESSAGE,
                config.rate_limit.auth_max_requests,
                window,
            )),
            request_timeout: config.request_timeout(),
            log_requests: config.log_requests,
        })
    }

    pub fn rate_limiters(&self) -> Vec<Arc<RateLimiter>> {
        vec![self.global_limiter.clone(), self.auth_limiter.clone()]
    }
}
