use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use common::log_warn;

use crate::error::ApiError;

const RATE_LIMIT_LIMIT: HeaderName = HeaderName::from_static("ratelimit-limit");
const RATE_LIMIT_REMAINING: HeaderName = HeaderName::from_static("ratelimit-remaining");
const RATE_LIMIT_RESET: HeaderName = HeaderName::from_static("ratelimit-reset");

#[derive(Clone, Copy, Debug)]
struct Window {
    started: Instant,
    count: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RateDecision {
    Allowed {
        limit: u32,
        remaining: u32,
        reset_after: Duration,
    },
    Limited {
        limit: u32,
        retry_after: Duration,
    },
}

/// Fixed-window request counter keyed by client address.
pub struct RateLimiter {
    name: &'static str,
    message: String,
    max_requests: u32,
    window: Duration,
    clients: Mutex<HashMap<String, Window>>,
}

impl RateLimiter {
    pub fn new(
        name: &'static str,
        message: impl Into<String>,
        max_requests: u32,
        window: Duration,
    ) -> Self {
        Self {
            name,
            message: message.into(),
            max_requests,
            window,
            clients: Mutex::new(HashMap::new()),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Counts one request for `client` and reports whether it may proceed.
    pub fn check(&self, client: &str, now: Instant) -> RateDecision {
        let mut clients = match self.clients.lock() {
            Ok(clients) => clients,
            Err(poisoned) => poisoned.into_inner(),
        };

        let window = clients.entry(client.to_string()).or_insert(Window {
            started: now,
            count: 0,
        });
        if now.duration_since(window.started) >= self.window {
            *window = Window {
                started: now,
                count: 0,
            };
        }

        let reset_after = self.window.saturating_sub(now.duration_since(window.started));
        if window.count >= self.max_requests {
            return RateDecision::Limited {
                limit: self.max_requests,
                retry_after: reset_after,
            };
        }

        window.count += 1;
        RateDecision::Allowed {
            limit: self.max_requests,
            remaining: self.max_requests - window.count,
            reset_after,
        }
    }

    /// Drops windows that have expired. Returns how many were removed.
    pub fn prune(&self, now: Instant) -> usize {
        let mut clients = match self.clients.lock() {
            Ok(clients) => clients,
            Err(poisoned) => poisoned.into_inner(),
        };
        let before = clients.len();
        clients.retain(|_, window| now.duration_since(window.started) < self.window);
        before - clients.len()
    }

    pub fn tracked_clients(&self) -> usize {
        self.clients.lock().map(|clients| clients.len()).unwrap_or(0)
    }
}

pub fn client_key(request: &Request) -> String {
    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Inner limiters run first on the way out, so their headers are kept.
fn set_header_if_absent(headers: &mut HeaderMap, name: HeaderName, value: u64) {
    if headers.contains_key(&name) {
        return;
    }
    if let Ok(value) = HeaderValue::from_str(&value.to_string()) {
        headers.insert(name, value);
    }
}

pub async fn rate_limit(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let client = client_key(&request);

    match limiter.check(&client, Instant::now()) {
        RateDecision::Allowed {
            limit,
            remaining,
            reset_after,
        } => {
            let mut response = next.run(request).await;
            let headers = response.headers_mut();
            set_header_if_absent(headers, RATE_LIMIT_LIMIT, u64::from(limit));
            set_header_if_absent(headers, RATE_LIMIT_REMAINING, u64::from(remaining));
            set_header_if_absent(headers, RATE_LIMIT_RESET, reset_after.as_secs());
            response
        }
        RateDecision::Limited { limit, retry_after } => {
            log_warn!(
                "Rate limit '{}' exceeded by {} {}",
                limiter.name(),
                client,
                request.uri().path()
            );
            let mut response = ApiError::RateLimited {
                message: limiter.message.clone(),
                retry_after,
            }
            .into_response();
            let headers = response.headers_mut();
            set_header_if_absent(headers, RATE_LIMIT_LIMIT, u64::from(limit));
            set_header_if_absent(headers, RATE_LIMIT_REMAINING, 0);
            set_header_if_absent(headers, RATE_LIMIT_RESET, retry_after.as_secs());
            response
        }
    }
}
