//! API rate limiting middleware.
//!
//! Fixed-window limits per authenticated user, or per client IP for
//! anonymous requests. State is in-process only.

#![allow(missing_docs)]

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, header::RETRY_AFTER},
    middleware::Next,
    response::{IntoResponse, Response},
};
use founders_common::AppError;
use founders_db::entities::user;
use tokio::sync::RwLock;

/// Tracked keys above which expired windows are swept.
const SWEEP_THRESHOLD: usize = 10_000;

/// Rate limit configuration for different endpoint types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests per window.
    pub max_requests: u32,
    /// Time window duration in seconds.
    pub window_secs: u64,
}

impl RateLimitConfig {
    /// Create a new rate limit config.
    #[must_use]
    pub const fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window_secs,
        }
    }
}

/// Default rate limits for different endpoint categories.
pub mod limits {
    use super::RateLimitConfig;

    /// Standard API endpoints.
    pub const STANDARD: RateLimitConfig = RateLimitConfig::new(300, 60);

    /// Login and registration.
    pub const AUTH: RateLimitConfig = RateLimitConfig::new(10, 300);

    /// The limit that applies to a request path.
    #[must_use]
    pub fn for_path(path: &str) -> RateLimitConfig {
        let path = path.trim_end_matches('/');
        if path.ends_with("/login") || path.ends_with("/register") {
            AUTH
        } else {
            STANDARD
        }
    }
}

/// Rate limit state for a single key.
#[derive(Debug, Clone)]
struct WindowState {
    count: u32,
    window_start: Instant,
    window: Duration,
}

/// API rate limiter.
#[derive(Clone, Default)]
pub struct ApiRateLimiter {
    /// State per key (user ID or IP address, plus the limit class).
    states: Arc<RwLock<HashMap<String, WindowState>>>,
}

impl ApiRateLimiter {
    /// Create a new rate limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a request is allowed and record it.
    pub async fn check(&self, key: &str, config: &RateLimitConfig) -> RateLimitResult {
        let mut states = self.states.write().await;
        let now = Instant::now();
        let window = Duration::from_secs(config.window_secs);

        if states.len() >= SWEEP_THRESHOLD {
            states.retain(|_, s| now.duration_since(s.window_start) < s.window);
        }

        let state = states.entry(key.to_string()).or_insert_with(|| WindowState {
            count: 0,
            window_start: now,
            window,
        });

        if now.duration_since(state.window_start) >= window {
            state.count = 0;
            state.window_start = now;
        }

        let reset = window
            .saturating_sub(now.duration_since(state.window_start))
            .as_secs()
            .max(1);

        if state.count >= config.max_requests {
            return RateLimitResult::Limited { retry_after: reset };
        }

        state.count += 1;
        RateLimitResult::Allowed {
            remaining: config.max_requests.saturating_sub(state.count),
            limit: config.max_requests,
            reset,
        }
    }

    /// Get the number of tracked keys.
    pub async fn key_count(&self) -> usize {
        self.states.read().await.len()
    }
}

/// Rate limit check result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RateLimitResult {
    /// Request is allowed.
    Allowed {
        /// Remaining requests in window.
        remaining: u32,
        /// Total limit.
        limit: u32,
        /// Seconds until window reset.
        reset: u64,
    },
    /// Request is rate limited.
    Limited {
        /// Seconds until the window resets.
        retry_after: u64,
    },
}

/// Rate limiter state for middleware.
#[derive(Clone, Default)]
pub struct RateLimiterState {
    /// Per-user rate limiter.
    pub user_limiter: ApiRateLimiter,
    /// Per-IP rate limiter (for unauthenticated requests).
    pub ip_limiter: ApiRateLimiter,
}

impl RateLimiterState {
    /// Create a new rate limiter state.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

/// Rate limit error response: 429 with `Retry-After`.
#[derive(Debug)]
pub struct RateLimitError {
    pub retry_after: u64,
}

impl IntoResponse for RateLimitError {
    fn into_response(self) -> Response {
        let mut response = AppError::RateLimited.into_response();
        response
            .headers_mut()
            .insert(RETRY_AFTER, HeaderValue::from(self.retry_after));
        response
    }
}

/// Extract client IP from proxy headers, falling back to the peer address.
fn extract_client_ip(req: &Request<Body>) -> Option<IpAddr> {
    let header = |name: &str| req.headers().get(name).and_then(|v| v.to_str().ok());

    header("x-forwarded-for")
        .and_then(|xff| xff.split(',').next())
        .or_else(|| header("x-real-ip"))
        .and_then(|ip| ip.trim().parse::<IpAddr>().ok())
        .or_else(|| {
            req.extensions()
                .get::<ConnectInfo<SocketAddr>>()
                .map(|ConnectInfo(addr)| addr.ip())
        })
}

/// Rate limiting middleware.
///
/// Must run inside the auth middleware so that authenticated requests are
/// keyed by user.
pub async fn rate_limit_middleware(
    State(limiter): State<RateLimiterState>,
    req: Request<Body>,
    next: Next,
) -> Result<Response, RateLimitError> {
    let config = limits::for_path(req.uri().path());
    let class = if config == limits::AUTH { "auth" } else { "api" };

    let user_key = req
        .extensions()
        .get::<user::Model>()
        .map(|user| format!("{class}:user:{}", user.id));

    let result = if let Some(key) = user_key {
        limiter.user_limiter.check(&key, &config).await
    } else {
        let key = extract_client_ip(&req)
            .map_or_else(|| format!("{class}:unknown"), |ip| format!("{class}:ip:{ip}"));
        limiter.ip_limiter.check(&key, &config).await
    };

    match result {
        RateLimitResult::Allowed {
            remaining,
            limit,
            reset,
        } => {
            let mut response = next.run(req).await;

            let headers = response.headers_mut();
            headers.insert("X-RateLimit-Limit", limit.into());
            headers.insert("X-RateLimit-Remaining", remaining.into());
            headers.insert("X-RateLimit-Reset", reset.into());

            Ok(response)
        }
        RateLimitResult::Limited { retry_after } => {
            tracing::debug!(retry_after, path = %req.uri().path(), "Rate limited");
            Err(RateLimitError { retry_after })
        }
    }
}
