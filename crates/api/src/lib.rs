//! HTTP API layer for the founders board.
//!
//! - **Endpoints**: registration, login, profiles, status board, updates,
//!   polls and the combined feed, all under `/api`
//! - **Extractors**: authenticated user, JSON bodies with uniform errors
//! - **Middleware**: bearer-token authentication, rate limiting
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod rate_limit;
pub mod response;

use axum::{Router, middleware::from_fn_with_state};

pub use endpoints::router;
pub use middleware::{AppState, auth_middleware};
pub use rate_limit::{ApiRateLimiter, RateLimitConfig, RateLimiterState, rate_limit_middleware};

/// The `/api` tree with authentication and rate limiting applied.
///
/// Authentication runs first so the limiter can key requests by user.
pub fn app(state: AppState, limiter: RateLimiterState) -> Router {
    Router::new()
        .nest("/api", router())
        .layer(from_fn_with_state(limiter, rate_limit_middleware))
        .layer(from_fn_with_state(state.clone(), auth_middleware))
        .with_state(state)
}
