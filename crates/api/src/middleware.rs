//! API middleware.

#![allow(missing_docs)]

use axum::{
    body::Body,
    extract::State,
    http::{Request, header::AUTHORIZATION},
    middleware::Next,
    response::{IntoResponse, Response},
};
use founders_common::AppError;
use founders_core::{FeedService, PollService, StatusService, UpdateService, UserService};

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub status_service: StatusService,
    pub update_service: UpdateService,
    pub poll_service: PollService,
    pub feed_service: FeedService,
}

/// Why a presented bearer token did not authenticate.
///
/// Stored in request extensions so that [`AuthUser`](crate::extractors::AuthUser)
/// can answer with the right error on protected routes only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    /// Bad signature, malformed or expired.
    InvalidToken,
    /// Valid token for a user that no longer exists.
    UnknownUser(String),
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token<B>(req: &Request<B>) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Authentication middleware.
///
/// Resolves the bearer token (if any) and stores the user, or the reason
/// it failed, in the request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(token) = bearer_token(&req).map(ToString::to_string) {
        match state.user_service.authenticate_by_token(&token).await {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(AppError::Unauthorized(_)) => {
                req.extensions_mut().insert(AuthFailure::InvalidToken);
            }
            Err(AppError::UserNotFound(id)) => {
                req.extensions_mut().insert(AuthFailure::UnknownUser(id));
            }
            Err(e) => return e.into_response(),
        }
    }

    next.run(req).await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn request_with(header: Option<&str>) -> Request<()> {
        let mut builder = Request::builder().uri("/api/status");
        if let Some(value) = header {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(()).unwrap()
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&request_with(Some("Bearer abc.def"))), Some("abc.def"));
        assert_eq!(bearer_token(&request_with(Some("Bearer "))), None);
        assert_eq!(bearer_token(&request_with(Some("Basic abc"))), None);
        assert_eq!(bearer_token(&request_with(None)), None);
    }
}
