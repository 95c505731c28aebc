//! Request extractors.

use axum::{extract::FromRequest, extract::FromRequestParts, http::request::Parts};
use founders_common::AppError;
use founders_db::entities::user;

use crate::middleware::AuthFailure;

/// Authenticated user extractor.
///
/// Rejects with "Authentication required" when no bearer token was sent and
/// "Invalid token" when it did not verify.
#[derive(Debug, Clone)]
pub struct AuthUser(pub user::Model);

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by auth middleware
        if let Some(user) = parts.extensions.get::<user::Model>() {
            return Ok(Self(user.clone()));
        }

        Err(match parts.extensions.get::<AuthFailure>() {
            Some(AuthFailure::InvalidToken) => AppError::invalid_token(),
            Some(AuthFailure::UnknownUser(id)) => AppError::UserNotFound(id.clone()),
            None => AppError::authentication_required(),
        })
    }
}

/// JSON body extractor whose rejections use the API error shape.
#[derive(Debug, Clone, Copy, Default, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);
