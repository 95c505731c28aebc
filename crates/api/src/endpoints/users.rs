//! User profile endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use founders_common::AppResult;

use crate::{
    extractors::AuthUser,
    middleware::AppState,
    response::{ProfileResponse, UserEnvelope, UserResponse},
};

/// The calling user.
async fn current_user(AuthUser(user): AuthUser) -> Json<UserEnvelope<UserResponse>> {
    Json(UserEnvelope { user: user.into() })
}

/// Another user's profile with their latest updates.
async fn show_user(
    AuthUser(_): AuthUser,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserEnvelope<ProfileResponse>>> {
    let profile = state
        .user_service
        .profile_with_recent_updates(&user_id)
        .await?;

    Ok(Json(UserEnvelope {
        user: ProfileResponse {
            user: profile.user.into(),
            updates: profile.updates.into_iter().map(Into::into).collect(),
        },
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/user/profile", get(current_user))
        .route("/users/{user_id}", get(show_user))
}
