//! Registration and login.

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use founders_common::AppResult;
use founders_core::{LoginInput, RegisterInput};

use crate::{
    extractors::ApiJson,
    middleware::AppState,
    response::{SessionResponse, UserEnvelope, UserResponse},
};

/// Create a new account.
async fn register(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<RegisterInput>,
) -> AppResult<(StatusCode, Json<UserEnvelope<UserResponse>>)> {
    let user = state.user_service.register(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(UserEnvelope { user: user.into() }),
    ))
}

/// Exchange credentials for a bearer token.
async fn login(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<LoginInput>,
) -> AppResult<Json<SessionResponse>> {
    let session = state.user_service.authenticate(input).await?;

    Ok(Json(SessionResponse {
        user: session.user.into(),
        token: session.token,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}
