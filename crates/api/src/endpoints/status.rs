//! Office status board.

use axum::{Json, Router, extract::State, routing::{get, put}};
use founders_common::{AppError, AppResult};
use serde::Deserialize;

use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::{BoardResponse, StatusEnvelope},
};

/// Status change request.
#[derive(Debug, Default, Deserialize)]
pub struct SetStatusRequest {
    pub status: Option<String>,
}

/// Every founder with their current presence.
async fn board(
    AuthUser(_): AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<BoardResponse>> {
    let entries = state.status_service.board().await?;

    Ok(Json(BoardResponse {
        users: entries.into_iter().map(Into::into).collect(),
    }))
}

/// Set the caller's presence.
async fn set_status(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SetStatusRequest>,
) -> AppResult<Json<StatusEnvelope>> {
    let value = req
        .status
        .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;
    let status = state.status_service.set_status(&user.id, &value).await?;

    Ok(Json(StatusEnvelope {
        status: status.into(),
    }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(board))
        .route("/update", put(set_status))
}
