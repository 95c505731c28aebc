//! Poll endpoints.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    routing::{get, post},
};
use founders_common::{AppError, AppResult};
use founders_core::CreatePollInput;
use serde::Deserialize;

use super::PageQuery;
use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::{PollEnvelope, PollsResponse},
};

/// Vote request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    pub option_id: Option<String>,
}

/// Newest polls first, with tallies.
async fn list_polls(
    AuthUser(_): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<PollsResponse>> {
    let page = state.poll_service.list(query.to_request()).await?;

    Ok(Json(PollsResponse {
        polls: page.polls.into_iter().map(Into::into).collect(),
        has_more: page.has_more,
    }))
}

/// Create a poll owned by the caller.
async fn create_poll(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(input): ApiJson<CreatePollInput>,
) -> AppResult<Json<PollEnvelope>> {
    let poll = state.poll_service.create(&user, input).await?;

    Ok(Json(PollEnvelope { poll: poll.into() }))
}

/// Cast the caller's single vote on a poll.
async fn vote(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(poll_id): Path<String>,
    ApiJson(req): ApiJson<VoteRequest>,
) -> AppResult<Json<PollEnvelope>> {
    let option_id = req
        .option_id
        .ok_or_else(|| AppError::BadRequest("Invalid option".to_string()))?;
    let poll = state
        .poll_service
        .vote(&user.id, &poll_id, &option_id)
        .await?;

    Ok(Json(PollEnvelope { poll: poll.into() }))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_polls).post(create_poll))
        .route("/{poll_id}/vote", post(vote))
}
