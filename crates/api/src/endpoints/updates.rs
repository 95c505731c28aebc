//! Founder updates.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::get,
};
use founders_common::AppResult;
use serde::Deserialize;

use super::PageQuery;
use crate::{
    extractors::{ApiJson, AuthUser},
    middleware::AppState,
    response::{UpdateEnvelope, UpdatesResponse},
};

/// New update request.
#[derive(Debug, Default, Deserialize)]
pub struct CreateUpdateRequest {
    #[serde(default)]
    pub content: String,
}

/// Newest updates first.
async fn list_updates(
    AuthUser(_): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<UpdatesResponse>> {
    let page = state.update_service.list(query.to_request()).await?;

    Ok(Json(UpdatesResponse {
        updates: page.updates.into_iter().map(Into::into).collect(),
        has_more: page.has_more,
    }))
}

/// Post an update as the caller.
async fn create_update(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateUpdateRequest>,
) -> AppResult<(StatusCode, Json<UpdateEnvelope>)> {
    let update = state.update_service.create(&user, &req.content).await?;

    Ok((
        StatusCode::CREATED,
        Json(UpdateEnvelope {
            update: update.into(),
        }),
    ))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(list_updates).post(create_update))
}
