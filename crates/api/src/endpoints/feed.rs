//! Combined feed of updates and polls.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use founders_common::AppResult;

use super::PageQuery;
use crate::{extractors::AuthUser, middleware::AppState, response::FeedResponse};

async fn feed(
    AuthUser(_): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> AppResult<Json<FeedResponse>> {
    let page = state.feed_service.page(query.to_request()).await?;

    Ok(Json(FeedResponse {
        items: page.items.into_iter().map(Into::into).collect(),
        has_more: page.has_more,
    }))
}

pub fn router() -> Router<AppState> {
    Router::new().route("/", get(feed))
}
