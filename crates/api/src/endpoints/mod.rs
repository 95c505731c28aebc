//! API endpoints.

mod auth;
mod feed;
mod polls;
mod status;
mod updates;
mod users;

use axum::Router;
use founders_core::PageRequest;
use serde::Deserialize;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(users::router())
        .nest("/status", status::router())
        .nest("/updates", updates::router())
        .nest("/polls", polls::router())
        .nest("/feed", feed::router())
}

/// `?page=N` query parameter shared by the paginated lists.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    /// Resolve to a page request; anything unparsable is page 1.
    pub fn to_request(&self) -> PageRequest {
        PageRequest::parse(self.page.as_deref())
    }
}
