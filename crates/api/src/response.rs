//! API response types.
//!
//! Services hand back entity models; these are the camelCase shapes that go
//! over the wire. Passwords never leave this module because no response type
//! carries one.

#![allow(missing_docs)]

use founders_core::{BoardEntry, FeedItem, PollView, UpdateWithAuthor};
use founders_db::entities::{poll_option, status, update, user};
use serde::Serialize;

/// Full user payload.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub startup_name: String,
    pub startup_url: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            startup_name: user.startup_name,
            startup_url: user.startup_url,
        }
    }
}

/// Author embedded in updates and polls.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    pub name: String,
    pub startup_name: String,
}

impl From<user::Model> for AuthorResponse {
    fn from(user: user::Model) -> Self {
        Self {
            id: user.id,
            name: user.name,
            startup_name: user.startup_name,
        }
    }
}

/// `{"user": ...}` envelope.
#[derive(Debug, Serialize)]
pub struct UserEnvelope<T: Serialize> {
    pub user: T,
}

/// Login result.
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
}

/// Update as listed on a profile.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdateResponse {
    pub id: String,
    pub content: String,
    pub created_at: String,
}

impl From<update::Model> for ProfileUpdateResponse {
    fn from(update: update::Model) -> Self {
        Self {
            id: update.id,
            content: update.content,
            created_at: update.created_at.to_rfc3339(),
        }
    }
}

/// User profile with recent updates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    #[serde(flatten)]
    pub user: UserResponse,
    pub updates: Vec<ProfileUpdateResponse>,
}

/// Presence as shown on the board.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub status: &'static str,
    pub updated_at: String,
}

/// One row of the status board.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardEntryResponse {
    pub id: String,
    pub name: String,
    pub startup_name: String,
    pub status: Option<PresenceResponse>,
}

impl From<BoardEntry> for BoardEntryResponse {
    fn from(entry: BoardEntry) -> Self {
        Self {
            id: entry.user.id,
            name: entry.user.name,
            startup_name: entry.user.startup_name,
            status: entry.status.map(|s| PresenceResponse {
                status: s.status.as_str(),
                updated_at: s.updated_at.to_rfc3339(),
            }),
        }
    }
}

/// Status board.
#[derive(Debug, Serialize)]
pub struct BoardResponse {
    pub users: Vec<BoardEntryResponse>,
}

/// A user's stored status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub user_id: String,
    pub status: &'static str,
    pub updated_at: String,
}

impl From<status::Model> for StatusResponse {
    fn from(status: status::Model) -> Self {
        Self {
            user_id: status.user_id,
            status: status.status.as_str(),
            updated_at: status.updated_at.to_rfc3339(),
        }
    }
}

/// `{"status": ...}` envelope.
#[derive(Debug, Serialize)]
pub struct StatusEnvelope {
    pub status: StatusResponse,
}

/// Update with its author.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResponse {
    pub id: String,
    pub content: String,
    pub user_id: String,
    pub created_at: String,
    pub user: AuthorResponse,
}

impl From<UpdateWithAuthor> for UpdateResponse {
    fn from(item: UpdateWithAuthor) -> Self {
        Self {
            id: item.update.id,
            content: item.update.content,
            user_id: item.update.user_id,
            created_at: item.update.created_at.to_rfc3339(),
            user: item.author.into(),
        }
    }
}

/// `{"update": ...}` envelope.
#[derive(Debug, Serialize)]
pub struct UpdateEnvelope {
    pub update: UpdateResponse,
}

/// A page of updates.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatesResponse {
    pub updates: Vec<UpdateResponse>,
    pub has_more: bool,
}

/// Poll option with its tally.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollOptionResponse {
    pub id: String,
    pub text: String,
    pub votes: i32,
    pub poll_id: String,
}

impl From<poll_option::Model> for PollOptionResponse {
    fn from(option: poll_option::Model) -> Self {
        Self {
            id: option.id,
            text: option.text,
            votes: option.votes,
            poll_id: option.poll_id,
        }
    }
}

/// Poll with options and author.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: String,
    pub question: String,
    pub user_id: String,
    pub created_at: String,
    pub options: Vec<PollOptionResponse>,
    pub user: AuthorResponse,
}

impl From<PollView> for PollResponse {
    fn from(view: PollView) -> Self {
        Self {
            id: view.poll.id,
            question: view.poll.question,
            user_id: view.poll.user_id,
            created_at: view.poll.created_at.to_rfc3339(),
            options: view.options.into_iter().map(Into::into).collect(),
            user: view.author.into(),
        }
    }
}

/// `{"poll": ...}` envelope.
#[derive(Debug, Serialize)]
pub struct PollEnvelope {
    pub poll: PollResponse,
}

/// A page of polls.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollsResponse {
    pub polls: Vec<PollResponse>,
    pub has_more: bool,
}

/// Feed entry, tagged by kind.
#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum FeedItemResponse {
    Update(UpdateResponse),
    Poll(PollResponse),
}

impl From<FeedItem> for FeedItemResponse {
    fn from(item: FeedItem) -> Self {
        match item {
            FeedItem::Update(update) => Self::Update(update.into()),
            FeedItem::Poll(poll) => Self::Poll(poll.into()),
        }
    }
}

/// A page of the combined feed.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedResponse {
    pub items: Vec<FeedItemResponse>,
    pub has_more: bool,
}
