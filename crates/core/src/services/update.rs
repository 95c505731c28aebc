//! Update service.

use std::collections::HashMap;

use chrono::Utc;
use founders_common::{AppError, AppResult, IdGenerator};
use founders_db::{
    entities::{update, user},
    repositories::{UpdateRepository, UserRepository},
};
use sea_orm::Set;

use super::page::PageRequest;

/// Update service for business logic.
#[derive(Clone)]
pub struct UpdateService {
    update_repo: UpdateRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// An update with its author.
#[derive(Debug, Clone)]
pub struct UpdateWithAuthor {
    pub update: update::Model,
    pub author: user::Model,
}

/// One page of updates.
#[derive(Debug, Clone, Default)]
pub struct UpdatePage {
    pub updates: Vec<UpdateWithAuthor>,
    pub has_more: bool,
}

impl UpdateService {
    /// Create a new update service.
    #[must_use]
    pub const fn new(update_repo: UpdateRepository, user_repo: UserRepository) -> Self {
        Self {
            update_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Updates from everyone, newest first.
    pub async fn list(&self, page: PageRequest) -> AppResult<UpdatePage> {
        // One extra row tells whether another page exists.
        let mut rows = self
            .update_repo
            .find_recent(page.limit() + 1, page.offset())
            .await?;
        let has_more = rows.len() as u64 > page.limit();
        rows.truncate(page.limit() as usize);

        let updates = self.attach_authors(rows).await?;
        Ok(UpdatePage { updates, has_more })
    }

    /// Post an update.
    pub async fn create(&self, author: &user::Model, content: &str) -> AppResult<UpdateWithAuthor> {
        let content = content.trim();
        if content.is_empty() {
            return Err(AppError::BadRequest("Content is required".to_string()));
        }

        let model = update::ActiveModel {
            id: Set(self.id_gen.generate()),
            user_id: Set(author.id.clone()),
            content: Set(content.to_string()),
            created_at: Set(Utc::now().into()),
        };
        let update = self.update_repo.create(model).await?;

        tracing::info!(user_id = %author.id, update_id = %update.id, "Posted update");
        Ok(UpdateWithAuthor {
            update,
            author: author.clone(),
        })
    }

    async fn attach_authors(&self, rows: Vec<update::Model>) -> AppResult<Vec<UpdateWithAuthor>> {
        let mut author_ids: Vec<String> = rows.iter().map(|u| u.user_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();

        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        Ok(rows
            .into_iter()
            .filter_map(|update| {
                let Some(author) = authors.get(&update.user_id) else {
                    tracing::warn!(update_id = %update.id, "Update author missing");
                    return None;
                };
                Some(UpdateWithAuthor {
                    author: author.clone(),
                    update,
                })
            })
            .collect())
    }
}
