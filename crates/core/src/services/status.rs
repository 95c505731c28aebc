//! Status board service.

use std::collections::HashMap;

use chrono::Utc;
use founders_common::{AppError, AppResult};
use founders_db::{
    entities::{
        status::{self, PresenceStatus},
        user,
    },
    repositories::{StatusRepository, UserRepository},
};
use sea_orm::Set;

/// Status service for business logic.
#[derive(Clone)]
pub struct StatusService {
    user_repo: UserRepository,
    status_repo: StatusRepository,
}

/// One row of the office board.
#[derive(Debug, Clone)]
pub struct BoardEntry {
    pub user: user::Model,
    /// `None` for users that never had a status row.
    pub status: Option<status::Model>,
}

impl StatusService {
    /// Create a new status service.
    #[must_use]
    pub const fn new(user_repo: UserRepository, status_repo: StatusRepository) -> Self {
        Self {
            user_repo,
            status_repo,
        }
    }

    /// Every user with their current status, ordered by name.
    pub async fn board(&self) -> AppResult<Vec<BoardEntry>> {
        let users = self.user_repo.find_all_by_name().await?;
        let user_ids: Vec<String> = users.iter().map(|u| u.id.clone()).collect();

        let mut statuses: HashMap<String, status::Model> = self
            .status_repo
            .find_by_user_ids(&user_ids)
            .await?
            .into_iter()
            .map(|s| (s.user_id.clone(), s))
            .collect();

        Ok(users
            .into_iter()
            .map(|user| BoardEntry {
                status: statuses.remove(&user.id),
                user,
            })
            .collect())
    }

    /// Set a user's status. Only "In Office" and "Out of Office" are accepted.
    pub async fn set_status(&self, user_id: &str, value: &str) -> AppResult<status::Model> {
        let presence = PresenceStatus::parse(value)
            .ok_or_else(|| AppError::BadRequest("Invalid status".to_string()))?;

        let now = Utc::now();
        let updated = match self.status_repo.find_by_user_id(user_id).await? {
            Some(existing) => {
                let mut model: status::ActiveModel = existing.into();
                model.status = Set(presence);
                model.updated_at = Set(now.into());
                self.status_repo.update(model).await?
            }
            None => {
                self.status_repo
                    .create(status::ActiveModel {
                        user_id: Set(user_id.to_string()),
                        status: Set(presence),
                        updated_at: Set(now.into()),
                    })
                    .await?
            }
        };

        tracing::info!(user_id = %user_id, status = presence.as_str(), "Status changed");
        Ok(updated)
    }
}
