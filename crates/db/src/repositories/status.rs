//! Status repository.

use std::sync::Arc;

use crate::entities::{Status, status};
use founders_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter,
};

/// Status repository for database operations.
#[derive(Clone)]
pub struct StatusRepository {
    db: Arc<DatabaseConnection>,
}

impl StatusRepository {
    /// Create a new status repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the status row of a user.
    pub async fn find_by_user_id(&self, user_id: &str) -> AppResult<Option<status::Model>> {
        Status::find_by_id(user_id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find the status rows of several users.
    pub async fn find_by_user_ids(&self, user_ids: &[String]) -> AppResult<Vec<status::Model>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        Status::find()
            .filter(status::Column::UserId.is_in(user_ids.to_vec()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a status row.
    pub async fn create(&self, model: status::ActiveModel) -> AppResult<status::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a status row.
    pub async fn update(&self, model: status::ActiveModel) -> AppResult<status::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
