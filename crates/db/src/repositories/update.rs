//! Update repository.

use std::sync::Arc;

use crate::entities::{Update, update};
use founders_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect,
};

/// Update repository for database operations.
#[derive(Clone)]
pub struct UpdateRepository {
    db: Arc<DatabaseConnection>,
}

impl UpdateRepository {
    /// Create a new update repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Create a new update.
    pub async fn create(&self, model: update::ActiveModel) -> AppResult<update::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Updates from all users, newest first.
    pub async fn find_recent(&self, limit: u64, offset: u64) -> AppResult<Vec<update::Model>> {
        Update::find()
            .order_by_desc(update::Column::CreatedAt)
            .order_by_desc(update::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// A user's updates, newest first.
    pub async fn find_by_user(&self, user_id: &str, limit: u64) -> AppResult<Vec<update::Model>> {
        Update::find()
            .filter(update::Column::UserId.eq(user_id))
            .order_by_desc(update::Column::CreatedAt)
            .order_by_desc(update::Column::Id)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn create_test_update(id: &str, user_id: &str, minutes_ago: i64) -> update::Model {
        update::Model {
            id: id.to_string(),
            user_id: user_id.to_string(),
            content: format!("update {id}"),
            created_at: (Utc::now() - Duration::minutes(minutes_ago)).into(),
        }
    }

    #[tokio::test]
    async fn test_find_recent() {
        let u1 = create_test_update("p1", "u1", 1);
        let u2 = create_test_update("p2", "u2", 5);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[u1, u2]])
                .into_connection(),
        );

        let repo = UpdateRepository::new(db);
        let rows = repo.find_recent(11, 0).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].id, "p1");
    }

    #[tokio::test]
    async fn test_find_recent_applies_limit_and_offset() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<update::Model>::new()])
                .into_connection(),
        );

        let repo = UpdateRepository::new(db.clone());
        repo.find_recent(11, 20).await.unwrap();
        drop(repo);

        let conn = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", conn.into_transaction_log());
        assert!(log.contains("LIMIT"));
        assert!(log.contains("OFFSET"));
    }

    #[tokio::test]
    async fn test_find_by_user() {
        let u1 = create_test_update("p1", "u1", 1);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[u1]])
                .into_connection(),
        );

        let repo = UpdateRepository::new(db);
        let rows = repo.find_by_user("u1", 10).await.unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "u1");
    }
}
