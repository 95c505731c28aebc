//! Poll repositories.

use std::sync::Arc;

use crate::entities::{Poll, PollOption, PollVote, poll, poll_option, poll_vote};
use founders_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, SqlErr, TransactionTrait,
    sea_query::Expr,
};

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PollNotFound(id.to_string()))
    }

    /// Create a new poll.
    pub async fn create(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Polls from all users, newest first.
    pub async fn find_recent(&self, limit: u64, offset: u64) -> AppResult<Vec<poll::Model>> {
        Poll::find()
            .order_by_desc(poll::Column::CreatedAt)
            .order_by_desc(poll::Column::Id)
            .offset(offset)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all polls.
    pub async fn count(&self) -> AppResult<u64> {
        Poll::find()
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Poll option repository for database operations.
#[derive(Clone)]
pub struct PollOptionRepository {
    db: Arc<DatabaseConnection>,
}

impl PollOptionRepository {
    /// Create a new poll option repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find an option by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll_option::Model>> {
        PollOption::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new option.
    pub async fn create(&self, model: poll_option::ActiveModel) -> AppResult<poll_option::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options of a poll in display order.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<poll_option::Model>> {
        PollOption::find()
            .filter(poll_option::Column::PollId.eq(poll_id))
            .order_by_asc(poll_option::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Options of several polls, grouped by poll then display order.
    pub async fn find_by_poll_ids(&self, poll_ids: &[String]) -> AppResult<Vec<poll_option::Model>> {
        if poll_ids.is_empty() {
            return Ok(vec![]);
        }

        PollOption::find()
            .filter(poll_option::Column::PollId.is_in(poll_ids.to_vec()))
            .order_by_asc(poll_option::Column::PollId)
            .order_by_asc(poll_option::Column::Position)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}

/// Poll vote repository for database operations.
#[derive(Clone)]
pub struct PollVoteRepository {
    db: Arc<DatabaseConnection>,
}

impl PollVoteRepository {
    /// Create a new poll vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find the vote a user cast on a poll.
    pub async fn find_by_user_and_poll(
        &self,
        user_id: &str,
        poll_id: &str,
    ) -> AppResult<Option<poll_vote::Model>> {
        PollVote::find()
            .filter(poll_vote::Column::UserId.eq(user_id))
            .filter(poll_vote::Column::PollId.eq(poll_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if user has voted on a poll.
    pub async fn has_voted(&self, user_id: &str, poll_id: &str) -> AppResult<bool> {
        Ok(self.find_by_user_and_poll(user_id, poll_id).await?.is_some())
    }

    /// Record a vote and add it to its option's counter.
    ///
    /// Both writes share one transaction, so `votes` always equals the number
    /// of vote rows for the option. The `(poll_id, user_id)` unique index
    /// turns a racing second vote into the same [`AppError::BadRequest`] the
    /// pre-check reports.
    pub async fn record(&self, model: poll_vote::ActiveModel) -> AppResult<poll_vote::Model> {
        let option_id = model
            .option_id
            .clone()
            .take()
            .ok_or_else(|| AppError::Internal("Vote has no option".to_string()))?;

        let txn = self.db.begin().await.map_err(db_error)?;

        // Dropping `txn` on an early return rolls both writes back.
        let vote = model.insert(&txn).await.map_err(|e| match e.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(_)) => {
                AppError::BadRequest("You have already voted on this poll".to_string())
            }
            _ => db_error(e),
        })?;
        increment_votes(&txn, &option_id).await?;

        txn.commit().await.map_err(db_error)?;
        Ok(vote)
    }
}

fn db_error(e: DbErr) -> AppError {
    AppError::Database(e.to_string())
}

/// Add one vote to an option's counter with `votes = votes + 1`, so
/// concurrent votes on the same option are never lost.
async fn increment_votes<C: ConnectionTrait>(conn: &C, option_id: &str) -> AppResult<()> {
    let result = PollOption::update_many()
        .col_expr(
            poll_option::Column::Votes,
            Expr::col(poll_option::Column::Votes).add(1),
        )
        .filter(poll_option::Column::Id.eq(option_id))
        .exec(conn)
        .await
        .map_err(db_error)?;

    if result.rows_affected == 0 {
        return Err(AppError::NotFound(format!("Poll option not found: {option_id}")));
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult, Set};

    fn create_test_poll(id: &str) -> poll::Model {
        poll::Model {
            id: id.to_string(),
            user_id: "u1".to_string(),
            question: "Lunch?".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn create_test_option(id: &str, poll_id: &str, position: i32, votes: i32) -> poll_option::Model {
        poll_option::Model {
            id: id.to_string(),
            poll_id: poll_id.to_string(),
            text: format!("option {position}"),
            position,
            votes,
        }
    }

    fn create_test_vote(poll_id: &str, option_id: &str, user_id: &str) -> poll_vote::Model {
        poll_vote::Model {
            id: "v1".to_string(),
            poll_id: poll_id.to_string(),
            option_id: option_id.to_string(),
            user_id: user_id.to_string(),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<poll::Model>::new()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PollNotFound(_))));
    }

    #[tokio::test]
    async fn test_find_recent() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_poll("p2"), create_test_poll("p1")]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let polls = repo.find_recent(11, 0).await.unwrap();

        assert_eq!(polls.len(), 2);
        assert_eq!(polls[0].id, "p2");
    }

    #[tokio::test]
    async fn test_count() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(12))
                }]])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        assert_eq!(repo.count().await.unwrap(), 12);
    }

    #[tokio::test]
    async fn test_find_by_poll_ordered() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[
                    create_test_option("o1", "p1", 0, 0),
                    create_test_option("o2", "p1", 1, 3),
                ]])
                .into_connection(),
        );

        let repo = PollOptionRepository::new(db);
        let options = repo.find_by_poll("p1").await.unwrap();

        assert_eq!(options.len(), 2);
        assert_eq!(options[0].position, 0);
        assert_eq!(options[1].votes, 3);
    }

    #[tokio::test]
    async fn test_find_by_poll_ids_empty() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = PollOptionRepository::new(db);
        assert!(repo.find_by_poll_ids(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_has_voted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_vote("p1", "o1", "u1")]])
                .append_query_results([Vec::<poll_vote::Model>::new()])
                .into_connection(),
        );

        let repo = PollVoteRepository::new(db);
        assert!(repo.has_voted("u1", "p1").await.unwrap());
        assert!(!repo.has_voted("u2", "p1").await.unwrap());
    }

    fn vote_model(vote: &poll_vote::Model) -> poll_vote::ActiveModel {
        poll_vote::ActiveModel {
            id: Set(vote.id.clone()),
            poll_id: Set(vote.poll_id.clone()),
            option_id: Set(vote.option_id.clone()),
            user_id: Set(vote.user_id.clone()),
            created_at: Set(vote.created_at),
        }
    }

    #[tokio::test]
    async fn test_record_inserts_and_increments_together() {
        let vote = create_test_vote("p1", "o1", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );

        let repo = PollVoteRepository::new(db.clone());
        let created = repo.record(vote_model(&vote)).await.unwrap();
        assert_eq!(created.option_id, "o1");
        drop(repo);

        let conn = Arc::try_unwrap(db).ok().unwrap();
        let log = format!("{:?}", conn.into_transaction_log());
        assert_eq!(log.matches("INSERT").count(), 1);
        assert_eq!(log.matches("UPDATE").count(), 1);
        assert!(log.contains("+"));
    }

    #[tokio::test]
    async fn test_record_missing_option_fails() {
        let vote = create_test_vote("p1", "missing", "u1");

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[vote.clone()]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = PollVoteRepository::new(db);
        let result = repo.record(vote_model(&vote)).await;

        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_record_without_option_is_rejected() {
        let repo = PollVoteRepository::new(Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres).into_connection(),
        ));

        let result = repo
            .record(poll_vote::ActiveModel {
                id: Set("v1".to_string()),
                ..Default::default()
            })
            .await;

        assert!(matches!(result, Err(AppError::Internal(_))));
    }
}
