//! Poll service.

use std::collections::HashMap;

use chrono::Utc;
use founders_common::{AppError, AppResult, IdGenerator};
use founders_db::{
    entities::{poll, poll_option, poll_vote, user},
    repositories::{PollOptionRepository, PollRepository, PollVoteRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;

use super::page::PageRequest;

/// Minimum number of options a poll needs.
pub const MIN_OPTIONS: usize = 2;
/// Maximum number of options a poll may have.
pub const MAX_OPTIONS: usize = 10;
/// Maximum length of a single option, in characters.
pub const MAX_OPTION_LENGTH: usize = 100;

/// Poll service for business logic.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    option_repo: PollOptionRepository,
    vote_repo: PollVoteRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

/// Input for creating a poll.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePollInput {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub options: Vec<String>,
}

/// A poll with its options (in display order) and author.
#[derive(Debug, Clone)]
pub struct PollView {
    pub poll: poll::Model,
    pub options: Vec<poll_option::Model>,
    pub author: user::Model,
}

/// One page of polls.
#[derive(Debug, Clone, Default)]
pub struct PollPage {
    pub polls: Vec<PollView>,
    pub has_more: bool,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        option_repo: PollOptionRepository,
        vote_repo: PollVoteRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            poll_repo,
            option_repo,
            vote_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Polls from everyone, newest first.
    pub async fn list(&self, page: PageRequest) -> AppResult<PollPage> {
        let polls = self
            .poll_repo
            .find_recent(page.limit(), page.offset())
            .await?;
        let total = self.poll_repo.count().await?;
        let has_more = page.offset().saturating_add(page.limit()) < total;

        let poll_ids: Vec<String> = polls.iter().map(|p| p.id.clone()).collect();
        let mut options: HashMap<String, Vec<poll_option::Model>> = HashMap::new();
        for option in self.option_repo.find_by_poll_ids(&poll_ids).await? {
            options.entry(option.poll_id.clone()).or_default().push(option);
        }

        let mut author_ids: Vec<String> = polls.iter().map(|p| p.user_id.clone()).collect();
        author_ids.sort_unstable();
        author_ids.dedup();
        let authors: HashMap<String, user::Model> = self
            .user_repo
            .find_by_ids(&author_ids)
            .await?
            .into_iter()
            .map(|u| (u.id.clone(), u))
            .collect();

        let polls = polls
            .into_iter()
            .filter_map(|poll| {
                let Some(author) = authors.get(&poll.user_id) else {
                    tracing::warn!(poll_id = %poll.id, "Poll author missing");
                    return None;
                };
                let mut options = options.remove(&poll.id).unwrap_or_default();
                options.sort_by_key(|o| o.position);
                Some(PollView {
                    author: author.clone(),
                    options,
                    poll,
                })
            })
            .collect();

        Ok(PollPage { polls, has_more })
    }

    /// Create a poll.
    pub async fn create(&self, author: &user::Model, input: CreatePollInput) -> AppResult<PollView> {
        let question = input.question.trim();
        if question.is_empty() {
            return Err(AppError::BadRequest("Question is required".to_string()));
        }
        let choices = normalize_options(&input.options)?;

        let poll = self
            .poll_repo
            .create(poll::ActiveModel {
                id: Set(self.id_gen.generate()),
                user_id: Set(author.id.clone()),
                question: Set(question.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        let mut options = Vec::with_capacity(choices.len());
        for (position, text) in choices.into_iter().enumerate() {
            let option = self
                .option_repo
                .create(poll_option::ActiveModel {
                    id: Set(self.id_gen.generate()),
                    poll_id: Set(poll.id.clone()),
                    text: Set(text),
                    position: Set(position as i32),
                    votes: Set(0),
                })
                .await?;
            options.push(option);
        }

        tracing::info!(user_id = %author.id, poll_id = %poll.id, options = options.len(), "Created poll");
        Ok(PollView {
            poll,
            options,
            author: author.clone(),
        })
    }

    /// Record a user's vote and return the refreshed poll.
    ///
    /// A user votes at most once per poll. The pre-check gives the usual
    /// error; the unique index on `(poll_id, user_id)` catches the race. The
    /// vote row and the option counter are written in one transaction.
    pub async fn vote(&self, user_id: &str, poll_id: &str, option_id: &str) -> AppResult<PollView> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let option = self
            .option_repo
            .find_by_id(option_id)
            .await?
            .filter(|o| o.poll_id == poll.id)
            .ok_or_else(|| AppError::BadRequest("Invalid option".to_string()))?;

        if self.vote_repo.has_voted(user_id, &poll.id).await? {
            return Err(AppError::BadRequest(
                "You have already voted on this poll".to_string(),
            ));
        }

        self.vote_repo
            .record(poll_vote::ActiveModel {
                id: Set(self.id_gen.generate()),
                poll_id: Set(poll.id.clone()),
                option_id: Set(option.id.clone()),
                user_id: Set(user_id.to_string()),
                created_at: Set(Utc::now().into()),
            })
            .await?;

        tracing::info!(user_id = %user_id, poll_id = %poll.id, option_id = %option.id, "Vote recorded");

        let options = self.option_repo.find_by_poll(&poll.id).await?;
        let author = self.user_repo.get_by_id(&poll.user_id).await?;
        Ok(PollView {
            poll,
            options,
            author,
        })
    }
}

/// Trim options, drop blank ones and check the count and length limits.
fn normalize_options(raw: &[String]) -> AppResult<Vec<String>> {
    let options: Vec<String> = raw
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .map(ToString::to_string)
        .collect();

    if options.len() < MIN_OPTIONS {
        return Err(AppError::BadRequest(format!(
            "Poll must have at least {MIN_OPTIONS} options"
        )));
    }
    if options.len() > MAX_OPTIONS {
        return Err(AppError::BadRequest(format!(
            "Poll cannot have more than {MAX_OPTIONS} options"
        )));
    }
    if options.iter().any(|o| o.chars().count() > MAX_OPTION_LENGTH) {
        return Err(AppError::BadRequest(format!(
            "Poll option is too long (max {MAX_OPTION_LENGTH} chars)"
        )));
    }

    Ok(options)
}
