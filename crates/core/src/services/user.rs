//! User service: registration, login and profiles.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;
use founders_common::{AppError, AppResult, IdGenerator, TokenSigner};
use founders_db::{
    entities::{
        status::{self, PresenceStatus},
        update, user,
    },
    repositories::{StatusRepository, UpdateRepository, UserRepository},
};
use sea_orm::Set;
use serde::Deserialize;
use validator::Validate;

/// Number of updates shown on a profile page.
pub const PROFILE_UPDATES: u64 = 10;

/// User service for business logic.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    status_repo: StatusRepository,
    update_repo: UpdateRepository,
    tokens: TokenSigner,
    id_gen: IdGenerator,
}

/// Input for registering a new account.
///
/// Required fields are optional here so that a missing field produces
/// "Missing required fields" instead of a JSON rejection.
#[derive(Debug, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(max = 100, message = "Name is too long"))]
    pub name: Option<String>,

    #[validate(email(message = "Invalid email"))]
    pub email: Option<String>,

    #[validate(length(max = 128, message = "Password is too long"))]
    pub password: Option<String>,

    #[validate(length(max = 100, message = "Startup name is too long"))]
    pub startup_name: Option<String>,

    #[validate(url(message = "Invalid startup URL"))]
    pub startup_url: Option<String>,
}

/// Input for logging in.
#[derive(Debug, Default, Deserialize)]
pub struct LoginInput {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// A logged-in user and their bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: user::Model,
    pub token: String,
}

/// A user together with their most recent updates.
#[derive(Debug, Clone)]
pub struct UserProfile {
    pub user: user::Model,
    pub updates: Vec<update::Model>,
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        status_repo: StatusRepository,
        update_repo: UpdateRepository,
        tokens: TokenSigner,
    ) -> Self {
        Self {
            user_repo,
            status_repo,
            update_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new account. The user starts out "Out of Office".
    pub async fn register(&self, input: RegisterInput) -> AppResult<user::Model> {
        let (Some(name), Some(email), Some(password), Some(startup_name)) = (
            non_blank(input.name.as_deref()),
            non_blank(input.email.as_deref()),
            input.password.as_deref().filter(|p| !p.is_empty()),
            non_blank(input.startup_name.as_deref()),
        ) else {
            return Err(AppError::BadRequest("Missing required fields".to_string()));
        };

        let input = RegisterInput {
            name: Some(name.to_string()),
            email: Some(email.to_lowercase()),
            password: Some(password.to_string()),
            startup_name: Some(startup_name.to_string()),
            startup_url: non_blank(input.startup_url.as_deref()).map(ToString::to_string),
        };
        input.validate()?;
        let email = input.email.unwrap_or_default();

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::Conflict(
                "User with this email already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let user_id = self.id_gen.generate();
        let model = user::ActiveModel {
            id: Set(user_id.clone()),
            name: Set(name.to_string()),
            email: Set(email),
            password: Set(hash_password(password)?),
            startup_name: Set(startup_name.to_string()),
            startup_url: Set(input.startup_url),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };
        let user = self.user_repo.create(model).await?;

        self.status_repo
            .create(status::ActiveModel {
                user_id: Set(user_id),
                status: Set(PresenceStatus::OutOfOffice),
                updated_at: Set(now.into()),
            })
            .await?;

        tracing::info!(user_id = %user.id, "Registered user");
        Ok(user)
    }

    /// Check an email and password and issue a bearer token.
    pub async fn authenticate(&self, input: LoginInput) -> AppResult<Session> {
        let (Some(email), Some(password)) = (
            non_blank(input.email.as_deref()),
            input.password.as_deref().filter(|p| !p.is_empty()),
        ) else {
            return Err(AppError::BadRequest(
                "Email and password are required".to_string(),
            ));
        };

        let invalid = || AppError::Unauthorized("Invalid email or password".to_string());

        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(password, &user.password)? {
            tracing::debug!(user_id = %user.id, "Password mismatch");
            return Err(invalid());
        }

        let token = self.tokens.issue(&user.id, &user.email, &user.name)?;
        Ok(Session { user, token })
    }

    /// Get a user by ID.
    pub async fn get(&self, id: &str) -> AppResult<user::Model> {
        self.user_repo.get_by_id(id).await
    }

    /// A user's public profile with their newest updates.
    pub async fn profile_with_recent_updates(&self, id: &str) -> AppResult<UserProfile> {
        if !IdGenerator::is_valid(id) {
            return Err(AppError::BadRequest("Invalid user ID".to_string()));
        }

        let user = self.user_repo.get_by_id(id).await?;
        let updates = self.update_repo.find_by_user(id, PROFILE_UPDATES).await?;

        Ok(UserProfile { user, updates })
    }

    /// Resolve a bearer token to its user.
    pub async fn authenticate_by_token(&self, token: &str) -> AppResult<user::Model> {
        let claims = self.tokens.verify(token)?;
        self.user_repo.get_by_id(&claims.sub).await
    }
}

/// Trimmed value, or `None` when absent or blank.
fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}
