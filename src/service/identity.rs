use serde::Deserialize;

use crate::crypto::SessionToken;
use crate::db::{FollowRepository, User, UserProfile, UserRepository};
use crate::error::AppError;
use crate::service::{truncate_chars, Microblog, MAX_BIO_CHARS};

/// Fields left as `None` are not changed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProfileUpdate {
    pub bio: Option<String>,
    pub mood: Option<String>,
}

/// Validate username shape
fn validate_username(username: &str) -> Result<(), AppError> {
    let len = username.chars().count();

    if len == 0 || len > 50 {
        return Err(AppError::InvalidOperation(
            "Username must be 1-50 characters".to_string(),
        ));
    }

    if username.chars().any(char::is_whitespace) {
        return Err(AppError::InvalidOperation(
            "Username must not contain whitespace".to_string(),
        ));
    }

    Ok(())
}

fn validate_email(email: &str) -> Result<(), AppError> {
    let len = email.chars().count();

    if len == 0 || len > 100 || !email.contains('@') {
        return Err(AppError::InvalidOperation("Invalid email address".to_string()));
    }

    Ok(())
}

impl Microblog {
    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
        bio: &str,
    ) -> Result<(User, SessionToken), AppError> {
        validate_username(username)?;
        validate_email(email)?;

        if password.is_empty() {
            return Err(AppError::InvalidOperation("Password must not be empty".to_string()));
        }

        if UserRepository::get_by_username(&self.pool, username).await?.is_some() {
            return Err(AppError::Conflict("Username already exists".to_string()));
        }

        if UserRepository::get_by_email(&self.pool, email).await?.is_some() {
            return Err(AppError::Conflict("Email already exists".to_string()));
        }

        let password_hash = self.hash_password(password).await?;
        let bio = truncate_chars(bio, MAX_BIO_CHARS);

        let user = UserRepository::create(&self.pool, username, email, &password_hash, &bio).await?;
        let session = self.sessions.issue(user.id)?;

        tracing::info!(user_id = user.id, username = %user.username, "Registered user");

        Ok((user, session))
    }

    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<(User, SessionToken), AppError> {
        let user = UserRepository::get_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid credentials".to_string()))?;

        if !self.verify_password(&user.password_hash, password).await? {
            tracing::debug!(user_id = user.id, "Rejected login with wrong password");
            return Err(AppError::Unauthorized("Invalid credentials".to_string()));
        }

        let session = self.sessions.issue(user.id)?;
        Ok((user, session))
    }

    /// Resolve a session token (optionally `Bearer `-prefixed) to its user.
    pub async fn resolve_session(&self, token: &str) -> Result<User, AppError> {
        let token = token.strip_prefix("Bearer ").unwrap_or(token).trim();

        if token.is_empty() {
            return Err(AppError::Unauthorized("Missing session token".to_string()));
        }

        let user_id = self.sessions.decode(token)?;

        UserRepository::get_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized("User not found".to_string()))
    }

    pub async fn update_profile(
        &self,
        user: &User,
        update: ProfileUpdate,
    ) -> Result<User, AppError> {
        let bio = update.bio.map(|bio| truncate_chars(&bio, MAX_BIO_CHARS));

        UserRepository::update_profile(&self.pool, user.id, bio.as_deref(), update.mood.as_deref())
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }

    pub async fn get_user(&self, user_id: i64) -> Result<UserProfile, AppError> {
        let user = UserRepository::get_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

        let (followers_count, following_count) = FollowRepository::counts(&self.pool, user.id).await?;

        Ok(UserProfile {
            id: user.id,
            username: user.username,
            bio: user.bio,
            mood: user.mood,
            activity_score: user.activity_score,
            is_verified: user.is_verified,
            created_at: user.created_at,
            followers_count,
            following_count,
        })
    }

    /// Remove the account along with its posts, comments and edges.
    pub async fn delete_account(&self, user: &User) -> Result<(), AppError> {
        if !UserRepository::delete(&self.pool, user.id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        tracing::info!(user_id = user.id, "Deleted account");
        Ok(())
    }

    async fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let credentials = self.credentials.clone();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || credentials.hash(&password))
            .await
            .map_err(|e| AppError::Internal(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, stored_hash: &str, password: &str) -> Result<bool, AppError> {
        let credentials = self.credentials.clone();
        let stored_hash = stored_hash.to_string();
        let password = password.to_string();

        tokio::task::spawn_blocking(move || credentials.verify(&stored_hash, &password))
            .await
            .map_err(|e| AppError::Internal(format!("Verification task failed: {}", e)))?
    }
}
