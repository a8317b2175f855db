//! The social core: identity, graph, content, engagement and ranking.
//!
//! Each submodule adds one component's operations to [`Microblog`]. Every
//! mutation that moves a user's activity score does so inside the same
//! transaction as the mutation itself.

mod content;
mod engagement;
mod graph;
mod identity;
mod ranking;

pub use content::PostDraft;
pub use identity::ProfileUpdate;

use std::sync::Arc;
use std::time::Duration;

use sqlx::{Pool, Sqlite};

use crate::config::Config;
use crate::crypto::{Argon2Credentials, CredentialVerifier, SessionIssuer, SignedSessionTokens};
use crate::sentiment::{LexiconClassifier, RemoteClassifier, SentimentClassifier};

pub const MAX_POST_CHARS: usize = 280;
pub const MAX_BIO_CHARS: usize = 160;

/// Every ephemeral post expires after this window. A post's own
/// `ephemeral_duration` is stored but not consulted.
pub const EPHEMERAL_WINDOW_SECS: i64 = 24 * 3600;
pub const TRENDING_WINDOW_SECS: i64 = 24 * 3600;
pub const TRENDING_LIMIT: i64 = 10;
pub const SEARCH_POST_LIMIT: i64 = 20;
pub const SEARCH_USER_LIMIT: i64 = 10;

pub const POST_ACTIVITY: f64 = 1.0;
pub const COMMENT_ACTIVITY: f64 = 0.5;
pub const FOLLOW_ACTIVITY: f64 = 0.5;
pub const LIKE_ACTIVITY: f64 = 0.2;

#[derive(Clone)]
pub struct Microblog {
    pool: Pool<Sqlite>,
    credentials: Arc<dyn CredentialVerifier>,
    sessions: Arc<dyn SessionIssuer>,
    classifier: Arc<dyn SentimentClassifier>,
    classifier_timeout: Duration,
}

impl Microblog {
    pub fn new(
        pool: Pool<Sqlite>,
        credentials: Arc<dyn CredentialVerifier>,
        sessions: Arc<dyn SessionIssuer>,
        classifier: Arc<dyn SentimentClassifier>,
        classifier_timeout: Duration,
    ) -> Self {
        Self {
            pool,
            credentials,
            sessions,
            classifier,
            classifier_timeout,
        }
    }

    /// Argon2 credentials, a fresh signing key, and the configured classifier.
    pub fn from_config(pool: Pool<Sqlite>, config: &Config) -> Self {
        let classifier: Arc<dyn SentimentClassifier> = match &config.sentiment_url {
            Some(url) => {
                tracing::info!("Using remote sentiment classifier at {}", url);
                Arc::new(RemoteClassifier::new(url.clone()))
            }
            None => {
                tracing::info!("Using built-in lexicon sentiment classifier");
                Arc::new(LexiconClassifier)
            }
        };

        Self::new(
            pool,
            Arc::new(Argon2Credentials),
            Arc::new(SignedSessionTokens::generate()),
            classifier,
            Duration::from_millis(config.sentiment_timeout_ms),
        )
    }
}

fn now() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Ephemeral posts created before this instant are expired.
fn expiry_cutoff(now: i64) -> i64 {
    now - EPHEMERAL_WINDOW_SECS
}

/// Clamp to at most `max` characters (not bytes).
fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use async_trait::async_trait;

    use crate::db::{open_in_memory, User};
    use crate::error::AppError;
    use crate::sentiment::Sentiment;

    /// Always answers with the same label.
    pub struct FixedClassifier(pub Sentiment);

    #[async_trait]
    impl SentimentClassifier for FixedClassifier {
        async fn classify(&self, _text: &str) -> Result<Sentiment, AppError> {
            Ok(self.0)
        }
    }

    /// Reversible stand-in so tests don't pay for Argon2 on every user.
    pub struct PlainCredentials;

    impl CredentialVerifier for PlainCredentials {
        fn hash(&self, password: &str) -> Result<String, AppError> {
            Ok(format!("plain${}", password))
        }

        fn verify(&self, stored_hash: &str, password: &str) -> Result<bool, AppError> {
            Ok(stored_hash.strip_prefix("plain$") == Some(password))
        }
    }

    pub async fn service() -> Microblog {
        let pool = open_in_memory().await.unwrap();
        Microblog::new(
            pool,
            Arc::new(PlainCredentials),
            Arc::new(SignedSessionTokens::generate()),
            Arc::new(FixedClassifier(Sentiment::Positive)),
            Duration::from_millis(200),
        )
    }

    pub async fn user(service: &Microblog, name: &str) -> User {
        let (user, _) = service
            .register(name, &format!("{}@example.com", name), "pw", "")
            .await
            .unwrap();
        user
    }

    pub async fn score(service: &Microblog, user: &User) -> f64 {
        service.get_user(user.id).await.unwrap().activity_score
    }
}
