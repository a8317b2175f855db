//! Sentiment classification for post content.
//!
//! The classifier is an injected capability. Whatever backs it, post creation
//! goes through [`classify_or_default`], which bounds the call with a timeout
//! and degrades to [`Sentiment::Neutral`] instead of failing.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(rename_all = "lowercase")]
pub enum Sentiment {
    Positive,
    #[default]
    Neutral,
    Negative,
}

impl Sentiment {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sentiment::Positive => "positive",
            Sentiment::Neutral => "neutral",
            Sentiment::Negative => "negative",
        }
    }
}

impl fmt::Display for Sentiment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Sentiment {
    type Err = AppError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label.trim().to_lowercase().as_str() {
            "positive" | "pos" => Ok(Sentiment::Positive),
            "neutral" => Ok(Sentiment::Neutral),
            "negative" | "neg" => Ok(Sentiment::Negative),
            other => Err(AppError::Internal(format!("Unknown sentiment label: {}", other))),
        }
    }
}

#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Sentiment, AppError>;
}

/// Run the classifier, falling back to `Neutral` on error or timeout.
pub async fn classify_or_default(
    classifier: &dyn SentimentClassifier,
    text: &str,
    timeout: Duration,
) -> Sentiment {
    match tokio::time::timeout(timeout, classifier.classify(text)).await {
        Ok(Ok(sentiment)) => sentiment,
        Ok(Err(e)) => {
            tracing::warn!("Sentiment classifier failed, using default label: {}", e);
            Sentiment::default()
        }
        Err(_) => {
            tracing::warn!(
                "Sentiment classifier timed out after {:?}, using default label",
                timeout
            );
            Sentiment::default()
        }
    }
}

const POSITIVE_WORDS: &[&str] = &[
    "amazing", "awesome", "beautiful", "best", "brilliant", "excited", "fantastic", "fun",
    "glad", "good", "great", "happy", "hello", "love", "loved", "lovely", "nice", "perfect",
    "thanks", "wonderful", "yay",
];

const NEGATIVE_WORDS: &[&str] = &[
    "angry", "annoying", "awful", "bad", "boring", "broken", "disappointed", "hate", "hated",
    "horrible", "miserable", "sad", "sick", "terrible", "tired", "ugly", "upset", "worst",
    "wrong",
];

/// Word-list scorer used when no external model is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LexiconClassifier;

impl LexiconClassifier {
    pub fn score(text: &str) -> i32 {
        text.split(|c: char| !c.is_alphanumeric() && c != '\'')
            .filter(|word| !word.is_empty())
            .map(|word| {
                let word = word.to_lowercase();
                if POSITIVE_WORDS.contains(&word.as_str()) {
                    1
                } else if NEGATIVE_WORDS.contains(&word.as_str()) {
                    -1
                } else {
                    0
                }
            })
            .sum()
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment, AppError> {
        Ok(match Self::score(text) {
            s if s > 0 => Sentiment::Positive,
            s if s < 0 => Sentiment::Negative,
            _ => Sentiment::Neutral,
        })
    }
}

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
}

/// HTTP client for an external sentiment model service.
///
/// Sends `{"text": ...}` and expects `{"label": "positive" | "neutral" | "negative"}`.
#[derive(Debug, Clone)]
pub struct RemoteClassifier {
    client: reqwest::Client,
    url: String,
}

impl RemoteClassifier {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SentimentClassifier for RemoteClassifier {
    async fn classify(&self, text: &str) -> Result<Sentiment, AppError> {
        let response = self
            .client
            .post(&self.url)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::Internal(format!("Sentiment service request failed: {}", e)))?;

        let body: ClassifyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Internal(format!("Invalid sentiment response: {}", e)))?;

        body.label.parse()
    }
}
