use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::sentiment::Sentiment;

pub const DEFAULT_PAGE_LIMIT: u32 = 20;
pub const MAX_PAGE_LIMIT: u32 = 100;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub bio: String,
    pub mood: String,
    pub activity_score: f64,
    pub is_verified: bool,
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub bio: String,
    pub mood: String,
    pub activity_score: f64,
    pub is_verified: bool,
    pub created_at: i64,
    pub followers_count: i64,
    pub following_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub created_at: i64,
    pub sentiment: Sentiment,
    pub is_ephemeral: bool,
    pub ephemeral_duration: i64,
    pub thread_id: Option<i64>,
}

/// A post joined with its author and engagement counts.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PostSummary {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub post: Post,
    pub author: String,
    pub author_verified: bool,
    pub likes_count: i64,
    pub comments_count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub content: String,
    pub author_id: i64,
    pub post_id: i64,
    pub created_at: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentView {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub comment: Comment,
    pub author: String, // Joined from users table
}

#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub summary: PostSummary,
    pub comments: Vec<CommentView>,
    pub replies: Vec<PostSummary>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TrendingPost {
    pub id: i64,
    pub content: String,
    pub author: String,
    pub created_at: i64,
    pub engagement: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub posts: Vec<PostSummary>,
    pub users: Vec<User>,
}

/// Offset pagination. `limit` is clamped to `1..=100` when read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub skip: u32,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_PAGE_LIMIT
}

impl Page {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self { skip, limit }
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.skip)
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.limit.clamp(1, MAX_PAGE_LIMIT))
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(0, DEFAULT_PAGE_LIMIT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_clamps_limit() {
        assert_eq!(Page::new(0, 0).limit(), 1);
        assert_eq!(Page::new(0, 50).limit(), 50);
        assert_eq!(Page::new(0, 5000).limit(), 100);
        assert_eq!(Page::default().limit(), 20);
        assert_eq!(Page::new(40, 10).offset(), 40);
    }

    #[test]
    fn test_user_hides_password_hash() {
        let user = User {
            id: 1,
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password_hash: "secret".to_string(),
            bio: String::new(),
            mood: "neutral".to_string(),
            activity_score: 0.0,
            is_verified: false,
            created_at: 0,
        };

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("secret"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("alice@example.com"));
    }
}
