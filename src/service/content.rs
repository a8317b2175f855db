use serde::Deserialize;

use crate::db::{
    Comment, CommentRepository, NewPost, Page, Post, PostDetail, PostRepository, PostSummary,
    User, UserRepository,
};
use crate::error::AppError;
use crate::sentiment::classify_or_default;
use crate::service::{
    expiry_cutoff, now, truncate_chars, Microblog, COMMENT_ACTIVITY, MAX_POST_CHARS,
    POST_ACTIVITY,
};

const DEFAULT_EPHEMERAL_HOURS: i64 = 24;

#[derive(Debug, Clone, Deserialize)]
pub struct PostDraft {
    pub content: String,
    #[serde(default)]
    pub is_ephemeral: bool,
    #[serde(default = "default_ephemeral_duration")]
    pub ephemeral_duration: i64,
    /// Parent post. Not checked for existence.
    #[serde(default)]
    pub thread_id: Option<i64>,
}

fn default_ephemeral_duration() -> i64 {
    DEFAULT_EPHEMERAL_HOURS
}

impl PostDraft {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_ephemeral: false,
            ephemeral_duration: DEFAULT_EPHEMERAL_HOURS,
            thread_id: None,
        }
    }

    pub fn ephemeral(mut self, hours: i64) -> Self {
        self.is_ephemeral = true;
        self.ephemeral_duration = hours;
        self
    }

    pub fn reply_to(mut self, parent_id: i64) -> Self {
        self.thread_id = Some(parent_id);
        self
    }
}

impl Microblog {
    pub async fn create_post(&self, author: &User, draft: PostDraft) -> Result<Post, AppError> {
        if draft.ephemeral_duration < 1 {
            return Err(AppError::InvalidOperation(
                "ephemeral_duration must be at least one hour".to_string(),
            ));
        }

        let content = truncate_chars(&draft.content, MAX_POST_CHARS);
        let sentiment =
            classify_or_default(self.classifier.as_ref(), &content, self.classifier_timeout).await;

        let mut tx = self.pool.begin().await?;

        let post = PostRepository::create(
            &mut *tx,
            NewPost {
                author_id: author.id,
                content: &content,
                sentiment,
                is_ephemeral: draft.is_ephemeral,
                ephemeral_duration: draft.ephemeral_duration,
                thread_id: draft.thread_id,
                created_at: now(),
            },
        )
        .await?;
        UserRepository::adjust_activity(&mut *tx, author.id, POST_ACTIVITY).await?;

        tx.commit().await?;

        tracing::debug!(post_id = post.id, author = author.id, %sentiment, "Created post");
        Ok(post)
    }

    pub async fn create_comment(
        &self,
        author: &User,
        post_id: i64,
        content: &str,
    ) -> Result<Comment, AppError> {
        let content = truncate_chars(content, MAX_POST_CHARS);

        let mut tx = self.pool.begin().await?;

        if !PostRepository::exists(&mut *tx, post_id, expiry_cutoff(now())).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let comment = CommentRepository::create(&mut *tx, author.id, post_id, &content).await?;
        UserRepository::adjust_activity(&mut *tx, author.id, COMMENT_ACTIVITY).await?;

        tx.commit().await?;

        tracing::debug!(comment_id = comment.id, post_id, author = author.id, "Created comment");
        Ok(comment)
    }

    /// A post with its comments and thread replies.
    pub async fn get_post(&self, post_id: i64) -> Result<PostDetail, AppError> {
        let cutoff = expiry_cutoff(now());

        let summary = PostRepository::get_summary(&self.pool, post_id, cutoff)
            .await?
            .ok_or_else(|| AppError::NotFound("Post not found".to_string()))?;
        let comments = CommentRepository::list_for_post(&self.pool, post_id).await?;
        let replies = PostRepository::replies_to(&self.pool, post_id, cutoff).await?;

        Ok(PostDetail {
            summary,
            comments,
            replies,
        })
    }

    /// Posts whose `thread_id` points at `post_id`, oldest first.
    pub async fn replies_to(&self, post_id: i64) -> Result<Vec<PostSummary>, AppError> {
        PostRepository::replies_to(&self.pool, post_id, expiry_cutoff(now())).await
    }

    pub async fn user_posts(&self, user_id: i64, page: Page) -> Result<Vec<PostSummary>, AppError> {
        self.require_user(user_id).await?;
        PostRepository::list_by_author(&self.pool, user_id, page, expiry_cutoff(now())).await
    }

    /// Delete expired ephemeral posts. Returns how many were removed.
    pub async fn sweep_expired(&self) -> Result<u64, AppError> {
        let removed = PostRepository::sweep_expired(&self.pool, expiry_cutoff(now())).await?;

        if removed > 0 {
            tracing::info!(removed, "Swept expired ephemeral posts");
        }

        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sentiment::Sentiment;
    use crate::service::{testing, EPHEMERAL_WINDOW_SECS};

    #[tokio::test]
    async fn test_create_and_get_post_round_trip() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;

        let post = service.create_post(&alice, PostDraft::new("hello")).await.unwrap();
        assert_eq!(post.sentiment, Sentiment::Positive);
        assert_eq!(testing::score(&service, &alice).await, 1.0);

        let detail = service.get_post(post.id).await.unwrap();
        assert_eq!(detail.summary.post.content, "hello");
        assert_eq!(detail.summary.post.author_id, alice.id);
        assert_eq!(detail.summary.author, "alice");
        assert_eq!(detail.summary.post.sentiment, Sentiment::Positive);
        assert!(detail.comments.is_empty());
    }

    #[tokio::test]
    async fn test_content_truncated_to_280() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;

        let post = service.create_post(&alice, PostDraft::new("a".repeat(300))).await.unwrap();
        assert_eq!(post.content.chars().count(), 280);

        let comment = service.create_comment(&alice, post.id, &"b".repeat(300)).await.unwrap();
        assert_eq!(comment.content.chars().count(), 280);
    }

    #[tokio::test]
    async fn test_zero_hour_ephemeral_rejected() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;

        let result = service.create_post(&alice, PostDraft::new("x").ephemeral(0)).await;
        assert!(matches!(result, Err(AppError::InvalidOperation(_))));
        assert_eq!(testing::score(&service, &alice).await, 0.0);
    }

    #[tokio::test]
    async fn test_comment_on_missing_post() {
        let service = testing::service().await;
        let bob = testing::user(&service, "bob").await;

        let result = service.create_comment(&bob, 77, "hi").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
        assert_eq!(testing::score(&service, &bob).await, 0.0);
    }

    #[tokio::test]
    async fn test_comments_nested_in_post() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;
        let bob = testing::user(&service, "bob").await;

        let post = service.create_post(&alice, PostDraft::new("hello")).await.unwrap();
        service.create_comment(&bob, post.id, "first!").await.unwrap();
        service.create_comment(&alice, post.id, "thanks").await.unwrap();
        assert_eq!(testing::score(&service, &bob).await, 0.5);

        let detail = service.get_post(post.id).await.unwrap();
        assert_eq!(detail.summary.comments_count, 2);
        let authors: Vec<&str> = detail.comments.iter().map(|c| c.author.as_str()).collect();
        assert_eq!(authors, vec!["bob", "alice"]);
    }

    #[tokio::test]
    async fn test_thread_replies_and_relaxed_parent() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;

        let root = service.create_post(&alice, PostDraft::new("1/")).await.unwrap();
        let reply = service
            .create_post(&alice, PostDraft::new("2/").reply_to(root.id))
            .await
            .unwrap();
        assert_eq!(reply.thread_id, Some(root.id));

        let orphan = service
            .create_post(&alice, PostDraft::new("dangling").reply_to(4242))
            .await
            .unwrap();
        assert_eq!(orphan.thread_id, Some(4242));

        let detail = service.get_post(root.id).await.unwrap();
        assert_eq!(detail.replies.len(), 1);
        assert_eq!(detail.replies[0].post.id, reply.id);
        assert_eq!(service.replies_to(4242).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_uses_fixed_window() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;
        let past_window = now() - EPHEMERAL_WINDOW_SECS - 60;

        // A one-hour ephemeral post survives until the shared 24-hour window passes.
        let short = service.create_post(&alice, PostDraft::new("brief").ephemeral(1)).await.unwrap();
        PostRepository::set_created_at_for_test(&service.pool, short.id, now() - 2 * 3600)
            .await
            .unwrap();

        let expired = service.create_post(&alice, PostDraft::new("old").ephemeral(24)).await.unwrap();
        PostRepository::set_created_at_for_test(&service.pool, expired.id, past_window)
            .await
            .unwrap();

        let durable = service.create_post(&alice, PostDraft::new("keep")).await.unwrap();
        PostRepository::set_created_at_for_test(&service.pool, durable.id, past_window - 86_400 * 30)
            .await
            .unwrap();

        assert!(matches!(service.get_post(expired.id).await, Err(AppError::NotFound(_))));
        assert_eq!(service.sweep_expired().await.unwrap(), 1);

        assert!(service.get_post(short.id).await.is_ok());
        assert!(service.get_post(durable.id).await.is_ok());
        assert_eq!(service.sweep_expired().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_user_posts() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;
        let bob = testing::user(&service, "bob").await;

        service.create_post(&alice, PostDraft::new("a1")).await.unwrap();
        service.create_post(&bob, PostDraft::new("b1")).await.unwrap();
        service.create_post(&alice, PostDraft::new("a2")).await.unwrap();

        let posts = service.user_posts(alice.id, Page::default()).await.unwrap();
        let contents: Vec<&str> = posts.iter().map(|p| p.post.content.as_str()).collect();
        assert_eq!(contents, vec!["a2", "a1"]);
        assert!(matches!(
            service.user_posts(999, Page::default()).await,
            Err(AppError::NotFound(_))
        ));
    }
}
