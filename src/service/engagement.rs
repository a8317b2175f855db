use crate::db::{
    CommentRepository, EdgeKind, EngagementRepository, Page, PostSummary, User, UserRepository,
};
use crate::error::AppError;
use crate::service::{expiry_cutoff, now, Microblog, LIKE_ACTIVITY};

impl Microblog {
    /// Like or unlike a post. Returns `true` if the post is now liked.
    pub async fn toggle_like(&self, actor: &User, post_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let liked = EngagementRepository::toggle(
            &mut *tx,
            EdgeKind::Like,
            actor.id,
            post_id,
            expiry_cutoff(now()),
        )
        .await?;
        let delta = if liked { LIKE_ACTIVITY } else { -LIKE_ACTIVITY };
        UserRepository::adjust_activity(&mut *tx, actor.id, delta).await?;

        tx.commit().await?;

        tracing::debug!(actor = actor.id, post_id, liked, "Toggled like");
        Ok(liked)
    }

    /// Bookmark or un-bookmark a post. Does not touch the activity score.
    pub async fn toggle_bookmark(&self, actor: &User, post_id: i64) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let bookmarked = EngagementRepository::toggle(
            &mut *tx,
            EdgeKind::Bookmark,
            actor.id,
            post_id,
            expiry_cutoff(now()),
        )
        .await?;

        tx.commit().await?;

        tracing::debug!(actor = actor.id, post_id, bookmarked, "Toggled bookmark");
        Ok(bookmarked)
    }

    pub async fn likes_count(&self, post_id: i64) -> Result<i64, AppError> {
        EngagementRepository::likes_count(&self.pool, post_id).await
    }

    pub async fn comments_count(&self, post_id: i64) -> Result<i64, AppError> {
        CommentRepository::count_for_post(&self.pool, post_id).await
    }

    pub async fn bookmarks_of(&self, user: &User, page: Page) -> Result<Vec<PostSummary>, AppError> {
        EngagementRepository::bookmarked_by(&self.pool, user.id, page, expiry_cutoff(now())).await
    }
}
