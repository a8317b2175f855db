use crate::db::{FollowRepository, User, UserRepository};
use crate::error::AppError;
use crate::service::{Microblog, FOLLOW_ACTIVITY};

impl Microblog {
    /// Follow or unfollow `target_id`. Returns `true` if `actor` now follows the target.
    pub async fn follow(&self, actor: &User, target_id: i64) -> Result<bool, AppError> {
        if actor.id == target_id {
            return Err(AppError::InvalidOperation("Cannot follow yourself".to_string()));
        }

        let mut tx = self.pool.begin().await?;

        let following = FollowRepository::toggle(&mut *tx, actor.id, target_id).await?;
        let delta = if following { FOLLOW_ACTIVITY } else { -FOLLOW_ACTIVITY };
        UserRepository::adjust_activity(&mut *tx, actor.id, delta).await?;

        tx.commit().await?;

        tracing::debug!(actor = actor.id, target = target_id, following, "Toggled follow");
        Ok(following)
    }

    pub async fn followers_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        self.require_user(user_id).await?;
        FollowRepository::followers_of(&self.pool, user_id).await
    }

    pub async fn following_of(&self, user_id: i64) -> Result<Vec<User>, AppError> {
        self.require_user(user_id).await?;
        FollowRepository::following_of(&self.pool, user_id).await
    }

    pub(crate) async fn require_user(&self, user_id: i64) -> Result<User, AppError> {
        UserRepository::get_by_id(&self.pool, user_id)
            .await?
            .ok_or_else(|| AppError::NotFound("User not found".to_string()))
    }
}
