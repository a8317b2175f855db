use sqlx::{Pool, Sqlite, SqliteConnection};
use crate::db::models::User;
use crate::db::users::UserRepository;
use crate::error::AppError;

pub struct FollowRepository;

impl FollowRepository {
    /// Flip the (follower, followed) edge. Returns `true` when the edge now exists.
    ///
    /// The delete runs first so the write lock is held before anything is read.
    pub async fn toggle(
        conn: &mut SqliteConnection,
        follower_id: i64,
        followed_id: i64,
    ) -> Result<bool, AppError> {
        let removed = sqlx::query("DELETE FROM follows WHERE follower_id = ? AND followed_id = ?")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&mut *conn)
            .await?;

        if removed.rows_affected() > 0 {
            return Ok(false);
        }

        if !UserRepository::exists(&mut *conn, followed_id).await? {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        sqlx::query("INSERT INTO follows (follower_id, followed_id) VALUES (?, ?)")
            .bind(follower_id)
            .bind(followed_id)
            .execute(&mut *conn)
            .await?;

        Ok(true)
    }

    #[cfg(test)]
    pub(crate) async fn is_following(
        pool: &Pool<Sqlite>,
        follower_id: i64,
        followed_id: i64,
    ) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i64>(
            "SELECT 1 FROM follows WHERE follower_id = ? AND followed_id = ?"
        )
        .bind(follower_id)
        .bind(followed_id)
        .fetch_optional(pool)
        .await?;

        Ok(found.is_some())
    }

    pub async fn followers_of(
        pool: &Pool<Sqlite>,
        user_id: i64,
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
SELECT u.* FROM users u
JOIN follows f ON f.follower_id = u.id
WHERE f.followed_id = ?
ORDER BY u.id ASC
            "#
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    pub async fn following_of(
        pool: &Pool<Sqlite>,
        user_id: i64,
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
SELECT u.* FROM users u
JOIN follows f ON f.followed_id = u.id
WHERE f.follower_id = ?
ORDER BY u.id ASC
            "#
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    /// Returns `(followers, following)` for a user.
    pub async fn counts(pool: &Pool<Sqlite>, user_id: i64) -> Result<(i64, i64), AppError> {
        let counts = sqlx::query_as::<_, (i64, i64)>(
            r#"
SELECT
    (SELECT COUNT(*) FROM follows WHERE followed_id = ?),
    (SELECT COUNT(*) FROM follows WHERE follower_id = ?)
            "#
        )
        .bind(user_id)
        .bind(user_id)
        .fetch_one(pool)
        .await?;

        Ok(counts)
    }
}
