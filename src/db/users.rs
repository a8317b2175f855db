use sqlx::{Pool, Sqlite, SqliteConnection};
use crate::db::models::User;
use crate::error::AppError;

pub struct UserRepository;

impl UserRepository {
    pub async fn create(
        pool: &Pool<Sqlite>,
        username: &str,
        email: &str,
        password_hash: &str,
        bio: &str,
    ) -> Result<User, AppError> {
        let created_at = chrono::Utc::now().timestamp();

        let user = sqlx::query_as::<_, User>(
            r#"
INSERT INTO users (username, email, password_hash, bio, created_at)
VALUES (?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(bio)
        .bind(created_at)
        .fetch_one(pool)
        .await
        .map_err(|e| AppError::conflict_on_unique(e, "Username or email already exists"))?;

        Ok(user)
    }

    pub async fn get_by_username(
        pool: &Pool<Sqlite>,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE username = ?"
        )
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_email(
        pool: &Pool<Sqlite>,
        email: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE email = ?"
        )
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn get_by_id(
        pool: &Pool<Sqlite>,
        id: i64,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = ?"
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Partial update: `None` leaves the column untouched.
    pub async fn update_profile(
        pool: &Pool<Sqlite>,
        id: i64,
        bio: Option<&str>,
        mood: Option<&str>,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>(
            r#"
UPDATE users
SET bio = COALESCE(?, bio), mood = COALESCE(?, mood)
WHERE id = ?
RETURNING *
            "#,
        )
        .bind(bio)
        .bind(mood)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Shift a user's activity score. Call inside the transaction of the
    /// mutation that earned (or revoked) the points.
    pub async fn adjust_activity(
        conn: &mut SqliteConnection,
        id: i64,
        delta: f64,
    ) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE users SET activity_score = activity_score + ? WHERE id = ?")
            .bind(delta)
            .bind(id)
            .execute(&mut *conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("User not found".to_string()));
        }

        Ok(())
    }

    pub async fn exists(conn: &mut SqliteConnection, id: i64) -> Result<bool, AppError> {
        let found = sqlx::query_scalar::<_, i64>("SELECT 1 FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(found.is_some())
    }

    /// Case-sensitive substring match on username.
    pub async fn search(
        pool: &Pool<Sqlite>,
        query: &str,
        limit: i64,
    ) -> Result<Vec<User>, AppError> {
        let users = sqlx::query_as::<_, User>(
            r#"
SELECT * FROM users
WHERE instr(username, ?) > 0
ORDER BY id ASC
LIMIT ?
            "#,
        )
        .bind(query)
        .bind(limit)
        .fetch_all(pool)
        .await?;

        Ok(users)
    }

    pub async fn delete(pool: &Pool<Sqlite>, id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;

    #[tokio::test]
    async fn test_unique_username_and_email() {
        let pool = open_in_memory().await.unwrap();
        UserRepository::create(&pool, "alice", "alice@example.com", "h", "").await.unwrap();

        let dup_name = UserRepository::create(&pool, "alice", "other@example.com", "h", "").await;
        assert!(matches!(dup_name, Err(AppError::Conflict(_))));

        let dup_email = UserRepository::create(&pool, "alice2", "alice@example.com", "h", "").await;
        assert!(matches!(dup_email, Err(AppError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_partial_profile_update() {
        let pool = open_in_memory().await.unwrap();
        let user = UserRepository::create(&pool, "bob", "bob@example.com", "h", "hi").await.unwrap();
        assert_eq!(user.mood, "neutral");

        let updated = UserRepository::update_profile(&pool, user.id, None, Some("sunny"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.bio, "hi");
        assert_eq!(updated.mood, "sunny");
    }

    #[tokio::test]
    async fn test_search_is_case_sensitive_substring() {
        let pool = open_in_memory().await.unwrap();
        UserRepository::create(&pool, "Alice", "a@example.com", "h", "").await.unwrap();
        UserRepository::create(&pool, "malice", "m@example.com", "h", "").await.unwrap();

        let hits = UserRepository::search(&pool, "lice", 10).await.unwrap();
        assert_eq!(hits.len(), 2);

        let hits = UserRepository::search(&pool, "Ali", 10).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].username, "Alice");
    }
}
