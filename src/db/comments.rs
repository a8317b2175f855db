use sqlx::{Pool, Sqlite, SqliteConnection};
use crate::db::models::{Comment, CommentView};
use crate::error::AppError;

pub struct CommentRepository;

impl CommentRepository {
    pub async fn create(
        conn: &mut SqliteConnection,
        author_id: i64,
        post_id: i64,
        content: &str,
    ) -> Result<Comment, AppError> {
        let created_at = chrono::Utc::now().timestamp();

        let comment = sqlx::query_as::<_, Comment>(
            r#"
INSERT INTO comments (content, author_id, post_id, created_at)
VALUES (?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(content)
        .bind(author_id)
        .bind(post_id)
        .bind(created_at)
        .fetch_one(&mut *conn)
        .await?;

        Ok(comment)
    }

    /// Comments on a post with author names, oldest first.
    pub async fn list_for_post(
        pool: &Pool<Sqlite>,
        post_id: i64,
    ) -> Result<Vec<CommentView>, AppError> {
        let comments = sqlx::query_as::<_, CommentView>(
            r#"
SELECT c.id, c.content, c.author_id, c.post_id, c.created_at, u.username AS author
FROM comments c
JOIN users u ON c.author_id = u.id
WHERE c.post_id = ?
ORDER BY c.created_at ASC, c.id ASC
            "#
        )
        .bind(post_id)
        .fetch_all(pool)
        .await?;

        Ok(comments)
    }

    pub async fn count_for_post(pool: &Pool<Sqlite>, post_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM comments WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }
}
