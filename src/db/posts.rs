use sqlx::{Pool, Sqlite, SqliteConnection};
use crate::db::models::{Page, Post, PostSummary, TrendingPost};
use crate::error::AppError;
use crate::sentiment::Sentiment;

/// Post columns joined with author name and engagement counts.
pub(crate) const SUMMARY_SELECT: &str = r#"
SELECT p.id, p.content, p.author_id, p.created_at, p.sentiment, p.is_ephemeral,
       p.ephemeral_duration, p.thread_id,
       u.username AS author, u.is_verified AS author_verified,
       (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id) AS likes_count,
       (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS comments_count
FROM posts p
JOIN users u ON u.id = p.author_id
"#;

/// Hides ephemeral posts created before the bound expiry cutoff.
pub(crate) const VISIBLE: &str = "NOT (p.is_ephemeral = 1 AND p.created_at < ?)";

pub struct NewPost<'a> {
    pub author_id: i64,
    pub content: &'a str,
    pub sentiment: Sentiment,
    pub is_ephemeral: bool,
    pub ephemeral_duration: i64,
    pub thread_id: Option<i64>,
    pub created_at: i64,
}

pub struct PostRepository;

impl PostRepository {
    pub async fn create(
        conn: &mut SqliteConnection,
        post: NewPost<'_>,
    ) -> Result<Post, AppError> {
        let post = sqlx::query_as::<_, Post>(
            r#"
INSERT INTO posts (content, author_id, created_at, sentiment, is_ephemeral, ephemeral_duration, thread_id)
VALUES (?, ?, ?, ?, ?, ?, ?)
RETURNING *
            "#,
        )
        .bind(post.content)
        .bind(post.author_id)
        .bind(post.created_at)
        .bind(post.sentiment)
        .bind(post.is_ephemeral)
        .bind(post.ephemeral_duration)
        .bind(post.thread_id)
        .fetch_one(&mut *conn)
        .await?;

        Ok(post)
    }

    /// Whether a visible post with this id exists. Expired ephemeral posts do not count.
    pub async fn exists(
        conn: &mut SqliteConnection,
        id: i64,
        expiry_cutoff: i64,
    ) -> Result<bool, AppError> {
        let sql = format!("SELECT 1 FROM posts p WHERE {VISIBLE} AND p.id = ?");
        let found = sqlx::query_scalar::<_, i64>(&sql)
            .bind(expiry_cutoff)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(found.is_some())
    }

    pub async fn get_summary(
        pool: &Pool<Sqlite>,
        id: i64,
        expiry_cutoff: i64,
    ) -> Result<Option<PostSummary>, AppError> {
        let sql = format!("{SUMMARY_SELECT} WHERE {VISIBLE} AND p.id = ?");

        let post = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(expiry_cutoff)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        Ok(post)
    }

    /// Global timeline, newest first.
    pub async fn list(
        pool: &Pool<Sqlite>,
        page: Page,
        expiry_cutoff: i64,
    ) -> Result<Vec<PostSummary>, AppError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE {VISIBLE} ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        );

        let posts = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(expiry_cutoff)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(posts)
    }

    pub async fn list_by_author(
        pool: &Pool<Sqlite>,
        author_id: i64,
        page: Page,
        expiry_cutoff: i64,
    ) -> Result<Vec<PostSummary>, AppError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE {VISIBLE} AND p.author_id = ? \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        );

        let posts = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(expiry_cutoff)
            .bind(author_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(posts)
    }

    /// The user's own posts plus posts of everyone they follow, newest first.
    pub async fn feed(
        pool: &Pool<Sqlite>,
        user_id: i64,
        page: Page,
        expiry_cutoff: i64,
    ) -> Result<Vec<PostSummary>, AppError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE {VISIBLE} AND (p.author_id = ? OR p.author_id IN \
             (SELECT followed_id FROM follows WHERE follower_id = ?)) \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        );

        let posts = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(expiry_cutoff)
            .bind(user_id)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(posts)
    }

    /// Thread children of a post, oldest first.
    pub async fn replies_to(
        pool: &Pool<Sqlite>,
        parent_id: i64,
        expiry_cutoff: i64,
    ) -> Result<Vec<PostSummary>, AppError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE {VISIBLE} AND p.thread_id = ? ORDER BY p.created_at ASC, p.id ASC"
        );

        let posts = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(expiry_cutoff)
            .bind(parent_id)
            .fetch_all(pool)
            .await?;

        Ok(posts)
    }

    /// Most engaged posts created after `since`. Ties go to the newer post.
    pub async fn trending(
        pool: &Pool<Sqlite>,
        since: i64,
        expiry_cutoff: i64,
        limit: i64,
    ) -> Result<Vec<TrendingPost>, AppError> {
        let sql = format!(
            r#"
SELECT p.id, p.content, u.username AS author, p.created_at,
       (SELECT COUNT(*) FROM likes l WHERE l.post_id = p.id)
     + (SELECT COUNT(*) FROM comments c WHERE c.post_id = p.id) AS engagement
FROM posts p
JOIN users u ON u.id = p.author_id
WHERE p.created_at > ? AND {VISIBLE}
ORDER BY engagement DESC, p.created_at DESC, p.id DESC
LIMIT ?
            "#
        );

        let posts = sqlx::query_as::<_, TrendingPost>(&sql)
            .bind(since)
            .bind(expiry_cutoff)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(posts)
    }

    /// Case-sensitive substring match on content.
    pub async fn search(
        pool: &Pool<Sqlite>,
        query: &str,
        limit: i64,
        expiry_cutoff: i64,
    ) -> Result<Vec<PostSummary>, AppError> {
        let sql = format!(
            "{SUMMARY_SELECT} WHERE {VISIBLE} AND instr(p.content, ?) > 0 \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ?"
        );

        let posts = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(expiry_cutoff)
            .bind(query)
            .bind(limit)
            .fetch_all(pool)
            .await?;

        Ok(posts)
    }

    /// Delete every ephemeral post created before `cutoff`. Returns the number removed.
    pub async fn sweep_expired(pool: &Pool<Sqlite>, cutoff: i64) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM posts WHERE is_ephemeral = 1 AND created_at < ?")
            .bind(cutoff)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    #[cfg(test)]
    pub(crate) async fn set_created_at_for_test(
        pool: &Pool<Sqlite>,
        id: i64,
        created_at: i64,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE posts SET created_at = ? WHERE id = ?")
            .bind(created_at)
            .bind(id)
            .execute(pool)
            .await?;

        Ok(())
    }
}
