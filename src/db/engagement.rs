use sqlx::{Pool, Sqlite, SqliteConnection};
use crate::db::models::{Page, PostSummary};
use crate::db::posts::{PostRepository, SUMMARY_SELECT, VISIBLE};
use crate::error::AppError;

/// Which user→post edge table a toggle operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    Like,
    Bookmark,
}

impl EdgeKind {
    fn table(&self) -> &'static str {
        match self {
            EdgeKind::Like => "likes",
            EdgeKind::Bookmark => "bookmarks",
        }
    }
}

pub struct EngagementRepository;

impl EngagementRepository {
    /// Flip a like or bookmark edge. Returns `true` when the edge now exists.
    ///
    /// The delete runs first so the write lock is held before anything is read.
    /// An existing edge can always be removed; a new one needs a visible post.
    pub async fn toggle(
        conn: &mut SqliteConnection,
        kind: EdgeKind,
        user_id: i64,
        post_id: i64,
        expiry_cutoff: i64,
    ) -> Result<bool, AppError> {
        let delete = format!("DELETE FROM {} WHERE user_id = ? AND post_id = ?", kind.table());
        let removed = sqlx::query(&delete)
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *conn)
            .await?;

        if removed.rows_affected() > 0 {
            return Ok(false);
        }

        if !PostRepository::exists(&mut *conn, post_id, expiry_cutoff).await? {
            return Err(AppError::NotFound("Post not found".to_string()));
        }

        let insert = format!("INSERT INTO {} (user_id, post_id) VALUES (?, ?)", kind.table());
        sqlx::query(&insert)
            .bind(user_id)
            .bind(post_id)
            .execute(&mut *conn)
            .await?;

        Ok(true)
    }

    #[cfg(test)]
    pub(crate) async fn has_edge(
        pool: &Pool<Sqlite>,
        kind: EdgeKind,
        user_id: i64,
        post_id: i64,
    ) -> Result<bool, AppError> {
        let sql = format!("SELECT 1 FROM {} WHERE user_id = ? AND post_id = ?", kind.table());
        let found = sqlx::query_scalar::<_, i64>(&sql)
            .bind(user_id)
            .bind(post_id)
            .fetch_optional(pool)
            .await?;

        Ok(found.is_some())
    }

    pub async fn likes_count(pool: &Pool<Sqlite>, post_id: i64) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE post_id = ?")
            .bind(post_id)
            .fetch_one(pool)
            .await?;

        Ok(count)
    }

    /// Posts the user has bookmarked, newest post first.
    pub async fn bookmarked_by(
        pool: &Pool<Sqlite>,
        user_id: i64,
        page: Page,
        expiry_cutoff: i64,
    ) -> Result<Vec<PostSummary>, AppError> {
        let sql = format!(
            "{SUMMARY_SELECT} JOIN bookmarks b ON b.post_id = p.id \
             WHERE {VISIBLE} AND b.user_id = ? \
             ORDER BY p.created_at DESC, p.id DESC LIMIT ? OFFSET ?"
        );

        let posts = sqlx::query_as::<_, PostSummary>(&sql)
            .bind(expiry_cutoff)
            .bind(user_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(pool)
            .await?;

        Ok(posts)
    }
}
