use crate::db::{Page, PostRepository, PostSummary, SearchResults, TrendingPost, User, UserRepository};
use crate::error::AppError;
use crate::service::{
    expiry_cutoff, now, Microblog, SEARCH_POST_LIMIT, SEARCH_USER_LIMIT, TRENDING_LIMIT,
    TRENDING_WINDOW_SECS,
};

impl Microblog {
    /// Global timeline, newest first. Sweeps expired ephemeral posts before reading.
    pub async fn list_posts(&self, page: Page) -> Result<Vec<PostSummary>, AppError> {
        self.sweep_expired().await?;
        PostRepository::list(&self.pool, page, expiry_cutoff(now())).await
    }

    /// The user's own posts and posts from everyone they follow, newest first.
    pub async fn feed_for(&self, user: &User, page: Page) -> Result<Vec<PostSummary>, AppError> {
        PostRepository::feed(&self.pool, user.id, page, expiry_cutoff(now())).await
    }

    /// Top posts of the trailing 24 hours by likes + comments.
    pub async fn trending(&self) -> Result<Vec<TrendingPost>, AppError> {
        self.trending_within(TRENDING_WINDOW_SECS).await
    }

    /// Ranked by engagement, then newest first, then highest id.
    pub async fn trending_within(&self, window_secs: i64) -> Result<Vec<TrendingPost>, AppError> {
        let now = now();
        PostRepository::trending(&self.pool, now - window_secs, expiry_cutoff(now), TRENDING_LIMIT)
            .await
    }

    /// Plain substring containment on post content and usernames.
    pub async fn search(&self, query: &str) -> Result<SearchResults, AppError> {
        let posts =
            PostRepository::search(&self.pool, query, SEARCH_POST_LIMIT, expiry_cutoff(now()))
                .await?;
        let users = UserRepository::search(&self.pool, query, SEARCH_USER_LIMIT).await?;

        Ok(SearchResults { posts, users })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::{testing, PostDraft, EPHEMERAL_WINDOW_SECS};

    #[tokio::test]
    async fn test_list_posts_paginates_and_sweeps() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;

        for i in 0..5 {
            service.create_post(&alice, PostDraft::new(format!("post {}", i))).await.unwrap();
        }
        let stale = service.create_post(&alice, PostDraft::new("stale").ephemeral(24)).await.unwrap();
        PostRepository::set_created_at_for_test(&service.pool, stale.id, now() - EPHEMERAL_WINDOW_SECS - 1)
            .await
            .unwrap();

        let page = service.list_posts(Page::new(1, 2)).await.unwrap();
        let contents: Vec<&str> = page.iter().map(|p| p.post.content.as_str()).collect();
        assert_eq!(contents, vec!["post 3", "post 2"]);

        let everything = service.list_posts(Page::new(0, 1000)).await.unwrap();
        assert_eq!(everything.len(), 5);
        assert_eq!(service.sweep_expired().await.unwrap(), 0);

        assert_eq!(service.list_posts(Page::new(0, 0)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_feed_includes_self_and_followed_only() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;
        let bob = testing::user(&service, "bob").await;
        let carol = testing::user(&service, "carol").await;

        service.follow(&alice, bob.id).await.unwrap();
        service.follow(&carol, alice.id).await.unwrap();

        service.create_post(&alice, PostDraft::new("from alice")).await.unwrap();
        service.create_post(&bob, PostDraft::new("from bob")).await.unwrap();
        service.create_post(&carol, PostDraft::new("from carol")).await.unwrap();

        let feed = service.feed_for(&alice, Page::default()).await.unwrap();
        let authors: Vec<&str> = feed.iter().map(|p| p.author.as_str()).collect();
        assert_eq!(authors, vec!["bob", "alice"]);

        let carol_feed = service.feed_for(&carol, Page::default()).await.unwrap();
        let authors: Vec<&str> = carol_feed.iter().map(|p| p.author.as_str()).collect();
        assert_eq!(authors, vec!["carol", "alice"]);
    }

    #[tokio::test]
    async fn test_trending_ranks_and_caps() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;
        let bob = testing::user(&service, "bob").await;
        let carol = testing::user(&service, "carol").await;

        let mut posts = Vec::new();
        for i in 0..12 {
            posts.push(service.create_post(&alice, PostDraft::new(format!("p{}", i))).await.unwrap());
        }

        // p3: 2 likes + 1 comment; p7: 2 likes; p0: 1 comment.
        service.toggle_like(&bob, posts[3].id).await.unwrap();
        service.toggle_like(&carol, posts[3].id).await.unwrap();
        service.create_comment(&bob, posts[3].id, "!").await.unwrap();
        service.toggle_like(&bob, posts[7].id).await.unwrap();
        service.toggle_like(&carol, posts[7].id).await.unwrap();
        service.create_comment(&carol, posts[0].id, "?").await.unwrap();

        let old = service.create_post(&alice, PostDraft::new("yesterday's news")).await.unwrap();
        for liker in [&bob, &carol] {
            service.toggle_like(liker, old.id).await.unwrap();
        }
        service.create_comment(&bob, old.id, "late").await.unwrap();
        service.create_comment(&carol, old.id, "later").await.unwrap();
        PostRepository::set_created_at_for_test(&service.pool, old.id, now() - TRENDING_WINDOW_SECS - 5)
            .await
            .unwrap();

        let trending = service.trending().await.unwrap();
        assert_eq!(trending.len(), 10);
        assert!(trending.iter().all(|t| t.id != old.id));

        assert_eq!(trending[0].id, posts[3].id);
        assert_eq!(trending[0].engagement, 3);
        assert_eq!(trending[1].id, posts[7].id);
        assert_eq!(trending[2].id, posts[0].id);

        // Zero-engagement ties fall back to newest id first.
        assert_eq!(trending[3].id, posts[11].id);
        assert_eq!(trending[3].engagement, 0);
    }

    #[tokio::test]
    async fn test_search_substring() {
        let service = testing::service().await;
        let alice = testing::user(&service, "alice").await;
        let malice = testing::user(&service, "malice").await;

        service.create_post(&alice, PostDraft::new("Rust is fun")).await.unwrap();
        service.create_post(&malice, PostDraft::new("rusty bikes")).await.unwrap();

        let results = service.search("Rust").await.unwrap();
        assert_eq!(results.posts.len(), 1);
        assert_eq!(results.posts[0].post.content, "Rust is fun");
        assert!(results.users.is_empty());

        let results = service.search("lice").await.unwrap();
        assert!(results.posts.is_empty());
        assert_eq!(results.users.len(), 2);
    }

    #[tokio::test]
    async fn test_search_limits() {
        let service = testing::service().await;
        for i in 0..12 {
            testing::user(&service, &format!("user{}", i)).await;
        }
        let author = testing::user(&service, "author").await;
        for i in 0..25 {
            service.create_post(&author, PostDraft::new(format!("user note {}", i))).await.unwrap();
        }

        let results = service.search("user").await.unwrap();
        assert_eq!(results.posts.len(), 20);
        assert_eq!(results.users.len(), 10);
    }
}
