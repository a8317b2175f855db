use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::db::{Comment, Page, Post, PostDetail, PostSummary, SearchResults, TrendingPost, User};
use crate::error::AppError;
use crate::service::PostDraft;

#[derive(Debug, Deserialize)]
pub struct CommentRequest {
    pub content: String,
    pub tweet_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub message: &'static str,
    pub active: bool,
}

/// POST /api/tweet (requires auth)
pub async fn create_post(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(draft): Json<PostDraft>,
) -> Result<Json<Post>, AppError> {
    Ok(Json(state.service.create_post(&user, draft).await?))
}

/// GET /api/tweets
pub async fn list_posts(
    State(state): State<AppState>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    Ok(Json(state.service.list_posts(page).await?))
}

/// GET /api/tweet/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<PostDetail>, AppError> {
    Ok(Json(state.service.get_post(post_id).await?))
}

/// POST /api/comment (requires auth)
pub async fn create_comment(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(req): Json<CommentRequest>,
) -> Result<Json<Comment>, AppError> {
    Ok(Json(
        state
            .service
            .create_comment(&user, req.tweet_id, &req.content)
            .await?,
    ))
}

/// POST /api/tweet/:id/like (requires auth)
pub async fn like(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(post_id): Path<i64>,
) -> Result<Json<ToggleResponse>, AppError> {
    let liked = state.service.toggle_like(&user, post_id).await?;

    Ok(Json(ToggleResponse {
        message: if liked { "Tweet liked" } else { "Tweet unliked" },
        active: liked,
    }))
}

/// POST /api/tweet/:id/bookmark (requires auth)
pub async fn bookmark(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(post_id): Path<i64>,
) -> Result<Json<ToggleResponse>, AppError> {
    let bookmarked = state.service.toggle_bookmark(&user, post_id).await?;

    Ok(Json(ToggleResponse {
        message: if bookmarked { "Tweet bookmarked" } else { "Bookmark removed" },
        active: bookmarked,
    }))
}

/// GET /api/feed (requires auth)
pub async fn feed(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    Ok(Json(state.service.feed_for(&user, page).await?))
}

/// GET /api/bookmarks (requires auth)
pub async fn bookmarks(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    Ok(Json(state.service.bookmarks_of(&user, page).await?))
}

/// GET /api/trending
pub async fn trending(
    State(state): State<AppState>,
) -> Result<Json<Vec<TrendingPost>>, AppError> {
    Ok(Json(state.service.trending().await?))
}

/// GET /api/search?q=
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SearchResults>, AppError> {
    Ok(Json(state.service.search(&query.q).await?))
}
