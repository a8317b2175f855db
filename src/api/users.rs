use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde::Serialize;

use crate::api::state::AppState;
use crate::db::{Page, PostSummary, User, UserProfile};
use crate::error::AppError;
use crate::service::ProfileUpdate;

#[derive(Debug, Serialize)]
pub struct FollowResponse {
    pub message: &'static str,
    pub following: bool,
}

/// GET /api/user/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<UserProfile>, AppError> {
    Ok(Json(state.service.get_user(user_id).await?))
}

/// GET /api/user/:id/tweets
pub async fn user_posts(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
    Query(page): Query<Page>,
) -> Result<Json<Vec<PostSummary>>, AppError> {
    Ok(Json(state.service.user_posts(user_id, page).await?))
}

/// GET /api/user/:id/followers
pub async fn followers(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.service.followers_of(user_id).await?))
}

/// GET /api/user/:id/following
pub async fn following(
    State(state): State<AppState>,
    Path(user_id): Path<i64>,
) -> Result<Json<Vec<User>>, AppError> {
    Ok(Json(state.service.following_of(user_id).await?))
}

/// PUT /api/user/update (requires auth)
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<User>, AppError> {
    Ok(Json(state.service.update_profile(&user, update).await?))
}

/// DELETE /api/user (requires auth)
pub async fn delete_account(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
) -> Result<Json<serde_json::Value>, AppError> {
    state.service.delete_account(&user).await?;

    Ok(Json(serde_json::json!({"success": true})))
}

/// POST /api/user/:id/follow (requires auth)
pub async fn follow(
    State(state): State<AppState>,
    Extension(user): Extension<User>,
    Path(target_id): Path<i64>,
) -> Result<Json<FollowResponse>, AppError> {
    let following = state.service.follow(&user, target_id).await?;

    Ok(Json(FollowResponse {
        message: if following { "Following user" } else { "Unfollowed user" },
        following,
    }))
}
