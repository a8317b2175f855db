use axum::{
    extract::State,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::crypto::SessionToken;
use crate::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub bio: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: i64,
    pub user_id: i64,
}

impl TokenResponse {
    fn new(session: SessionToken, user_id: i64) -> Self {
        Self {
            access_token: session.token,
            token_type: "bearer",
            expires_at: session.expires_at,
            user_id,
        }
    }
}

/// POST /api/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let (user, session) = state
        .service
        .register(&req.username, &req.email, &req.password, &req.bio)
        .await?;

    Ok(Json(TokenResponse::new(session, user.id)))
}

/// POST /api/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let (user, session) = state.service.login(&req.username, &req.password).await?;

    Ok(Json(TokenResponse::new(session, user.id)))
}
