pub mod auth;
pub mod middleware;
pub mod posts;
pub mod state;
pub mod users;

pub use state::AppState;

use axum::{
    Router,
    routing::{delete, get, post, put},
    middleware as axum_middleware,
};
use tower_http::{
    cors::CorsLayer,
    trace::TraceLayer,
    timeout::TimeoutLayer,
};
use std::time::Duration;
use serde::Serialize;

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.request_timeout_secs);

    let protected = Router::new()
        // Profile and graph
        .route("/api/user", delete(users::delete_account))
        .route("/api/user/update", put(users::update_profile))
        .route("/api/user/:id/follow", post(users::follow))

        // Content and engagement
        .route("/api/tweet", post(posts::create_post))
        .route("/api/comment", post(posts::create_comment))
        .route("/api/tweet/:id/like", post(posts::like))
        .route("/api/tweet/:id/bookmark", post(posts::bookmark))
        .route("/api/feed", get(posts::feed))
        .route("/api/bookmarks", get(posts::bookmarks))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        // Health check
        .route("/api/health", get(health))

        // Authentication endpoints
        .route("/api/register", post(auth::register))
        .route("/api/login", post(auth::login))

        // Public reads
        .route("/api/user/:id", get(users::get_user))
        .route("/api/user/:id/tweets", get(users::user_posts))
        .route("/api/user/:id/followers", get(users::followers))
        .route("/api/user/:id/following", get(users::following))
        .route("/api/tweets", get(posts::list_posts))
        .route("/api/tweet/:id", get(posts::get_post))
        .route("/api/trending", get(posts::trending))
        .route("/api/search", get(posts::search))

        .merge(protected)
        // Add request timeout
        .layer(TimeoutLayer::new(timeout))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> axum::Json<HealthResponse> {
    axum::Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
