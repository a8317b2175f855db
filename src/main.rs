use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use microblog::{
    api::{create_router, AppState},
    config::Config,
    db,
    error::AppError,
    service::Microblog,
};

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,microblog=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting microblog server v{}...", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let config = Arc::new(Config::from_env()?);
    tracing::info!("Configuration loaded");

    // Connect and run migrations
    let pool = db::connect(&config).await?;
    tracing::info!("Database ready: {}", config.database_url);

    let service = Microblog::from_config(pool, &config);

    // Sweep once at startup; afterwards listing posts sweeps lazily.
    match service.sweep_expired().await {
        Ok(removed) => tracing::debug!(removed, "Startup sweep finished"),
        Err(e) => tracing::error!("Startup sweep failed: {}", e),
    }

    let state = AppState {
        service,
        config: config.clone(),
    };

    // Build router
    let app = create_router(state);

    // Bind and serve
    let addr = config.server_address();
    tracing::info!("Server listening on http://{}", addr);
    tracing::info!("Health check: http://{}/api/health", addr);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::Internal(format!("Failed to bind to {}: {}", addr, e)))?;

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Internal(format!("Server error: {}", e)))?;

    Ok(())
}
