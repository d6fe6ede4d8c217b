//! HTTP API server for the expense chatbot
//!
//! Routes are organized into modules:
//! - routes::upload: CSV upload and ingestion
//! - routes::chat: chat replies from the current dataset
//! - routes::summary: dataset summary (JSON)

pub mod error;
pub mod routes;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use expensebot_config::Config;
use expensebot_core::{DatasetStore, IntentResolver};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<DatasetStore>,
    pub resolver: IntentResolver,
    pub config: Config,
}

impl AppState {
    pub fn new(store: Arc<DatasetStore>) -> Self {
        let config = store.config().clone();
        Self {
            resolver: IntentResolver::new(&config.currency),
            store,
            config,
        }
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::chat::chat;
    use routes::summary::api_summary;
    use routes::upload::upload_csv;

    let body_limit = state.config.upload.max_bytes;
    let cors_enable = state.config.server.cors_enable;

    let router = Router::new()
        .route("/upload-csv", post(upload_csv))
        .route("/chat", post(chat))
        .route("/api/health", get(health_check))
        .route("/api/summary", get(api_summary))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state);

    if cors_enable {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Bind the configured address and serve until Ctrl-C
pub async fn start_server(store: Arc<DatasetStore>) -> std::io::Result<()> {
    let state = AppState::new(store);
    let addr = state.config.bind_addr();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting expensebot server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - POST /upload-csv (CSV upload)");
    log::info!("  - POST /chat (Chat)");
    log::info!("  - GET  /api/health");
    log::info!("  - GET  /api/summary (Dataset summary)");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Tests ====================
