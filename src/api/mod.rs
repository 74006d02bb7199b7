pub mod accounts;
pub mod chat;
pub mod sessions;
pub mod state;

pub use state::AppState;

use std::time::Duration;

use axum::{
    routing::{delete, get, post},
    Router,
};
use serde::Serialize;
use tower_http::{
    cors::CorsLayer,
    services::{ServeDir, ServeFile},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

pub fn create_router(state: AppState) -> Router {
    // Unrouted paths fall through to the static frontend, with index.html as
    // the default document.
    let index = std::path::Path::new(&state.config.static_dir).join("index.html");
    let assets = ServeDir::new(&state.config.static_dir)
        .not_found_service(ServeFile::new(index));

    Router::new()
        // Health check
        .route("/api/health", get(health))
        // Accounts
        .route("/api/register", post(accounts::register))
        .route("/api/login", post(accounts::login))
        // Chat sessions
        .route(
            "/api/sessions",
            get(sessions::list_sessions).post(sessions::create_session),
        )
        .route(
            "/api/sessions/:session_id",
            delete(sessions::delete_session).put(sessions::rename_session),
        )
        .route(
            "/api/sessions/:session_id/update-title",
            post(sessions::update_title),
        )
        // Conversation
        .route("/api/messages/:session_id", get(chat::list_messages))
        .route("/api/chat", post(chat::chat))
        .route("/api/upload", post(chat::upload))
        // Static frontend passthrough
        .fallback_service(assets)
        // Request timeout covers the completion backend round-trip
        .layer(TimeoutLayer::new(Duration::from_secs(
            state.config.request_timeout_secs,
        )))
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
