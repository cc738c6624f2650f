// Public API for integration tests and potential library usage

pub mod api;
pub mod autosave;
pub mod config;
pub mod i18n;
pub mod llm;
pub mod protocol;
pub mod state;
pub mod types;
pub mod words;
pub mod ws;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use state::AppState;

/// HTTP and WebSocket routes for a session. Unknown paths are served from `static_dir`.
pub fn router(state: Arc<AppState>, static_dir: &str) -> Router {
    Router::new()
        .route("/ws", get(ws::ws_handler))
        .route("/api/config", get(api::get_config).post(api::set_config))
        .route("/api/categories", get(api::list_categories))
        .route("/api/generate-words", post(api::generate_words))
        .fallback_service(ServeDir::new(static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
