//! sixten-api - HTTP API server for sixten
//!
//! The router is built here so tests can drive it without a listener;
//! `main.rs` adds logging, CORS, request IDs and the body limit.

pub mod config;
pub mod error;
pub mod handlers;
pub mod services;
pub mod state;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{delete, get, patch, post, put},
    Json, Router,
};

pub use config::{AppConfig, StorageBackend};
pub use error::ApiError;
pub use services::{IntakeOutcome, IntakeRequest, TriageService};
pub use state::AppState;

use handlers::{analyze, content, email, events, links, tags};

/// All routes, with state attached.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        // Proxies
        .route("/api/analyze", post(analyze::analyze))
        .route("/api/fetch-content", post(content::fetch_content))
        .route("/api/email-webhook", post(email::email_webhook))
        // Links
        .route("/api/links", get(links::list_links).post(links::create_link))
        .route(
            "/api/links/:id",
            get(links::get_link).delete(links::delete_link),
        )
        .route("/api/links/:id/status", patch(links::update_link_status))
        .route(
            "/api/links/:id/tags",
            put(links::replace_tags).post(links::add_tag),
        )
        .route("/api/links/:id/tags/:tag_id", delete(links::remove_tag))
        // Tags
        .route("/api/tags", get(tags::suggest_tags))
        .route(
            "/api/favorite-tags",
            get(tags::list_favorite_tags).post(tags::add_favorite_tag),
        )
        .route("/api/favorite-tags/:name", delete(tags::remove_favorite_tag))
        // Stats and events
        .route("/api/stats", get(links::stats))
        .route("/api/events", get(events::sse_events))
        .with_state(state)
}

async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
        "analyzer": {
            "model": state.analyzer.model_name(),
            "configured": state.analyzer.is_configured(),
        },
    }))
}
