//! Axum router configuration with middleware.
//!
//! Routes live under `/api/`; `/health` sits outside and needs no key.
//! Middleware: CORS for the configured origins, request tracing.

use axum::Router;
use axum::http::HeaderValue;
use axum::routing::{get, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.server.cors_origins);

    let api_routes = Router::new()
        // Memory
        .route("/memory/store", post(handlers::memory::store_memory))
        .route("/memory/search", get(handlers::memory::search_memory))
        .route("/memory/timeline", get(handlers::memory::memory_timeline))
        // System prompts
        .route(
            "/system/prompts",
            get(handlers::prompt::list_prompts).post(handlers::prompt::create_prompt),
        )
        .route(
            "/system/prompts/{id}",
            get(handlers::prompt::get_prompt)
                .put(handlers::prompt::update_prompt)
                .delete(handlers::prompt::delete_prompt),
        )
        // Chat
        .route("/chat", post(handlers::chat::chat))
        .route("/chat/providers", get(handlers::chat::list_providers))
        .route("/chat/models", get(handlers::chat::list_models));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(health_check))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}

/// GET /health - Liveness check, no auth required.
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
