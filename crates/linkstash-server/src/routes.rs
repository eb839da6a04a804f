// ABOUTME: Route definitions for the linkstash HTTP API.
// ABOUTME: Assembles all routes into a single Axum Router with shared state.

use axum::Router;
use axum::routing::{get, post, put};
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::SharedState;

/// Build the complete Axum router with all routes and shared state.
pub fn create_router(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/signup", post(api::users::signup))
        .route("/api/v1/signin", post(api::users::signin))
        .route(
            "/api/v1/content",
            get(api::content::list_content).post(api::content::create_content),
        )
        .route(
            "/api/v1/content/{id}",
            put(api::content::update_content).delete(api::content::delete_content),
        )
        .route("/api/v1/content/{id}/isPublic", post(api::share::set_visibility))
        .route("/share/{shareableId}", get(api::share::get_shared))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler. Returns 200 OK with a simple JSON body.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
