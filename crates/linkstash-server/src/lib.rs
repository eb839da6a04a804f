// ABOUTME: HTTP server for linkstash, providing the REST API over the store.
// ABOUTME: Axum handlers with token-gated identity resolution and sharing routes.

pub mod api;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod routes;

pub use app_state::{AppState, SharedState};
pub use config::ServerConfig;
pub use routes::create_router;
