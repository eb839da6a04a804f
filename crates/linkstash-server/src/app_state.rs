// ABOUTME: Shared application state for the linkstash HTTP server.
// ABOUTME: Bundles the SQLite store and the startup configuration.

use std::sync::Arc;

use linkstash_store::Store;
use tokio::sync::Mutex;

use crate::config::ServerConfig;

/// Shared application state accessible by all Axum handlers. The store
/// sits behind an async mutex; SQLite serializes writers anyway, and
/// handlers hold the lock only for a single statement or transaction.
pub struct AppState {
    pub store: Mutex<Store>,
    pub config: ServerConfig,
}

/// Type alias for the Arc-wrapped state used with Axum's State extractor.
pub type SharedState = Arc<AppState>;

impl AppState {
    /// Create a new AppState from an opened store and loaded config.
    pub fn new(store: Store, config: ServerConfig) -> Self {
        Self {
            store: Mutex::new(store),
            config,
        }
    }
}
