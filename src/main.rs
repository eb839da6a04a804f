// ABOUTME: Entry point for the linkstash binary.
// ABOUTME: Loads environment config, opens the store, and serves the HTTP API.

use std::sync::Arc;

use anyhow::Context;
use linkstash_server::{AppState, ServerConfig, create_router};
use linkstash_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "linkstash=debug,tower_http=debug".parse().unwrap()),
        )
        .init();

    let config = ServerConfig::from_env().context("loading configuration")?;

    std::fs::create_dir_all(&config.home)
        .with_context(|| format!("creating data directory {}", config.home.display()))?;
    let store = Store::open(&config.home.join("linkstash.db")).context("opening store")?;

    let bind = config.bind;
    let state = Arc::new(AppState::new(store, config));
    let app = create_router(state);

    tracing::info!("linkstash listening on {}", bind);
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .context("binding listener")?;
    axum::serve(listener, app).await.context("serving")?;

    Ok(())
}
