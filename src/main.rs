use anyhow::Context;
use tracing::info;

use tweets_api::app::{router, AppState};
use tweets_api::config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so DATABASE_URL, JWT_SECRET, etc. can live there
    let _ = dotenvy::dotenv();
    tweets_api::init_tracing();

    let config = AppConfig::from_env().context("Invalid configuration")?;
    info!("Starting Tweets API in {:?} mode", config.environment);

    let bind_addr = config.bind_address();
    let super_admins = config.super_admins.clone();

    let state = AppState::build(config)
        .await
        .context("Failed to initialize application state")?;
    state
        .admin_service()
        .bootstrap(&super_admins)
        .await
        .context("Super-admin bootstrap failed")?;

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    info!("Tweets API listening on http://{}", bind_addr);

    axum::serve(listener, router(state.clone()))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.db.close().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
