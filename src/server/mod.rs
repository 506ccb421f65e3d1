//! HTTP server bootstrap and background maintenance

mod db;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::build_router;
use crate::config::EcoConfig;
use crate::state::{AppState, SharedState};

// Re-export database utilities
pub use db::{create_pool, run_migrations, schema_version};

/// Run the HTTP server until Ctrl-C.
pub async fn serve(config: EcoConfig) -> Result<()> {
    info!("Connecting to database: {}", config.database_url);
    let pool = create_pool(&config.database_url, config.sqlite_max_connections).await?;
    run_migrations(&pool).await?;
    info!("Database ready (schema version {})", schema_version(&pool).await?);

    let reap_interval = Duration::from_secs(config.session_reap_interval.max(1));
    let bind_address = config.bind_address();
    let state: SharedState = Arc::new(AppState::new(pool, config));

    if !state.config.identity_enabled() {
        warn!("ECO_IDENTITY_SECRET is not set; sign-in is disabled");
    }

    let reaper = spawn_session_reaper(state.clone(), reap_interval);
    info!("Session reaper started - running every {} seconds", reap_interval.as_secs());

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;
    info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    reaper.abort();
    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Periodically delete expired sessions.
pub fn spawn_session_reaper(state: SharedState, interval: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        loop {
            ticker.tick().await;
            match state.user_store.purge_expired_sessions().await {
                Ok(0) => {}
                Ok(removed) => info!(removed, "Purged expired sessions"),
                Err(err) => warn!("session purge failed: {err:#}"),
            }
        }
    })
}
