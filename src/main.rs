use mimalloc::MiMalloc;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use stepform::{ConnectionManager, SqliteConnector};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &stepform::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    let target = cfg.db_target();
    info!(
        database_url = %target.as_ref().map(|t| t.url.as_str()).unwrap_or("<none>"),
        database_name = %cfg.database_name,
        connect_timeout_secs = cfg.connect_timeout_secs,
        loglevel = %cfg.loglevel
    );

    // Connects lazily on the first submission.
    let connection = ConnectionManager::spawn(target, Arc::new(SqliteConnector)).await?;
    if !connection.is_configured() {
        warn!("DATABASE_URL is not set; submissions will fail until it is configured");
    }

    let state = stepform::router::StepformState::new(connection);
    let app = stepform::router::stepform_router(state);

    let listener = stepform::server::bind_with_fallback(cfg.host, cfg.port).await?;
    let addr = listener.local_addr()?;
    info!("Server running at http://{}", addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
