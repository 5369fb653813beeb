use std::sync::Arc;

use anyhow::Context;
use flashgen::api::{self, AppState};
use flashgen::config::AppConfig;
use flashgen::database::Database;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::load();
    let data_dir = config.data_dir();

    let _log_guard = flashgen::core::logging::init(&data_dir);
    log::info!("{} v{} starting", flashgen::NAME, flashgen::VERSION);

    let db = Database::new(&data_dir)
        .await
        .with_context(|| format!("opening database in {}", data_dir.display()))?;
    log::info!("Database ready at {}", db.path().display());

    let state = Arc::new(AppState::from_config(&config, db).context("building model client")?);

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("binding {}", addr))?;

    api::serve(listener, state, shutdown_signal()).await?;

    log::info!("Shut down cleanly");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    log::info!("Shutdown signal received");
}
