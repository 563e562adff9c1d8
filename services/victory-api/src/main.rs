use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;

use victory_api::{create_router, sweeper, AppState, ServiceConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let config_path = parse_config_path(&args)?;

    let config = ServiceConfig::load(config_path.as_deref()).context("loading configuration")?;
    victory_core::logging::init_with_format(config.logging.format, &config.logging.level);

    let state = Arc::new(AppState::new(config.clone()).context("initializing service")?);

    let sweeper = sweeper::spawn_sweeper(
        Arc::new(state.ledger.clone()),
        Duration::from_secs(config.verification.sweep_interval_secs),
    );

    let app = create_router(state);

    let bind_addr = config.bind_addr();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;
    info!(
        addr = %bind_addr,
        provider = ?config.mail.provider,
        database = %config.storage.database_path.display(),
        "Victory API listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    sweeper.abort();
    info!("Victory API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

/// `--config <path>` if present.
fn parse_config_path(args: &[String]) -> anyhow::Result<Option<PathBuf>> {
    let mut args_iter = args.iter();
    while let Some(arg) = args_iter.next() {
        if arg == "--config" {
            return match args_iter.next() {
                Some(path) => Ok(Some(PathBuf::from(path))),
                None => Err(anyhow::anyhow!("--config was provided without a path")),
            };
        }
    }
    Ok(None)
}
