use anyhow::Result;
use restock_watcher::config::{AppConfig, LoggingConfig};
use restock_watcher::utils::logging;
use restock_watcher::Watcher;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::from_env();

    // Logging comes up even when the config is invalid so the error lands in the log file
    let logging_config = config
        .as_ref()
        .map(|c| c.logging.clone())
        .unwrap_or_else(|_| LoggingConfig::default());
    let _guard = logging::init(&logging_config)?;

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("Configuration error: {}", e);
            return Err(e.into());
        }
    };

    let mut watcher = match Watcher::from_config(&config) {
        Ok(watcher) => watcher,
        Err(e) => {
            error!("Startup failed: {}", e);
            return Err(e.into());
        }
    };

    info!("Starting restock watcher for {} products...", watcher.asins().len());

    watcher
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for shutdown signal: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    Ok(())
}
