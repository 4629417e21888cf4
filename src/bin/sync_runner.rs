//! Synchronization runner
//!
//! Minimal entry point for the excluded dashboard layer: picks a strategy
//! and a connected account from the command line, runs one synchronization
//! to completion, and prints the summary as JSON.
//!
//! Usage: sync-runner <full|smart|create> <account-id>

use tracing::{error, info};

use catalog_sync::application::run_sync;
use catalog_sync::domain::SyncStrategy;
use catalog_sync::infrastructure::config::ConfigManager;
use catalog_sync::infrastructure::credentials::FileCredentialStore;
use catalog_sync::infrastructure::logging::init_logging_with_config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let strategy = args
        .next()
        .and_then(|value| SyncStrategy::parse(&value))
        .ok_or_else(|| anyhow::anyhow!("usage: sync-runner <full|smart|create> <account-id>"))?;
    let account_id = args
        .next()
        .ok_or_else(|| anyhow::anyhow!("usage: sync-runner <full|smart|create> <account-id>"))?;

    let config = ConfigManager::new()?.load_config().await?;
    init_logging_with_config(&config.logging)?;

    info!("🚀 Sync runner starting ({})", strategy.as_str());

    let credential_store = FileCredentialStore::new()?;
    match run_sync(&config, &credential_store, strategy, &account_id).await {
        Ok(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        Err(sync_error) => {
            error!("❌ Sync aborted: {}", sync_error);
            Err(anyhow::anyhow!(sync_error))
        }
    }
}
