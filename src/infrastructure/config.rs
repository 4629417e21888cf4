//! Configuration infrastructure
//!
//! Contains configuration loading and management for the synchronization
//! engine. Settings are stored as a JSON file under the platform data
//! directory and created with defaults on first use.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{info, warn};

/// Complete application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Source A: the document database that is the writer of record.
    pub document_store: DocumentStoreConfig,

    /// Source B: the commerce storefront receiving mutations.
    pub storefront: StorefrontConfig,

    /// Engine tuning (pagination caps, timeouts, rate limits).
    pub sync: SyncTuningConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,
}

/// Document-store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentStoreConfig {
    /// API base, e.g. `https://api.document-store.example/v1`.
    pub api_base: String,

    /// Identifier of the database holding the product records.
    pub database_id: String,

    /// Name of the environment variable carrying the API key. The key
    /// itself never lives in the config file.
    pub api_key_env: String,
}

impl Default for DocumentStoreConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::DOCUMENT_STORE_API_BASE.to_string(),
            database_id: String::new(),
            api_key_env: defaults::DOCUMENT_STORE_API_KEY_ENV.to_string(),
        }
    }
}

/// Storefront connection settings. The shop host itself comes from the
/// per-account credential, not from here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorefrontConfig {
    /// Admin API version segment, e.g. `2024-01`.
    pub api_version: String,

    /// Records requested per catalog page.
    pub page_size: u32,
}

impl StorefrontConfig {
    /// Admin API base for a connected shop.
    pub fn api_base_for(&self, shop_domain: &str) -> String {
        format!("https://{}/admin/api/{}", shop_domain, self.api_version)
    }
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            api_version: defaults::STOREFRONT_API_VERSION.to_string(),
            page_size: defaults::STOREFRONT_PAGE_SIZE,
        }
    }
}

/// Engine tuning settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncTuningConfig {
    /// Safety valve: abort a catalog read that pages past this bound
    /// instead of looping on a misbehaving API.
    pub max_catalog_pages: u32,

    /// Per-request timeout in seconds.
    pub request_timeout_seconds: u64,

    /// Outbound request budget per second, per catalog.
    pub max_requests_per_second: u32,
}

impl Default for SyncTuningConfig {
    fn default() -> Self {
        Self {
            max_catalog_pages: defaults::MAX_CATALOG_PAGES,
            request_timeout_seconds: defaults::REQUEST_TIMEOUT_SECONDS,
            max_requests_per_second: defaults::MAX_REQUESTS_PER_SECOND,
        }
    }
}

/// Logging configuration settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: "error", "warn", "info", "debug", "trace".
    pub level: String,

    /// Enable rolling file output next to the console output.
    pub file_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_output: false,
        }
    }
}

/// Loads and persists the application configuration.
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Manager rooted at the platform data directory.
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join("catalog-sync");
        Ok(Self {
            config_path: data_dir.join("config.json"),
        })
    }

    /// Manager for an explicit path (tests, containers).
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Load configuration from file, creating defaults if it doesn't exist.
    pub async fn load_config(&self) -> Result<AppConfig> {
        if !self.config_path.exists() {
            info!("Configuration file not found, creating default: {:?}", self.config_path);
            let default_config = AppConfig::default();
            self.save_config(&default_config).await?;
            return Ok(default_config);
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .context("Failed to read configuration file")?;

        match serde_json::from_str::<AppConfig>(&content) {
            Ok(config) => {
                info!("Loaded configuration from: {:?}", self.config_path);
                Ok(config)
            }
            Err(parse_error) => {
                warn!("⚠️  Configuration file unreadable: {}", parse_error);
                warn!("⚠️  Resetting to default configuration");

                let backup_path = self.config_path.with_extension("json.corrupted");
                if let Err(error) = fs::copy(&self.config_path, &backup_path).await {
                    warn!("Failed to back up corrupted config: {}", error);
                } else {
                    info!("Backed up corrupted config to: {:?}", backup_path);
                }

                let default_config = AppConfig::default();
                self.save_config(&default_config)
                    .await
                    .context("Failed to save default configuration")?;
                Ok(default_config)
            }
        }
    }

    /// Save configuration to file.
    pub async fn save_config(&self, config: &AppConfig) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .await
                .context("Failed to create config directory")?;
        }

        let content =
            serde_json::to_string_pretty(config).context("Failed to serialize configuration")?;

        fs::write(&self.config_path, content)
            .await
            .context("Failed to write configuration file")?;

        info!("Saved configuration to: {:?}", self.config_path);
        Ok(())
    }

    pub fn config_path(&self) -> &PathBuf {
        &self.config_path
    }
}

/// Default configuration values.
pub mod defaults {
    /// Default document-store API base.
    pub const DOCUMENT_STORE_API_BASE: &str = "https://api.document-store.example/v1";

    /// Environment variable holding the document-store API key.
    pub const DOCUMENT_STORE_API_KEY_ENV: &str = "DOCUMENT_STORE_API_KEY";

    /// Default storefront admin API version.
    pub const STOREFRONT_API_VERSION: &str = "2024-01";

    /// Default records per storefront catalog page (the API maximum).
    pub const STOREFRONT_PAGE_SIZE: u32 = 250;

    /// Default cap on pages per catalog read.
    pub const MAX_CATALOG_PAGES: u32 = 500;

    /// Default per-request timeout in seconds.
    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    /// Default outbound requests per second, per catalog.
    pub const MAX_REQUESTS_PER_SECOND: u32 = 4;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_creates_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let config = manager.load_config().await.unwrap();
        assert_eq!(config.sync.max_catalog_pages, defaults::MAX_CATALOG_PAGES);
        assert!(manager.config_path().exists());
    }

    #[tokio::test]
    async fn save_and_load_round_trip() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.json"));

        let mut config = AppConfig::default();
        config.document_store.database_id = "db-123".to_string();
        config.sync.max_catalog_pages = 7;
        manager.save_config(&config).await.unwrap();

        let loaded = manager.load_config().await.unwrap();
        assert_eq!(loaded.document_store.database_id, "db-123");
        assert_eq!(loaded.sync.max_catalog_pages, 7);
    }

    #[tokio::test]
    async fn corrupted_file_resets_to_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        let manager = ConfigManager::with_path(path.clone());
        let config = manager.load_config().await.unwrap();
        assert_eq!(config.storefront.page_size, defaults::STOREFRONT_PAGE_SIZE);
        assert!(path.with_extension("json.corrupted").exists());
    }

    #[test]
    fn storefront_api_base_includes_shop_and_version() {
        let config = StorefrontConfig::default();
        assert_eq!(
            config.api_base_for("shop-1.example.com"),
            format!("https://shop-1.example.com/admin/api/{}", defaults::STOREFRONT_API_VERSION)
        );
    }
}
