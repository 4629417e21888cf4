//! Logging system configuration and initialization
//!
//! Console output is always on; rolling file output under a `logs/`
//! directory next to the executable can be enabled through configuration.
//! The non-blocking writer guards must outlive the process, so they are
//! parked in a global.

use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use tracing::info;
use tracing_appender::{non_blocking, rolling};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

pub use crate::infrastructure::config::LoggingConfig;

// Global guard to keep the log file writer alive
lazy_static! {
    static ref LOG_GUARDS: Mutex<Vec<non_blocking::WorkerGuard>> = Mutex::new(Vec::new());
}

/// Get the log directory relative to the executable location.
pub fn get_log_directory() -> PathBuf {
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|path| path.parent().map(|parent| parent.to_path_buf()))
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default());

    exe_dir.join("logs")
}

/// Initialize the logging system with default configuration.
pub fn init_logging() -> Result<()> {
    init_logging_with_config(&LoggingConfig::default())
}

/// Initialize the logging system. `RUST_LOG` overrides the configured
/// level when set.
pub fn init_logging_with_config(config: &LoggingConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.level.clone()));

    let console_layer = fmt::layer().with_target(false);

    if config.file_output {
        let log_dir = get_log_directory();
        std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

        let file_appender = rolling::daily(&log_dir, "catalog-sync.log");
        let (file_writer, guard) = non_blocking(file_appender);
        LOG_GUARDS
            .lock()
            .expect("log guard mutex poisoned")
            .push(guard);

        Registry::default()
            .with(filter)
            .with(console_layer)
            .with(fmt::layer().with_ansi(false).with_writer(file_writer))
            .try_init()
            .context("Failed to initialize logging")?;

        info!("Logging to {}", log_dir.display());
    } else {
        Registry::default()
            .with(filter)
            .with(console_layer)
            .try_init()
            .context("Failed to initialize logging")?;
    }

    Ok(())
}
