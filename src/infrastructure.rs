//! Infrastructure layer for external catalog clients and supporting plumbing
//!
//! This module provides the HTTP clients for both external systems, the
//! error taxonomy, configuration, credential lookup, and logging setup.

pub mod config;
pub mod credentials;
pub mod document_store;
pub mod http_client;
pub mod logging;
pub mod markup;
pub mod storefront;
pub mod sync_error;

// Re-export commonly used items
pub use config::{AppConfig, ConfigManager};
pub use credentials::{Credential, CredentialStore, FileCredentialStore, MemoryCredentialStore};
pub use document_store::DocumentStoreClient;
pub use http_client::{HttpClient, HttpClientConfig};
pub use logging::{init_logging, init_logging_with_config};
pub use storefront::StorefrontClient;
pub use sync_error::SyncError;
