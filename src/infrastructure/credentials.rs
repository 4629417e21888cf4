//! Credential lookup for connected storefront accounts
//!
//! The authentication handshake that obtains and refreshes tokens is an
//! external collaborator; the engine only ever reads a stored credential for
//! the account it is asked to sync. Within a run the credential is
//! read-only.

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::infrastructure::sync_error::SyncError;

/// Access credential for one connected storefront account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credential {
    #[serde(rename = "accountId")]
    pub account_id: String,
    /// Host the storefront admin API lives on.
    #[serde(rename = "shopDomain")]
    pub shop_domain: String,
    #[serde(rename = "accessToken")]
    pub access_token: String,
}

/// Narrow lookup interface; `None` means the account was never connected.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn fetch_credential(&self, account_id: &str) -> Result<Option<Credential>, SyncError>;
}

/// JSON-file-backed store: a map of account id to credential under the
/// platform data directory. Written by the excluded auth flow; read here.
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new() -> Result<Self> {
        let data_dir = dirs::data_local_dir()
            .context("Failed to get user data directory")?
            .join("catalog-sync");
        Ok(Self {
            path: data_dir.join("credentials.json"),
        })
    }

    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    async fn read_map(&self) -> Result<HashMap<String, Credential>, SyncError> {
        if !self.path.exists() {
            return Ok(HashMap::new());
        }
        let content = fs::read_to_string(&self.path).await.map_err(|error| {
            SyncError::fetch("credential store", format!("read failed: {error}"))
        })?;
        serde_json::from_str(&content).map_err(|error| {
            SyncError::fetch("credential store", format!("parse failed: {error}"))
        })
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn fetch_credential(&self, account_id: &str) -> Result<Option<Credential>, SyncError> {
        let map = self.read_map().await?;
        Ok(map.get(account_id).cloned())
    }
}

/// In-memory store for tests and embedding callers.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    credentials: HashMap<String, Credential>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, credential: Credential) {
        self.credentials
            .insert(credential.account_id.clone(), credential);
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn fetch_credential(&self, account_id: &str) -> Result<Option<Credential>, SyncError> {
        Ok(self.credentials.get(account_id).cloned())
    }
}
