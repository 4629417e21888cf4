//! Shared in-memory catalog fakes for orchestrator and detector tests.
#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use catalog_sync::domain::product::CanonicalProduct;
use catalog_sync::domain::services::catalog_services::{
    CommerceCatalog, DocumentCatalog, ProductPatch,
};
use catalog_sync::infrastructure::sync_error::SyncError;

/// Document catalog backed by fixed records and rendered content.
#[derive(Default)]
pub struct FakeDocumentCatalog {
    pub records: Vec<CanonicalProduct>,
    /// Rendered plain text by source id.
    pub content: HashMap<String, String>,
    /// Source ids whose content render fails.
    pub fail_render: HashSet<String>,
    /// Source ids whose link write-back fails.
    pub fail_link: HashSet<String>,
    pub fail_read: bool,
    /// Recorded `(source_id, external_id)` link writes.
    pub link_writes: Mutex<Vec<(String, String)>>,
}

impl FakeDocumentCatalog {
    pub fn with_records(records: Vec<CanonicalProduct>) -> Self {
        Self {
            records,
            ..Self::default()
        }
    }
}

#[async_trait]
impl DocumentCatalog for FakeDocumentCatalog {
    async fn read_all(&self) -> Result<Vec<CanonicalProduct>, SyncError> {
        if self.fail_read {
            return Err(SyncError::fetch("document store", "connection refused"));
        }
        Ok(self.records.clone())
    }

    async fn render_content(&self, document_id: &str) -> Result<String, SyncError> {
        if self.fail_render.contains(document_id) {
            return Err(SyncError::write("content render", "blocks unavailable"));
        }
        Ok(self.content.get(document_id).cloned().unwrap_or_default())
    }

    async fn write_link(&self, source_id: &str, external_id: &str) -> Result<(), SyncError> {
        if self.fail_link.contains(source_id) {
            return Err(SyncError::write("link write-back", "page is archived"));
        }
        self.link_writes
            .lock()
            .unwrap()
            .push((source_id.to_string(), external_id.to_string()));
        Ok(())
    }
}

/// Commerce catalog that records mutations and issues sequential ids.
#[derive(Default)]
pub struct FakeCommerceCatalog {
    pub records: Vec<CanonicalProduct>,
    /// Source ids whose create call fails.
    pub fail_create: HashSet<String>,
    /// External ids whose update call fails.
    pub fail_update: HashSet<String>,
    pub fail_read: bool,
    /// Recorded `(source_id, description)` create calls.
    pub creates: Mutex<Vec<(String, String)>>,
    /// Recorded `(external_id, patch)` update calls.
    pub updates: Mutex<Vec<(String, ProductPatch)>>,
    next_id: Mutex<u64>,
}

impl FakeCommerceCatalog {
    pub fn with_records(records: Vec<CanonicalProduct>) -> Self {
        Self {
            records,
            next_id: Mutex::new(100),
            ..Self::default()
        }
    }

    pub fn created_count(&self) -> usize {
        self.creates.lock().unwrap().len()
    }

    pub fn updated_count(&self) -> usize {
        self.updates.lock().unwrap().len()
    }
}

#[async_trait]
impl CommerceCatalog for FakeCommerceCatalog {
    async fn read_all(&self) -> Result<Vec<CanonicalProduct>, SyncError> {
        if self.fail_read {
            return Err(SyncError::fetch("storefront", "connection refused"));
        }
        Ok(self.records.clone())
    }

    async fn create(
        &self,
        product: &CanonicalProduct,
        description: &str,
    ) -> Result<String, SyncError> {
        if self.fail_create.contains(&product.source_id) {
            return Err(SyncError::write("product create", "422 unprocessable"));
        }
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let external_id = next_id.to_string();
        self.creates
            .lock()
            .unwrap()
            .push((product.source_id.clone(), description.to_string()));
        Ok(external_id)
    }

    async fn update(&self, external_id: &str, patch: &ProductPatch) -> Result<(), SyncError> {
        if self.fail_update.contains(external_id) {
            return Err(SyncError::write("product update", "500 internal"));
        }
        self.updates
            .lock()
            .unwrap()
            .push((external_id.to_string(), patch.clone()));
        Ok(())
    }
}

/// A linked record pair with identical compared fields.
pub fn linked_product(source_id: &str, external_id: &str, title: &str) -> CanonicalProduct {
    CanonicalProduct {
        source_id: source_id.to_string(),
        external_id: Some(external_id.to_string()),
        title: title.to_string(),
        price: 9.99,
        inventory: 5,
        sku: format!("{}-SKU", title.to_uppercase()),
        ..CanonicalProduct::default()
    }
}

/// The storefront-side counterpart of [`linked_product`].
pub fn target_of(source: &CanonicalProduct) -> CanonicalProduct {
    CanonicalProduct {
        source_id: String::new(),
        ..source.clone()
    }
}

/// An unlinked document record.
pub fn unlinked_product(source_id: &str, title: &str) -> CanonicalProduct {
    CanonicalProduct {
        source_id: source_id.to_string(),
        external_id: None,
        title: title.to_string(),
        ..CanonicalProduct::default()
    }
}
