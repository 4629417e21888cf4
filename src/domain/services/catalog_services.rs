//! Catalog service seams
//!
//! Trait definitions for the two external catalogs the engine talks to. The
//! orchestrator and the change detector only ever see these interfaces;
//! concrete HTTP clients live in the infrastructure layer and are injected
//! explicitly, never reached through process-wide state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::product::{CanonicalProduct, ProductStatus};
use crate::infrastructure::sync_error::SyncError;

/// Partial field set for a storefront update. Only populated fields are
/// written; `None` leaves the target field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductPatch {
    pub title: Option<String>,
    pub price: Option<f64>,
    pub inventory: Option<i64>,
    pub sku: Option<String>,
    pub status: Option<ProductStatus>,
    pub category: Option<String>,
    pub vendor: Option<String>,
    pub tags: Option<String>,
    pub shipping_weight: Option<f64>,
    pub description: Option<String>,
}

impl ProductPatch {
    /// Patch carrying every syncable field of a canonical record, with the
    /// description attached only when one was rendered.
    pub fn from_product(product: &CanonicalProduct, description: Option<String>) -> Self {
        Self {
            title: Some(product.title.clone()),
            price: Some(product.price),
            inventory: Some(product.inventory),
            sku: Some(product.sku.clone()),
            status: Some(product.status),
            category: Some(product.category.clone()),
            vendor: Some(product.vendor.clone()),
            tags: Some(product.tags.clone()),
            shipping_weight: Some(product.shipping_weight),
            description,
        }
    }

    /// Whether any variant-level field (nested sub-resource on the
    /// storefront) is populated.
    pub fn touches_variant(&self) -> bool {
        self.price.is_some()
            || self.inventory.is_some()
            || self.sku.is_some()
            || self.shipping_weight.is_some()
    }

    /// Whether any top-level product field is populated.
    pub fn touches_product(&self) -> bool {
        self.title.is_some()
            || self.status.is_some()
            || self.category.is_some()
            || self.vendor.is_some()
            || self.tags.is_some()
            || self.description.is_some()
    }
}

/// Source A: the document-style database that is the writer of record.
#[async_trait]
pub trait DocumentCatalog: Send + Sync {
    /// Read the full catalog, transparently following pagination. A failed
    /// page aborts the whole read; there is no partial-catalog mode.
    async fn read_all(&self) -> Result<Vec<CanonicalProduct>, SyncError>;

    /// Render a document's rich content as plain text for description
    /// comparison and storefront bodies.
    async fn render_content(&self, document_id: &str) -> Result<String, SyncError>;

    /// Persist a newly issued storefront identifier onto the document
    /// record, establishing the link.
    async fn write_link(&self, source_id: &str, external_id: &str) -> Result<(), SyncError>;
}

/// Source B: the commerce storefront receiving mutations.
#[async_trait]
pub trait CommerceCatalog: Send + Sync {
    /// Read the full catalog, transparently following pagination.
    async fn read_all(&self) -> Result<Vec<CanonicalProduct>, SyncError>;

    /// Create a storefront record and return the identifier the storefront
    /// issued for it. The engine never invents identifiers.
    async fn create(
        &self,
        product: &CanonicalProduct,
        description: &str,
    ) -> Result<String, SyncError>;

    /// Apply a partial update to an existing storefront record.
    async fn update(&self, external_id: &str, patch: &ProductPatch) -> Result<(), SyncError>;
}
