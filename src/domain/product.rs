//! Canonical product model shared by both catalog readers
//!
//! Every source-specific record is normalized into `CanonicalProduct` before
//! it reaches the change detector or the orchestrator, so the rest of the
//! system never sees either API's vocabulary.

use serde::{Deserialize, Serialize};

/// Publication status in the canonical vocabulary.
///
/// The storefront speaks `active`/`draft`; mapping lives here so neither the
/// detector nor the orchestrator has to know about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProductStatus {
    Active,
    Draft,
}

impl ProductStatus {
    /// Storefront wire representation.
    pub fn as_storefront_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Draft => "draft",
        }
    }

    /// Parse the storefront wire representation. Anything unknown maps to
    /// `Draft`, the defensive default for missing fields.
    pub fn from_storefront_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Draft
        }
    }

    /// Parse the document-store select value ("Active" / "Draft").
    pub fn from_document_str(value: &str) -> Self {
        if value.eq_ignore_ascii_case("active") {
            Self::Active
        } else {
            Self::Draft
        }
    }
}

impl Default for ProductStatus {
    fn default() -> Self {
        Self::Draft
    }
}

/// The unified internal representation of a product, independent of source
/// schema.
///
/// Missing optional fields are normalized to defined defaults (`0` for
/// numbers, `""` for text, `Draft` for status) by the readers. The one
/// exception is `external_id`: its absence means "not linked to a storefront
/// record yet" and must never be collapsed into an empty string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProduct {
    /// Document-store identifier. Always present for records read from the
    /// document store; empty for records normalized from the storefront,
    /// which does not know document identifiers.
    #[serde(rename = "sourceId")]
    pub source_id: String,
    /// Storefront identifier. `None` means the record is unlinked and is
    /// only eligible for creation, never for update.
    #[serde(rename = "externalId")]
    pub external_id: Option<String>,
    pub title: String,
    pub price: f64,
    pub inventory: i64,
    pub sku: String,
    pub status: ProductStatus,
    pub category: String,
    pub vendor: String,
    pub tags: String,
    #[serde(rename = "imageUrl")]
    pub image_url: String,
    #[serde(rename = "shippingWeight")]
    pub shipping_weight: f64,
    /// Plain-text description. Not populated by every reader; the detector
    /// enriches document-store records with rendered page content on demand.
    pub description: String,
}

impl CanonicalProduct {
    /// Whether this record has a storefront counterpart.
    pub fn is_linked(&self) -> bool {
        self.external_id.is_some()
    }
}

impl Default for CanonicalProduct {
    fn default() -> Self {
        Self {
            source_id: String::new(),
            external_id: None,
            title: String::new(),
            price: 0.0,
            inventory: 0,
            sku: String::new(),
            status: ProductStatus::Draft,
            category: String::new(),
            vendor: String::new(),
            tags: String::new(),
            image_url: String::new(),
            shipping_weight: 0.0,
            description: String::new(),
        }
    }
}
