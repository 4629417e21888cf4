//! Point-in-time change detection between the two catalogs
//!
//! The detector never persists anything: every sync run recomputes the
//! changeset from the two freshly read catalogs. Output contains only
//! actionable entries (`New`, `Updated`); unchanged pairs are filtered out.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::product::CanonicalProduct;
use crate::domain::services::catalog_services::DocumentCatalog;

/// Detector verdict for one record pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Classification {
    /// No storefront counterpart exists (unlinked, or the link dangles).
    New,
    /// A linked pair whose compared fields diverged.
    Updated,
    /// A linked pair with every compared field equal.
    Unchanged,
}

/// One actionable record pair.
#[derive(Debug, Clone)]
pub struct ChangeEntry {
    pub source: CanonicalProduct,
    /// The storefront counterpart, when one was found by the link.
    pub target: Option<CanonicalProduct>,
    pub classification: Classification,
    /// Rendered plain-text description used for the comparison; carried
    /// along so an update does not have to render it a second time.
    pub description: String,
}

/// Tolerates representation drift from round-tripping numbers through string
/// serialization (the storefront stages prices as strings).
pub fn decimal_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

/// Computes the changeset between the document catalog and the storefront.
#[derive(Debug, Clone, Copy, Default)]
pub struct ChangeDetector;

impl ChangeDetector {
    /// Field-by-field divergence check for a linked pair. `description` is
    /// the rendered plain text of the document record's content; the
    /// storefront side is already normalized to plain text by its reader.
    ///
    /// Optional text fields were normalized to `""` at read time, so absent
    /// and empty compare as equal here.
    pub fn has_changed(
        &self,
        source: &CanonicalProduct,
        target: &CanonicalProduct,
        description: &str,
    ) -> bool {
        source.title != target.title
            || !decimal_eq(source.price, target.price)
            || source.inventory != target.inventory
            || source.sku != target.sku
            || source.status != target.status
            || source.category != target.category
            || source.vendor != target.vendor
            || source.tags != target.tags
            || description != target.description
    }

    /// Build the changeset: a lookup over the storefront records by their
    /// identifier, then one pass over the document records in catalog order.
    ///
    /// Records with no link are `New` without any comparison. A link whose
    /// target is missing from the storefront read means the record was
    /// deleted externally; the only safe recovery is re-creation, so it is
    /// classified `New` as well and flagged in the logs as drift.
    pub async fn detect<D>(
        &self,
        source_records: &[CanonicalProduct],
        target_records: &[CanonicalProduct],
        renderer: &D,
    ) -> Vec<ChangeEntry>
    where
        D: DocumentCatalog + ?Sized,
    {
        let by_external_id: HashMap<&str, &CanonicalProduct> = target_records
            .iter()
            .filter_map(|record| {
                record
                    .external_id
                    .as_deref()
                    .map(|external_id| (external_id, record))
            })
            .collect();

        let mut entries = Vec::new();

        for source in source_records {
            let Some(external_id) = source.external_id.as_deref() else {
                entries.push(ChangeEntry {
                    source: source.clone(),
                    target: None,
                    classification: Classification::New,
                    description: String::new(),
                });
                continue;
            };

            let Some(target) = by_external_id.get(external_id) else {
                warn!(
                    "⚠️  '{}' links to storefront record '{}' which no longer exists - treating as new (external drift)",
                    source.title, external_id
                );
                entries.push(ChangeEntry {
                    source: source.clone(),
                    target: None,
                    classification: Classification::New,
                    description: String::new(),
                });
                continue;
            };

            let description = self.render_description(source, renderer).await;

            if self.has_changed(source, target, &description) {
                debug!("🔍 '{}' diverged from storefront record '{}'", source.title, external_id);
                entries.push(ChangeEntry {
                    source: source.clone(),
                    target: Some((*target).clone()),
                    classification: Classification::Updated,
                    description,
                });
            }
        }

        entries
    }

    /// Description enrichment is soft: a failed render logs a warning and
    /// compares as empty instead of failing the record.
    async fn render_description<D>(&self, source: &CanonicalProduct, renderer: &D) -> String
    where
        D: DocumentCatalog + ?Sized,
    {
        match renderer.render_content(&source.source_id).await {
            Ok(text) => text,
            Err(error) => {
                warn!("⚠️  Could not render description for '{}': {}", source.title, error);
                String::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linked_pair() -> (CanonicalProduct, CanonicalProduct) {
        let source = CanonicalProduct {
            source_id: "s1".into(),
            external_id: Some("b1".into()),
            title: "Cup".into(),
            price: 9.99,
            inventory: 5,
            sku: "CUP-1".into(),
            ..CanonicalProduct::default()
        };
        let target = CanonicalProduct {
            external_id: Some("b1".into()),
            title: "Cup".into(),
            price: 9.99,
            inventory: 5,
            sku: "CUP-1".into(),
            ..CanonicalProduct::default()
        };
        (source, target)
    }

    #[test]
    fn equal_pair_is_unchanged() {
        let (source, target) = linked_pair();
        assert!(!ChangeDetector.has_changed(&source, &target, ""));
    }

    #[test]
    fn price_equality_tolerates_string_round_trip() {
        let parsed: f64 = "19.99".parse().unwrap();
        assert!(decimal_eq(parsed, 19.99));
        assert!(!decimal_eq(19.99, 12.99));
    }

    #[test]
    fn description_drift_is_a_change() {
        let (source, mut target) = linked_pair();
        target.description = "old text".into();
        assert!(ChangeDetector.has_changed(&source, &target, "new text"));
        assert!(!ChangeDetector.has_changed(&source, &target, "old text"));
    }
}
