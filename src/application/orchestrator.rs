//! Sync orchestration use cases
//!
//! Drives one of the three synchronization strategies over the injected
//! catalog clients. Records are processed strictly sequentially - both
//! external APIs rate limit, and the result accumulator stays free of
//! coordination concerns. A fatal error (unreadable catalog, missing
//! credential) aborts before the loop; everything else is caught at the
//! per-record boundary and the batch continues.

use tracing::{info, warn};

use crate::domain::change_detection::{ChangeDetector, Classification};
use crate::domain::product::CanonicalProduct;
use crate::domain::services::catalog_services::{CommerceCatalog, DocumentCatalog, ProductPatch};
use crate::domain::sync::{RecordOutcome, SkipReason, SyncResult, SyncStrategy};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::credentials::CredentialStore;
use crate::infrastructure::document_store::DocumentStoreClient;
use crate::infrastructure::storefront::StorefrontClient;
use crate::infrastructure::sync_error::SyncError;

/// Orchestrates one synchronization run over a pair of catalog clients.
pub struct SyncOrchestrator<D, C>
where
    D: DocumentCatalog,
    C: CommerceCatalog,
{
    document_store: D,
    storefront: C,
    detector: ChangeDetector,
}

impl<D, C> SyncOrchestrator<D, C>
where
    D: DocumentCatalog,
    C: CommerceCatalog,
{
    pub fn new(document_store: D, storefront: C) -> Self {
        Self {
            document_store,
            storefront,
            detector: ChangeDetector,
        }
    }

    pub fn document_store(&self) -> &D {
        &self.document_store
    }

    pub fn storefront(&self) -> &C {
        &self.storefront
    }

    /// Run the selected strategy to completion and return the summary.
    pub async fn run(&self, strategy: SyncStrategy) -> Result<SyncResult, SyncError> {
        match strategy {
            SyncStrategy::Full => self.run_full().await,
            SyncStrategy::SmartIncremental => self.run_smart_incremental().await,
            SyncStrategy::CreateOnly => self.run_create_only().await,
        }
    }

    /// Push every linked record to the storefront, changed or not. Bulk
    /// re-assertion of document-store state; never creates.
    async fn run_full(&self) -> Result<SyncResult, SyncError> {
        info!("🔄 Starting full sync");

        let records = self.document_store.read_all().await?;

        let mut result = SyncResult::new(SyncStrategy::Full);
        result.total_considered = records.len();

        for record in &records {
            let outcome = self.push_record(record, None).await;
            log_push_outcome(record, &outcome);
            result.record(&record.source_id, &record.title, &outcome);
        }

        result.finish();
        log_summary(&result);
        Ok(result)
    }

    /// Read both catalogs, detect divergence, and push only the linked
    /// records whose content actually changed.
    async fn run_smart_incremental(&self) -> Result<SyncResult, SyncError> {
        info!("🔄 Starting smart incremental sync");

        info!("📥 Fetching products from the document store...");
        let source_records = self.document_store.read_all().await?;

        info!("📥 Fetching products from the storefront...");
        let target_records = self.storefront.read_all().await?;

        info!("🔍 Detecting changes...");
        let changes = self
            .detector
            .detect(&source_records, &target_records, &self.document_store)
            .await;
        let updates: Vec<_> = changes
            .into_iter()
            .filter(|entry| entry.classification == Classification::Updated)
            .collect();

        info!(
            "📊 Found {} changed products out of {} total",
            updates.len(),
            source_records.len()
        );

        let mut result = SyncResult::new(SyncStrategy::SmartIncremental);
        result.total_considered = updates.len();

        for entry in &updates {
            let outcome = self
                .push_record(&entry.source, Some(entry.description.clone()))
                .await;
            log_push_outcome(&entry.source, &outcome);
            result.record(&entry.source.source_id, &entry.source.title, &outcome);
        }

        result.finish();
        log_summary(&result);
        Ok(result)
    }

    /// Create storefront records for every unlinked document record, then
    /// persist the issued identifier back onto the source record.
    async fn run_create_only(&self) -> Result<SyncResult, SyncError> {
        info!("🆕 Starting new-products sync");

        let records = self.document_store.read_all().await?;
        let candidates: Vec<_> = records.iter().filter(|record| !record.is_linked()).collect();

        info!("📊 Found {} new products to create in the storefront", candidates.len());

        let mut result = SyncResult::new(SyncStrategy::CreateOnly);
        result.total_considered = candidates.len();

        for record in candidates {
            let outcome = self.create_record(record).await;
            match &outcome {
                RecordOutcome::Created(external_id) => {
                    info!("✅ Created and linked: {} -> {}", record.title, external_id);
                }
                RecordOutcome::Failed(error) => {
                    warn!("❌ Failed to create: {}: {}", record.title, error);
                }
                _ => {}
            }
            result.record(&record.source_id, &record.title, &outcome);
        }

        result.finish();
        log_summary(&result);
        Ok(result)
    }

    /// Shared update path for Full and SmartIncremental. Updating requires
    /// a link; an unlinked record is intentionally not attempted.
    async fn push_record(
        &self,
        record: &CanonicalProduct,
        description: Option<String>,
    ) -> RecordOutcome {
        let Some(external_id) = record.external_id.as_deref() else {
            return RecordOutcome::Skipped(SkipReason::NotLinked);
        };

        let patch = ProductPatch::from_product(record, description);
        match self.storefront.update(external_id, &patch).await {
            Ok(()) => RecordOutcome::Updated,
            Err(error) => RecordOutcome::Failed(error),
        }
    }

    /// Creation with idempotent link-back. "Has no external id" is the only
    /// gate: a record whose earlier link write-back failed will be created
    /// again rather than silently reconciled (the failure is reported with
    /// its own kind so the duplicate risk is visible to the caller).
    async fn create_record(&self, record: &CanonicalProduct) -> RecordOutcome {
        info!("🆕 Creating new product: {}", record.title);

        // Description rendering is soft: a failure falls back to an empty
        // body instead of losing the record.
        let description = match self.document_store.render_content(&record.source_id).await {
            Ok(text) => text,
            Err(error) => {
                warn!("⚠️  Could not render description for '{}': {}", record.title, error);
                String::new()
            }
        };

        let external_id = match self.storefront.create(record, &description).await {
            Ok(external_id) => external_id,
            Err(error) => return RecordOutcome::Failed(error),
        };

        match self
            .document_store
            .write_link(&record.source_id, &external_id)
            .await
        {
            Ok(()) => RecordOutcome::Created(external_id),
            Err(error) => RecordOutcome::Failed(SyncError::LinkInconsistency {
                source_id: record.source_id.clone(),
                external_id,
                message: error.to_string(),
            }),
        }
    }
}

fn log_push_outcome(record: &CanonicalProduct, outcome: &RecordOutcome) {
    match outcome {
        RecordOutcome::Updated => info!("✅ Synced: {}", record.title),
        RecordOutcome::Skipped(reason) => {
            info!("⏭️  Skipping \"{}\" - {}", record.title, reason.as_str());
        }
        RecordOutcome::Failed(error) => {
            warn!("❌ Failed to sync: {}: {}", record.title, error);
        }
        RecordOutcome::Created(_) => {}
    }
}

fn log_summary(result: &SyncResult) {
    info!(
        "🎉 {} sync complete! {} created, {} synced, {} skipped, {} errors",
        result.strategy.as_str(),
        result.created,
        result.synced,
        result.skipped,
        result.errors.len()
    );
}

/// Inbound trigger for the dashboard/CLI layer: resolve the account's
/// credential, construct the catalog clients, and run the strategy.
pub async fn run_sync(
    config: &AppConfig,
    credential_store: &dyn CredentialStore,
    strategy: SyncStrategy,
    account_id: &str,
) -> Result<SyncResult, SyncError> {
    info!("🔄 Starting {} sync for account: {}", strategy.as_str(), account_id);

    let credential = credential_store
        .fetch_credential(account_id)
        .await?
        .ok_or_else(|| SyncError::CredentialMissing {
            account_id: account_id.to_string(),
        })?;

    let api_key = std::env::var(&config.document_store.api_key_env).map_err(|_| {
        SyncError::fetch(
            "document store",
            format!(
                "API key environment variable '{}' is not set",
                config.document_store.api_key_env
            ),
        )
    })?;

    let document_store = DocumentStoreClient::new(&config.document_store, &config.sync, &api_key)
        .map_err(|error| SyncError::fetch("document store", error.to_string()))?;
    let storefront = StorefrontClient::new(&config.storefront, &config.sync, &credential)
        .map_err(|error| SyncError::fetch("storefront", error.to_string()))?;

    SyncOrchestrator::new(document_store, storefront)
        .run(strategy)
        .await
}
