//! Strategy semantics and failure isolation over in-memory catalogs.

mod common;

use catalog_sync::application::orchestrator::{run_sync, SyncOrchestrator};
use catalog_sync::domain::sync::SyncStrategy;
use catalog_sync::infrastructure::config::AppConfig;
use catalog_sync::infrastructure::credentials::MemoryCredentialStore;
use catalog_sync::infrastructure::sync_error::SyncError;
use common::{linked_product, target_of, unlinked_product, FakeCommerceCatalog, FakeDocumentCatalog};

#[tokio::test]
async fn create_only_creates_unlinked_records_and_links_back() {
    let mut documents = FakeDocumentCatalog::with_records(vec![
        unlinked_product("s1", "Mug"),
        linked_product("s2", "b2", "Cup"),
    ]);
    documents
        .content
        .insert("s1".to_string(), "A sturdy mug".to_string());
    let storefront = FakeCommerceCatalog::default();

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let result = orchestrator.run(SyncStrategy::CreateOnly).await.unwrap();

    assert_eq!(result.total_considered, 1);
    assert_eq!(result.created, 1);
    assert_eq!(result.synced, 0);
    assert!(result.errors.is_empty());
}

#[tokio::test]
async fn create_only_never_issues_updates() {
    let documents = FakeDocumentCatalog::with_records(vec![
        unlinked_product("s1", "Mug"),
        linked_product("s2", "b2", "Cup"),
    ]);
    let storefront = FakeCommerceCatalog::default();

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    orchestrator.run(SyncStrategy::CreateOnly).await.unwrap();

    assert_eq!(orchestrator_storefront(&orchestrator).updated_count(), 0);
    assert_eq!(orchestrator_storefront(&orchestrator).created_count(), 1);
}

#[tokio::test]
async fn create_only_passes_rendered_description_and_writes_link() {
    let mut documents = FakeDocumentCatalog::with_records(vec![unlinked_product("s1", "Mug")]);
    documents
        .content
        .insert("s1".to_string(), "A sturdy mug".to_string());
    let storefront = FakeCommerceCatalog::default();

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    orchestrator.run(SyncStrategy::CreateOnly).await.unwrap();

    let creates = orchestrator_storefront(&orchestrator).creates.lock().unwrap().clone();
    assert_eq!(creates, vec![("s1".to_string(), "A sturdy mug".to_string())]);

    let links = orchestrator_documents(&orchestrator)
        .link_writes
        .lock()
        .unwrap()
        .clone();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].0, "s1");
    assert!(!links[0].1.is_empty(), "the storefront-issued id is linked back");
}

#[tokio::test]
async fn full_sync_updates_linked_and_skips_unlinked() {
    let documents = FakeDocumentCatalog::with_records(vec![
        linked_product("s1", "b1", "Mug"),
        unlinked_product("s2", "Sketch"),
        linked_product("s3", "b3", "Cup"),
    ]);
    let storefront = FakeCommerceCatalog::default();

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let result = orchestrator.run(SyncStrategy::Full).await.unwrap();

    assert_eq!(result.total_considered, 3);
    assert_eq!(result.synced, 2);
    assert_eq!(result.skipped, 1);
    assert_eq!(result.created, 0);
    assert!(result.errors.is_empty());

    // Full never creates, and pushes without a rendered description.
    let storefront = orchestrator_storefront(&orchestrator);
    assert_eq!(storefront.created_count(), 0);
    let updates = storefront.updates.lock().unwrap();
    assert_eq!(updates.len(), 2);
    assert!(updates.iter().all(|(_, patch)| patch.description.is_none()));
}

#[tokio::test]
async fn smart_incremental_ignores_unlinked_and_unchanged_records() {
    // The worked example: s1 is unlinked, s2 mirrors its storefront
    // counterpart exactly.
    let s2 = linked_product("s2", "b2", "Cup");
    let documents =
        FakeDocumentCatalog::with_records(vec![unlinked_product("s1", "Mug"), s2.clone()]);
    let storefront = FakeCommerceCatalog::with_records(vec![target_of(&s2)]);

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let result = orchestrator.run(SyncStrategy::SmartIncremental).await.unwrap();

    assert_eq!(result.total_considered, 0);
    assert_eq!(result.synced, 0);
    assert_eq!(result.skipped, 0);
    assert!(result.errors.is_empty());
    assert_eq!(orchestrator_storefront(&orchestrator).updated_count(), 0);
    assert_eq!(orchestrator_storefront(&orchestrator).created_count(), 0);
}

#[tokio::test]
async fn smart_incremental_pushes_only_drifted_records() {
    let s2 = linked_product("s2", "b2", "Cup");
    let mut drifted = target_of(&s2);
    drifted.price = 12.99;

    let mut documents = FakeDocumentCatalog::with_records(vec![s2.clone()]);
    documents
        .content
        .insert("s2".to_string(), "Porcelain cup".to_string());
    let storefront = FakeCommerceCatalog::with_records(vec![drifted]);

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let result = orchestrator.run(SyncStrategy::SmartIncremental).await.unwrap();

    assert_eq!(result.total_considered, 1);
    assert_eq!(result.synced, 1);
    assert!(result.errors.is_empty());

    let updates = orchestrator_storefront(&orchestrator).updates.lock().unwrap().clone();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0].0, "b2");
    // The detector-rendered description rides along with the update.
    assert_eq!(updates[0].1.description.as_deref(), Some("Porcelain cup"));
}

#[tokio::test]
async fn one_failing_record_never_aborts_the_batch() {
    let documents = FakeDocumentCatalog::with_records(vec![
        linked_product("s1", "b1", "Mug"),
        linked_product("s2", "b2", "Cup"),
        linked_product("s3", "b3", "Bowl"),
    ]);
    let mut storefront = FakeCommerceCatalog::default();
    storefront.fail_update.insert("b2".to_string());

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let result = orchestrator.run(SyncStrategy::Full).await.unwrap();

    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].source_id, "s2");
    assert_eq!(result.errors[0].kind, "write");
    assert_eq!(result.synced, 2, "records after the failure are still processed");
}

#[tokio::test]
async fn failed_link_write_back_is_a_distinct_inconsistency() {
    let mut documents = FakeDocumentCatalog::with_records(vec![
        unlinked_product("s1", "Mug"),
        unlinked_product("s2", "Cup"),
    ]);
    documents.fail_link.insert("s1".to_string());
    let storefront = FakeCommerceCatalog::default();

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let result = orchestrator.run(SyncStrategy::CreateOnly).await.unwrap();

    // The storefront record exists, but the run reports the broken link
    // instead of counting a successful creation.
    assert_eq!(orchestrator_storefront(&orchestrator).created_count(), 2);
    assert_eq!(result.created, 1);
    assert_eq!(result.errors.len(), 1);
    assert_eq!(result.errors[0].kind, "link_inconsistency");
    assert_eq!(result.errors[0].source_id, "s1");
}

#[tokio::test]
async fn unreadable_catalog_aborts_the_run() {
    let documents = FakeDocumentCatalog {
        fail_read: true,
        ..FakeDocumentCatalog::default()
    };
    let storefront = FakeCommerceCatalog::default();

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let error = orchestrator.run(SyncStrategy::Full).await.unwrap_err();

    assert!(error.is_fatal());
    assert_eq!(error.kind(), "fetch");
}

#[tokio::test]
async fn create_failure_leaves_the_record_unlinked() {
    let mut documents = FakeDocumentCatalog::with_records(vec![unlinked_product("s1", "Mug")]);
    documents
        .content
        .insert("s1".to_string(), "A sturdy mug".to_string());
    let mut storefront = FakeCommerceCatalog::default();
    storefront.fail_create.insert("s1".to_string());

    let orchestrator = SyncOrchestrator::new(documents, storefront);
    let result = orchestrator.run(SyncStrategy::CreateOnly).await.unwrap();

    assert_eq!(result.created, 0);
    assert_eq!(result.errors.len(), 1);
    assert!(orchestrator_documents(&orchestrator)
        .link_writes
        .lock()
        .unwrap()
        .is_empty());
}

#[tokio::test]
async fn run_sync_requires_a_stored_credential() {
    let config = AppConfig::default();
    let store = MemoryCredentialStore::new();

    let error = run_sync(&config, &store, SyncStrategy::Full, "shop-1")
        .await
        .unwrap_err();

    assert!(matches!(error, SyncError::CredentialMissing { .. }));
    assert!(error.is_fatal());
}

// The orchestrator owns its collaborators; expose them for assertions.
fn orchestrator_storefront<'a>(
    orchestrator: &'a SyncOrchestrator<FakeDocumentCatalog, FakeCommerceCatalog>,
) -> &'a FakeCommerceCatalog {
    orchestrator.storefront()
}

fn orchestrator_documents<'a>(
    orchestrator: &'a SyncOrchestrator<FakeDocumentCatalog, FakeCommerceCatalog>,
) -> &'a FakeDocumentCatalog {
    orchestrator.document_store()
}
