//! Catalog synchronization engine
//!
//! Reconciles product catalogs held in two independent external systems - a
//! document-style database that is the writer of record, and a commerce
//! storefront receiving mutations - without a shared schema or shared
//! primary key space.

// Module declarations
pub mod application;
pub mod domain;
pub mod infrastructure;

// Re-export the public surface for embedding callers
pub use application::{run_sync, SyncOrchestrator};
pub use domain::{
    CanonicalProduct, ChangeDetector, ChangeEntry, Classification, ProductStatus, SyncResult,
    SyncStrategy,
};
pub use infrastructure::{AppConfig, ConfigManager, SyncError};
