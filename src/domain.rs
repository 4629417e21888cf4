//! Domain module - core synchronization logic and entities
//!
//! This module contains the canonical product model, the change detector,
//! the synchronization strategies and their reporting types, and the
//! service seams the orchestrator consumes.
//!
//! Modern Rust module organization (Rust 2018+ style):
//! - Each module is its own file in the domain/ directory
//! - Public exports are defined here for convenience

pub mod change_detection;
pub mod product;
pub mod services;
pub mod sync;

// Re-export commonly used items for convenience
pub use change_detection::{ChangeDetector, ChangeEntry, Classification};
pub use product::{CanonicalProduct, ProductStatus};
pub use sync::{RecordOutcome, SkipReason, SyncFailure, SyncResult, SyncStrategy};
