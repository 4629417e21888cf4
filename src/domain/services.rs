//! Domain service seams
//!
//! Trait interfaces the orchestration layer depends on. Concrete
//! implementations live in the infrastructure layer and are injected
//! explicitly.

pub mod catalog_services;

pub use catalog_services::{CommerceCatalog, DocumentCatalog, ProductPatch};
