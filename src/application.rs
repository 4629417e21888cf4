//! Application layer module
//!
//! This module contains the use cases that orchestrate the domain logic
//! over the injected catalog clients.

pub mod orchestrator;

pub use orchestrator::{run_sync, SyncOrchestrator};
