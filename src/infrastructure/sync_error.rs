//! Error taxonomy for catalog synchronization
//!
//! Splits failures into two families: fatal errors that abort a run before
//! any record is processed (a catalog that cannot be read, a missing
//! credential) and per-record errors that are recorded in the run summary
//! while processing continues.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SyncError {
    #[error("failed to read {catalog} catalog: {message}")]
    Fetch { catalog: &'static str, message: String },

    #[error("no credential stored for account '{account_id}'")]
    CredentialMissing { account_id: String },

    #[error("record '{source_id}' cannot be processed: {reason}")]
    Validation { source_id: String, reason: String },

    #[error("{operation} failed: {message}")]
    Write { operation: &'static str, message: String },

    #[error("partial update of '{external_id}': {applied} applied, {failed} failed: {message}")]
    PartialWrite {
        external_id: String,
        applied: &'static str,
        failed: &'static str,
        message: String,
    },

    #[error(
        "created storefront record '{external_id}' but failed to link it back to '{source_id}': {message}"
    )]
    LinkInconsistency {
        source_id: String,
        external_id: String,
        message: String,
    },

    #[error("rate limited by {catalog}")]
    RateLimited {
        catalog: &'static str,
        retry_after_seconds: Option<u64>,
    },

    #[error("{catalog} rejected the stored credential")]
    Unauthenticated { catalog: &'static str },

    #[error("target record '{id}' not found")]
    TargetMissing { id: String },
}

impl SyncError {
    /// Create a fetch error for an unreadable catalog.
    pub fn fetch(catalog: &'static str, message: impl Into<String>) -> Self {
        Self::Fetch {
            catalog,
            message: message.into(),
        }
    }

    /// Create a validation error (classified as skipped, not failed).
    pub fn validation(source_id: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            source_id: source_id.into(),
            reason: reason.into(),
        }
    }

    /// Create a write error for a failed mutation call.
    pub fn write(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Write {
            operation,
            message: message.into(),
        }
    }

    /// Whether this error aborts the whole run. Everything else is caught at
    /// the per-record boundary and processing continues.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Fetch { .. } | Self::CredentialMissing { .. }
        )
    }

    /// Stable label for run summaries, so callers can group failures without
    /// parsing messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Fetch { .. } => "fetch",
            Self::CredentialMissing { .. } => "credential_missing",
            Self::Validation { .. } => "validation",
            Self::Write { .. } => "write",
            Self::PartialWrite { .. } => "partial_write",
            Self::LinkInconsistency { .. } => "link_inconsistency",
            Self::RateLimited { .. } => "rate_limited",
            Self::Unauthenticated { .. } => "unauthenticated",
            Self::TargetMissing { .. } => "target_missing",
        }
    }
}
