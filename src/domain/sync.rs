//! Synchronization strategies and run reporting types
//!
//! A `SyncResult` is created once per orchestration run, mutated only by the
//! orchestrator's sequential loop, and handed back to the caller. Nothing in
//! here is persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::infrastructure::sync_error::SyncError;

/// The three orchestration modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStrategy {
    /// Push every linked document record to the storefront, changed or not.
    /// Never creates.
    Full,
    /// Detect changes and push only linked records whose content diverged.
    /// Never creates.
    SmartIncremental,
    /// Create storefront records for unlinked document records and write the
    /// new identifier back. Never updates.
    CreateOnly,
}

impl SyncStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::SmartIncremental => "smart-incremental",
            Self::CreateOnly => "create-only",
        }
    }

    /// Parse a strategy name as passed on the command line.
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "full" => Some(Self::Full),
            "smart" | "smart-incremental" | "incremental" => Some(Self::SmartIncremental),
            "create" | "create-only" | "new" => Some(Self::CreateOnly),
            _ => None,
        }
    }
}

/// Why a record was intentionally not attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SkipReason {
    /// The record has no storefront link, so there is nothing to update.
    NotLinked,
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotLinked => "not_linked",
        }
    }
}

/// Terminal state of one record within a run. Every record ends in exactly
/// one of these; there are no retries within a single run.
#[derive(Debug, Clone)]
pub enum RecordOutcome {
    /// A storefront record was created; carries the issued identifier.
    Created(String),
    Updated,
    Skipped(SkipReason),
    Failed(SyncError),
}

/// One failed record in the run summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncFailure {
    #[serde(rename = "sourceId")]
    pub source_id: String,
    pub title: String,
    /// Stable error-kind label from [`SyncError::kind`].
    pub kind: String,
    pub message: String,
}

/// Summary of one orchestration run.
///
/// `errors` (attempted, failed) is always distinct from `skipped`
/// (intentionally not attempted).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncResult {
    pub strategy: SyncStrategy,
    /// Number of records the strategy considered for processing.
    #[serde(rename = "totalConsidered")]
    pub total_considered: usize,
    pub created: usize,
    pub synced: usize,
    pub skipped: usize,
    pub errors: Vec<SyncFailure>,
    #[serde(rename = "startedAt")]
    pub started_at: DateTime<Utc>,
    #[serde(rename = "finishedAt")]
    pub finished_at: DateTime<Utc>,
}

impl SyncResult {
    pub fn new(strategy: SyncStrategy) -> Self {
        let now = Utc::now();
        Self {
            strategy,
            total_considered: 0,
            created: 0,
            synced: 0,
            skipped: 0,
            errors: Vec::new(),
            started_at: now,
            finished_at: now,
        }
    }

    /// Fold one record's terminal outcome into the counters.
    pub fn record(&mut self, source_id: &str, title: &str, outcome: &RecordOutcome) {
        match outcome {
            RecordOutcome::Created(_) => self.created += 1,
            RecordOutcome::Updated => self.synced += 1,
            RecordOutcome::Skipped(_) => self.skipped += 1,
            RecordOutcome::Failed(error) => self.errors.push(SyncFailure {
                source_id: source_id.to_string(),
                title: title.to_string(),
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
        }
    }

    /// Stamp the end of the run.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strategy_names_round_trip() {
        for strategy in [
            SyncStrategy::Full,
            SyncStrategy::SmartIncremental,
            SyncStrategy::CreateOnly,
        ] {
            assert_eq!(SyncStrategy::parse(strategy.as_str()), Some(strategy));
        }
        assert_eq!(SyncStrategy::parse("bogus"), None);
    }

    #[test]
    fn outcomes_land_in_distinct_counters() {
        let mut result = SyncResult::new(SyncStrategy::Full);
        result.record("s1", "Mug", &RecordOutcome::Updated);
        result.record("s2", "Cup", &RecordOutcome::Skipped(SkipReason::NotLinked));
        result.record(
            "s3",
            "Bowl",
            &RecordOutcome::Failed(SyncError::write("product update", "500")),
        );
        assert_eq!(result.synced, 1);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.errors.len(), 1);
        assert_eq!(result.errors[0].kind, "write");
        assert_eq!(result.created, 0);
    }
}
