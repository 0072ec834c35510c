//! Aggregate result of one queue drain.

use serde::{Deserialize, Serialize};

/// Summary returned by the sync engine after one full pass over the
/// pending queue, for optional user-facing notices
/// ("3 changes could not be synced").
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Entries replayed successfully.
    pub synced: usize,
    /// Entries that failed and stay queued for the next drain.
    pub failed: usize,
    /// Entries dropped because their target no longer exists server-side.
    /// Not user-visible failures.
    pub dropped: usize,
    /// Action kinds of the failed entries, in queue order.
    pub failed_kinds: Vec<String>,
}

impl SyncReport {
    /// Whether anything failed.
    pub fn has_failures(&self) -> bool {
        self.failed > 0
    }

    /// Total entries attempted this pass.
    pub fn attempted(&self) -> usize {
        self.synced + self.failed + self.dropped
    }
}
