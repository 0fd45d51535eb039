// src/engine/queue.rs

use std::collections::BTreeSet;

use tracing::debug;

/// Changes that arrived while a pass was running.
///
/// Every recorded change collapses into a single pending batch: however many
/// events arrive during a pass, exactly one follow-up pass runs after it.
/// The batch keeps the changed paths for logging.
#[derive(Debug, Default)]
pub struct PendingPasses {
    batch: Option<BTreeSet<String>>,
}

impl PendingPasses {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if there is no pending pass.
    pub fn is_empty(&self) -> bool {
        self.batch.is_none()
    }

    /// Record that `path` changed while a pass is in progress.
    pub fn record_trigger(&mut self, path: &str) {
        let batch = self.batch.get_or_insert_with(BTreeSet::new);
        let inserted = batch.insert(path.to_string());
        debug!(
            path = %path,
            inserted,
            pending_paths = batch.len(),
            "merged change into pending pass"
        );
    }

    /// Take the pending batch, if any, as a sorted list of changed paths.
    pub fn drain_pending(&mut self) -> Option<Vec<String>> {
        let batch = self.batch.take()?;
        debug!(drained = batch.len(), "drained pending changes into new pass");
        Some(batch.into_iter().collect())
    }
}
