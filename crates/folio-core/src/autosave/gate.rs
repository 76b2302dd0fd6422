//! The single in-flight flag shared by background saves and explicit
//! section confirmations.
//!
//! Whoever holds the gate is the only caller talking to a section adapter
//! for this draft. The ledger behind it remembers the newest edit revision
//! each section was explicitly confirmed at, so a background save that was
//! queued behind a confirmation can tell its snapshot is already stale.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct SaveLedger {
    confirmed: HashMap<usize, u64>,
}

impl SaveLedger {
    /// Record that `section` was confirmed with every edit up to `revision`.
    pub fn record(&mut self, section: usize, revision: u64) {
        let slot = self.confirmed.entry(section).or_default();
        *slot = (*slot).max(revision);
    }

    /// Whether a snapshot of `section` taken at `revision` has already been
    /// written by an explicit confirmation.
    pub fn is_superseded(&self, section: usize, revision: u64) -> bool {
        self.confirmed
            .get(&section)
            .is_some_and(|confirmed| *confirmed >= revision)
    }
}

#[derive(Debug, Clone, Default)]
pub struct SaveGate {
    inner: Arc<Mutex<SaveLedger>>,
}

impl SaveGate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait until no other save is in flight. FIFO across waiters.
    pub async fn acquire(&self) -> OwnedMutexGuard<SaveLedger> {
        Arc::clone(&self.inner).lock_owned().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ledger_supersedes_older_revisions() {
        let mut ledger = SaveLedger::default();
        assert!(!ledger.is_superseded(1, 3));
        ledger.record(1, 5);
        assert!(ledger.is_superseded(1, 3));
        assert!(ledger.is_superseded(1, 5));
        assert!(!ledger.is_superseded(1, 6));
        assert!(!ledger.is_superseded(2, 1));

        // Never moves backwards.
        ledger.record(1, 2);
        assert!(ledger.is_superseded(1, 5));
    }

    #[tokio::test]
    async fn test_gate_is_exclusive() {
        let gate = SaveGate::new();
        let held = gate.acquire().await;
        assert!(gate.inner.try_lock().is_err());
        drop(held);
        assert!(gate.inner.try_lock().is_ok());
    }
}
