//! Best-effort mirror of the in-memory form into a [`LocalCache`].
//!
//! Every failure of the underlying medium is logged and swallowed: the
//! engine keeps running on remote persistence alone.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, warn};

use folio_types::cache::{CACHE_SCHEMA_VERSION, CacheEntry, FormSnapshot};
use folio_types::draft::{DraftKey, OwnerKey};
use folio_types::error::CacheError;
use folio_types::section::SectionData;

use super::local_cache::LocalCache;

pub struct CacheBridge<C> {
    cache: Option<C>,
    /// Held across every read-modify-write of an entry. The controller and
    /// the scheduler both write.
    lock: Mutex<()>,
}

impl<C: LocalCache> CacheBridge<C> {
    pub fn new(cache: C) -> Self {
        Self {
            cache: Some(cache),
            lock: Mutex::new(()),
        }
    }

    /// A bridge with no medium behind it. Every call is a no-op.
    pub fn disabled() -> Self {
        Self {
            cache: None,
            lock: Mutex::new(()),
        }
    }

    fn exclusive(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn is_enabled(&self) -> bool {
        self.cache.is_some()
    }

    fn report(&self, op: &str, owner: &OwnerKey, draft_key: &DraftKey, err: &CacheError) {
        warn!(%owner, draft_key = %draft_key, op, error = %err, "local cache unavailable, continuing remote-only");
    }

    /// Overwrite the snapshot stored for `(owner, draft_key)`.
    ///
    /// Keeps the per-section record of what the remote confirmed, so a
    /// mirrored edit reads as dirty until [`mark_synced`](Self::mark_synced)
    /// confirms it. Returns whether the write reached the medium.
    pub fn write(&self, owner: &OwnerKey, draft_key: &DraftKey, snapshot: &FormSnapshot) -> bool {
        self.store(owner, draft_key, snapshot, None)
    }

    /// Overwrite the snapshot and replace the record of confirmed content,
    /// e.g. with what a fresh load just read from the remote.
    pub fn write_reconciled(
        &self,
        owner: &OwnerKey,
        draft_key: &DraftKey,
        snapshot: &FormSnapshot,
        synced: &BTreeMap<usize, SectionData>,
    ) -> bool {
        self.store(owner, draft_key, snapshot, Some(synced))
    }

    fn store(
        &self,
        owner: &OwnerKey,
        draft_key: &DraftKey,
        snapshot: &FormSnapshot,
        synced: Option<&BTreeMap<usize, SectionData>>,
    ) -> bool {
        let Some(cache) = &self.cache else {
            return false;
        };
        let _guard = self.exclusive();
        let previous = match cache.read(owner, draft_key) {
            Ok(entry) => entry,
            Err(err) => {
                self.report("read", owner, draft_key, &err);
                None
            }
        };
        let (kept_synced, saved_at) = match previous.as_ref() {
            Some(prev) => (prev.synced.clone(), prev.saved_at),
            None => (BTreeMap::new(), None),
        };
        let entry = CacheEntry {
            owner_key: owner.clone(),
            draft_key: draft_key.to_string(),
            snapshot: snapshot.clone(),
            synced: synced.cloned().unwrap_or(kept_synced),
            saved_at,
            updated_at: after(previous.as_ref().map(|e| e.updated_at)),
            schema_version: CACHE_SCHEMA_VERSION,
        };
        match cache.write(&entry) {
            Ok(()) => true,
            Err(err) => {
                self.report("write", owner, draft_key, &err);
                false
            }
        }
    }

    pub fn read(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Option<CacheEntry> {
        let cache = self.cache.as_ref()?;
        match cache.read(owner, draft_key) {
            Ok(Some(entry)) if entry.schema_version != CACHE_SCHEMA_VERSION => {
                debug!(%owner, draft_key = %draft_key, version = entry.schema_version, "ignoring cache entry with foreign schema");
                None
            }
            Ok(entry) => entry,
            Err(err) => {
                self.report("read", owner, draft_key, &err);
                None
            }
        }
    }

    pub fn clear(&self, owner: &OwnerKey, draft_key: &DraftKey) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(err) = cache.remove(owner, draft_key) {
            self.report("remove", owner, draft_key, &err);
        }
    }

    /// Record that the remote confirmed `data` for `section`.
    ///
    /// The snapshot is left alone: a newer local edit of that section stays
    /// dirty because it differs from `data`.
    pub fn mark_synced(
        &self,
        owner: &OwnerKey,
        draft_key: &DraftKey,
        section: usize,
        data: &SectionData,
    ) {
        let Some(cache) = &self.cache else {
            return;
        };
        let _guard = self.exclusive();
        let mut entry = match cache.read(owner, draft_key) {
            Ok(Some(entry)) => entry,
            Ok(None) => return,
            Err(err) => {
                self.report("read", owner, draft_key, &err);
                return;
            }
        };
        entry.synced.insert(section, data.clone());
        entry.saved_at = Some(Utc::now());
        if let Err(err) = cache.write(&entry) {
            self.report("write", owner, draft_key, &err);
        }
    }

    /// Move an entry to a new key, e.g. from `"draft"` to the report key
    /// once the remote has created the report.
    pub fn rekey(&self, owner: &OwnerKey, from: &DraftKey, to: &DraftKey) {
        let Some(cache) = &self.cache else {
            return;
        };
        let _guard = self.exclusive();
        let Some(mut entry) = self.read(owner, from) else {
            return;
        };
        entry.draft_key = to.to_string();
        match cache.write(&entry) {
            Ok(()) => self.clear(owner, from),
            Err(err) => self.report("write", owner, to, &err),
        }
    }
}

/// `now`, nudged forward if the clock has not moved past `previous`.
fn after(previous: Option<DateTime<Utc>>) -> DateTime<Utc> {
    let now = Utc::now();
    match previous {
        Some(prev) if now <= prev => prev + TimeDelta::microseconds(1),
        _ => now,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryCache;
    use folio_types::draft::ReportKey;
    use folio_types::section::{Enrollment, SectionKind};

    fn snapshot(total: u32) -> FormSnapshot {
        let mut snapshot = FormSnapshot::default();
        snapshot.sections.insert(
            1,
            SectionData::Enrollment(Enrollment {
                total_enrolled: Some(total),
                ..Default::default()
            }),
        );
        snapshot.current_section = 1;
        snapshot
    }

    #[test]
    fn test_write_then_read() {
        let bridge = CacheBridge::new(MemoryCache::default());
        let owner = OwnerKey::new("alice");
        assert!(bridge.write(&owner, &DraftKey::Unsaved, &snapshot(4)));

        let entry = bridge.read(&owner, &DraftKey::Unsaved).unwrap();
        assert_eq!(entry.snapshot, snapshot(4));
        assert_eq!(entry.draft_key, "draft");
        assert!(entry.is_dirty());
        assert!(bridge.read(&OwnerKey::new("bob"), &DraftKey::Unsaved).is_none());
    }

    #[test]
    fn test_mark_synced_only_when_snapshot_matches() {
        let bridge = CacheBridge::new(MemoryCache::default());
        let owner = OwnerKey::new("alice");
        let key = DraftKey::Report(ReportKey::new());
        bridge.write(&owner, &key, &snapshot(4));

        let stale = snapshot(3).sections.remove(&1).unwrap();
        bridge.mark_synced(&owner, &key, 1, &stale);
        assert!(bridge.read(&owner, &key).unwrap().is_dirty());

        let current = snapshot(4).sections.remove(&1).unwrap();
        bridge.mark_synced(&owner, &key, 1, &current);
        assert!(!bridge.read(&owner, &key).unwrap().is_dirty());

        // A later edit makes it dirty again.
        bridge.write(&owner, &key, &snapshot(5));
        assert!(bridge.read(&owner, &key).unwrap().is_dirty());
    }

    #[test]
    fn test_write_keeps_synced_record() {
        let bridge = CacheBridge::new(MemoryCache::default());
        let owner = OwnerKey::new("alice");
        let key = DraftKey::Report(ReportKey::new());
        let confirmed = snapshot(4);
        bridge.write_reconciled(&owner, &key, &confirmed, &confirmed.sections);
        assert!(!bridge.read(&owner, &key).unwrap().is_dirty());

        // Moving to another section rewrites the snapshot, not the record.
        let mut moved = confirmed.clone();
        moved.current_section = 3;
        bridge.write(&owner, &key, &moved);
        let entry = bridge.read(&owner, &key).unwrap();
        assert_eq!(entry.synced, confirmed.sections);
        assert!(!entry.is_dirty());

        bridge.write(&owner, &key, &snapshot(6));
        assert_eq!(bridge.read(&owner, &key).unwrap().dirty_sections(), vec![1]);
    }

    #[test]
    fn test_rekey_moves_entry() {
        let bridge = CacheBridge::new(MemoryCache::default());
        let owner = OwnerKey::new("alice");
        let key = DraftKey::Report(ReportKey::new());
        bridge.write(&owner, &DraftKey::Unsaved, &snapshot(2));

        bridge.rekey(&owner, &DraftKey::Unsaved, &key);
        assert!(bridge.read(&owner, &DraftKey::Unsaved).is_none());
        let moved = bridge.read(&owner, &key).unwrap();
        assert_eq!(moved.draft_key, key.to_string());
        assert_eq!(moved.snapshot, snapshot(2));
    }

    #[test]
    fn test_unavailable_medium_degrades_to_noop() {
        let cache = MemoryCache::default();
        cache.set_unavailable(true);
        let bridge = CacheBridge::new(cache);
        let owner = OwnerKey::new("alice");

        assert!(!bridge.write(&owner, &DraftKey::Unsaved, &snapshot(1)));
        assert!(bridge.read(&owner, &DraftKey::Unsaved).is_none());
        bridge.clear(&owner, &DraftKey::Unsaved);
        bridge.mark_synced(&owner, &DraftKey::Unsaved, 0, &SectionKind::BasicInfo.empty_payload());
    }

    #[test]
    fn test_disabled_bridge() {
        let bridge: CacheBridge<MemoryCache> = CacheBridge::disabled();
        assert!(!bridge.is_enabled());
        assert!(!bridge.write(&OwnerKey::new("a"), &DraftKey::Unsaved, &snapshot(1)));
        assert!(bridge.read(&OwnerKey::new("a"), &DraftKey::Unsaved).is_none());
    }

    #[test]
    fn test_updated_at_strictly_increases() {
        let bridge = CacheBridge::new(MemoryCache::default());
        let owner = OwnerKey::new("alice");
        bridge.write(&owner, &DraftKey::Unsaved, &snapshot(1));
        let first = bridge.read(&owner, &DraftKey::Unsaved).unwrap().updated_at;
        bridge.write(&owner, &DraftKey::Unsaved, &snapshot(2));
        let second = bridge.read(&owner, &DraftKey::Unsaved).unwrap().updated_at;
        assert!(second > first);
    }
}
