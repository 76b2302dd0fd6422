//! Process-local cache, used when the file cache cannot be opened and in
//! tests.

use dashmap::DashMap;

use folio_core::cache::LocalCache;
use folio_types::cache::CacheEntry;
use folio_types::draft::{DraftKey, OwnerKey};
use folio_types::error::CacheError;

#[derive(Default)]
pub struct MemoryLocalCache {
    entries: DashMap<(OwnerKey, String), CacheEntry>,
    max_entry_bytes: Option<usize>,
}

impl MemoryLocalCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(max_entry_bytes: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entry_bytes: Some(max_entry_bytes),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl LocalCache for MemoryLocalCache {
    fn read(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<Option<CacheEntry>, CacheError> {
        Ok(self
            .entries
            .get(&(owner.clone(), draft_key.to_string()))
            .map(|entry| entry.value().clone()))
    }

    fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        if let Some(limit) = self.max_entry_bytes {
            let size = serde_json::to_vec(entry)
                .map_err(|e| CacheError::Serialization(e.to_string()))?
                .len();
            if size > limit {
                return Err(CacheError::QuotaExceeded { size, limit });
            }
        }
        self.entries
            .insert((entry.owner_key.clone(), entry.draft_key.clone()), entry.clone());
        Ok(())
    }

    fn remove(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<(), CacheError> {
        self.entries.remove(&(owner.clone(), draft_key.to_string()));
        Ok(())
    }
}
