//! `LocalCache` implementations.

pub mod file;
pub mod memory;

use std::path::Path;

use folio_core::cache::LocalCache;
use folio_types::cache::CacheEntry;
use folio_types::config::CacheConfig;
use folio_types::draft::{DraftKey, OwnerKey};
use folio_types::error::CacheError;

pub use file::FileLocalCache;
pub use memory::MemoryLocalCache;

/// The cache medium selected at startup.
pub enum LocalCacheStore {
    File(FileLocalCache),
    Memory(MemoryLocalCache),
}

impl LocalCache for LocalCacheStore {
    fn read(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<Option<CacheEntry>, CacheError> {
        match self {
            Self::File(cache) => cache.read(owner, draft_key),
            Self::Memory(cache) => cache.read(owner, draft_key),
        }
    }

    fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        match self {
            Self::File(cache) => cache.write(entry),
            Self::Memory(cache) => cache.write(entry),
        }
    }

    fn remove(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<(), CacheError> {
        match self {
            Self::File(cache) => cache.remove(owner, draft_key),
            Self::Memory(cache) => cache.remove(owner, draft_key),
        }
    }
}

/// Open the file cache under `cache_dir`.
///
/// Returns `None` when caching is disabled. Falls back to an in-memory
/// cache if the directory cannot be created.
pub fn open_local_cache(config: &CacheConfig, cache_dir: &Path) -> Option<LocalCacheStore> {
    if !config.enabled {
        tracing::debug!("local cache disabled by config");
        return None;
    }
    match std::fs::create_dir_all(cache_dir) {
        Ok(()) => Some(LocalCacheStore::File(FileLocalCache::new(
            cache_dir,
            config.max_entry_bytes,
        ))),
        Err(err) => {
            tracing::warn!(
                "Cannot use cache directory {}: {err}, keeping edits in memory only",
                cache_dir.display()
            );
            Some(LocalCacheStore::Memory(MemoryLocalCache::with_quota(
                config.max_entry_bytes,
            )))
        }
    }
}
