//! Local cache medium trait.
//!
//! A synchronous key/value store keyed by `(owner, draft key)`. Writes are
//! expected to be cheap enough to run on every edit. Implementations live
//! in folio-infra.

use std::sync::Arc;

use folio_types::cache::CacheEntry;
use folio_types::draft::{DraftKey, OwnerKey};
use folio_types::error::CacheError;

pub trait LocalCache: Send + Sync {
    /// Returns `None` if nothing is stored under the key.
    fn read(&self, owner: &OwnerKey, draft_key: &DraftKey)
    -> Result<Option<CacheEntry>, CacheError>;

    /// Overwrite the entry stored under `(entry.owner_key, entry.draft_key)`.
    fn write(&self, entry: &CacheEntry) -> Result<(), CacheError>;

    /// Remove an entry. No-op if it does not exist.
    fn remove(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<(), CacheError>;
}

impl<T: LocalCache + ?Sized> LocalCache for Arc<T> {
    fn read(
        &self,
        owner: &OwnerKey,
        draft_key: &DraftKey,
    ) -> Result<Option<CacheEntry>, CacheError> {
        (**self).read(owner, draft_key)
    }

    fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        (**self).write(entry)
    }

    fn remove(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<(), CacheError> {
        (**self).remove(owner, draft_key)
    }
}
