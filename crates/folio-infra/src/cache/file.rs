//! File-backed local cache.
//!
//! One JSON file per entry at `{dir}/{owner}/{draft_key}.json`. Writes go
//! to a temp file first and are renamed into place, so a crash mid-write
//! leaves the previous entry intact.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use folio_core::cache::LocalCache;
use folio_types::cache::CacheEntry;
use folio_types::draft::{DraftKey, OwnerKey};
use folio_types::error::CacheError;

pub struct FileLocalCache {
    dir: PathBuf,
    max_entry_bytes: usize,
}

impl FileLocalCache {
    pub fn new(dir: impl Into<PathBuf>, max_entry_bytes: usize) -> Self {
        Self {
            dir: dir.into(),
            max_entry_bytes,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, owner: &OwnerKey, draft_key: &str) -> PathBuf {
        self.dir
            .join(encode_component(owner.as_str()))
            .join(format!("{}.json", encode_component(draft_key)))
    }
}

/// Percent-encode everything outside `[A-Za-z0-9_-]` so owner keys can
/// never escape the cache directory.
fn encode_component(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(byte as char);
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    if out.is_empty() {
        out.push('%');
    }
    out
}

fn unavailable(e: std::io::Error) -> CacheError {
    CacheError::Unavailable(e.to_string())
}

impl LocalCache for FileLocalCache {
    fn read(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<Option<CacheEntry>, CacheError> {
        let path = self.entry_path(owner, &draft_key.to_string());
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(unavailable(e)),
        };
        serde_json::from_slice(&bytes)
            .map(Some)
            .map_err(|e| CacheError::Serialization(format!("{}: {e}", path.display())))
    }

    fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        let bytes = serde_json::to_vec(entry).map_err(|e| CacheError::Serialization(e.to_string()))?;
        if bytes.len() > self.max_entry_bytes {
            return Err(CacheError::QuotaExceeded {
                size: bytes.len(),
                limit: self.max_entry_bytes,
            });
        }

        let path = self.entry_path(&entry.owner_key, &entry.draft_key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(unavailable)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).map_err(unavailable)?;
        fs::rename(&tmp, &path).map_err(unavailable)
    }

    fn remove(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<(), CacheError> {
        match fs::remove_file(self.entry_path(owner, &draft_key.to_string())) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(unavailable(e)),
        }
    }
}
