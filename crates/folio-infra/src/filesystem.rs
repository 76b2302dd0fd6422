//! Data directory layout.

use std::path::{Path, PathBuf};

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `FOLIO_DATA_DIR` environment variable
/// 2. `~/.folio`
/// 3. `./.folio`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("FOLIO_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".folio");
    }

    PathBuf::from(".folio")
}

/// `{data_dir}/cache`, home of the file-backed local cache.
pub fn cache_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("cache")
}

pub async fn ensure_dir(path: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(path).await
}
