//! Configuration types for folio.
//!
//! `FolioConfig` represents the top-level `config.toml` that tunes the
//! auto-save scheduler and the local cache.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Top-level configuration. Loaded from `~/.folio/config.toml`; every field
/// has a default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolioConfig {
    #[serde(default)]
    pub autosave: AutoSaveConfig,

    #[serde(default)]
    pub cache: CacheConfig,
}

/// Debounce and retry tuning for background saves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AutoSaveConfig {
    /// Quiet period after the last edit before a background save fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Failed attempts tolerated before the scheduler gives up and reports
    /// "saved locally, not synced".
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_retry_base_ms")]
    pub retry_base_ms: u64,

    #[serde(default = "default_retry_max_ms")]
    pub retry_max_ms: u64,

    /// Upper bound on a single remote save call.
    #[serde(default = "default_save_timeout_ms")]
    pub save_timeout_ms: u64,
}

fn default_debounce_ms() -> u64 {
    2_000
}

fn default_max_retries() -> u32 {
    3
}

fn default_retry_base_ms() -> u64 {
    1_000
}

fn default_retry_max_ms() -> u64 {
    30_000
}

fn default_save_timeout_ms() -> u64 {
    10_000
}

impl Default for AutoSaveConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_retries: default_max_retries(),
            retry_base_ms: default_retry_base_ms(),
            retry_max_ms: default_retry_max_ms(),
            save_timeout_ms: default_save_timeout_ms(),
        }
    }
}

impl AutoSaveConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn save_timeout(&self) -> Duration {
        Duration::from_millis(self.save_timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    /// When false, the engine runs remote-only.
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// Writes larger than this are rejected as "cache full".
    #[serde(default = "default_max_entry_bytes")]
    pub max_entry_bytes: usize,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_max_entry_bytes() -> usize {
    256 * 1024
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            max_entry_bytes: default_max_entry_bytes(),
        }
    }
}
