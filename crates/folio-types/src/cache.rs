//! Local cache entry shape.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::draft::OwnerKey;
use crate::section::SectionData;

/// Current cache entry layout. Bump when `CacheEntry` changes shape.
pub const CACHE_SCHEMA_VERSION: u32 = 1;

/// Full in-memory form state at one instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormSnapshot {
    /// Section index -> payload. Sections never touched are absent.
    pub sections: BTreeMap<usize, SectionData>,
    /// Section the user was on when the snapshot was taken.
    pub current_section: usize,
}

/// One mirrored draft in the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub owner_key: OwnerKey,
    /// Report key, or `"draft"` before the report exists.
    pub draft_key: String,
    pub snapshot: FormSnapshot,
    /// Last payload the remote store confirmed, per section.
    #[serde(default)]
    pub synced: BTreeMap<usize, SectionData>,
    /// Last time the remote confirmed any section of this snapshot.
    pub saved_at: Option<DateTime<Utc>>,
    /// Last local write.
    pub updated_at: DateTime<Utc>,
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
}

fn default_schema_version() -> u32 {
    CACHE_SCHEMA_VERSION
}

impl CacheEntry {
    /// Whether the cached copy of `section` differs from what the remote
    /// last confirmed for it.
    pub fn is_section_dirty(&self, section: usize) -> bool {
        self.snapshot
            .sections
            .get(&section)
            .is_some_and(|local| self.synced.get(&section) != Some(local))
    }

    pub fn dirty_sections(&self) -> Vec<usize> {
        self.snapshot
            .sections
            .keys()
            .copied()
            .filter(|&section| self.is_section_dirty(section))
            .collect()
    }

    /// Whether the snapshot holds edits the remote has not confirmed.
    pub fn is_dirty(&self) -> bool {
        !self.dirty_sections().is_empty()
    }
}
