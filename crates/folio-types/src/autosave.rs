//! Auto-save status types published by the scheduler.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// State of the background save task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaveState {
    #[default]
    Idle,
    Scheduled,
    InFlight,
    Failed,
}

/// Passive sync indicator for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncIndicator {
    #[default]
    Clean,
    Dirty,
    Saving,
    /// Retries exhausted: saved locally, not synced.
    SavedLocally,
}

impl fmt::Display for SyncIndicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncIndicator::Clean => write!(f, "all changes saved"),
            SyncIndicator::Dirty => write!(f, "unsaved changes"),
            SyncIndicator::Saving => write!(f, "saving"),
            SyncIndicator::SavedLocally => write!(f, "saved locally, not synced"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveStatus {
    pub state: SaveState,
    pub attempt: u32,
    pub indicator: SyncIndicator,
    pub last_saved_at: Option<DateTime<Utc>>,
    /// Sections with edits waiting for a background save.
    pub pending_sections: BTreeSet<usize>,
    pub disabled: bool,
}
