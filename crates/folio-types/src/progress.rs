//! Progress bookkeeping for one draft.
//!
//! `ProgressState` is plain data; its transitions live in
//! `folio_core::progress` so they can enforce the sealed/terminal rules.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressState {
    pub section_count: usize,
    /// Invariant: `current_section < section_count`.
    pub current_section: usize,
    pub completed_sections: BTreeSet<usize>,
    /// Display-only completion percentage per section (0-100).
    pub section_progress: Vec<u8>,
    /// Monotonically increasing across mutations.
    pub last_touched: DateTime<Utc>,
}

impl ProgressState {
    pub fn empty(section_count: usize) -> Self {
        Self {
            section_count,
            current_section: 0,
            completed_sections: BTreeSet::new(),
            section_progress: vec![0; section_count],
            last_touched: Utc::now(),
        }
    }
}
