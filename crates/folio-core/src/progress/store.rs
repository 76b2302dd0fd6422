//! Progress Store: section-completion bookkeeping for one draft.
//!
//! All transitions are synchronous and never perform I/O. Once sealed (the
//! draft is submitted) completion and per-section progress are frozen;
//! only the displayed section may still move.

use std::collections::BTreeSet;

use chrono::{DateTime, TimeDelta, Utc};

use folio_types::progress::ProgressState;

#[derive(Debug, Clone)]
pub struct ProgressStore {
    state: ProgressState,
    sealed: bool,
}

impl ProgressStore {
    pub fn new(section_count: usize) -> Self {
        Self {
            state: ProgressState::empty(section_count),
            sealed: false,
        }
    }

    /// Seed from the remote's completed-section list. Out-of-range indices
    /// are dropped.
    pub fn seeded(section_count: usize, completed: impl IntoIterator<Item = usize>) -> Self {
        let mut store = Self::new(section_count);
        for index in completed {
            store.mark_complete(index);
        }
        store
    }

    pub fn state(&self) -> &ProgressState {
        &self.state
    }

    pub fn section_count(&self) -> usize {
        self.state.section_count
    }

    pub fn current(&self) -> usize {
        self.state.current_section
    }

    pub fn completed(&self) -> &BTreeSet<usize> {
        &self.state.completed_sections
    }

    pub fn is_complete(&self, index: usize) -> bool {
        self.state.completed_sections.contains(&index)
    }

    pub fn all_complete(&self) -> bool {
        self.state.section_count > 0
            && self.state.completed_sections.len() == self.state.section_count
    }

    /// Indices not yet confirmed, ascending.
    pub fn missing_sections(&self) -> Vec<usize> {
        (0..self.state.section_count)
            .filter(|i| !self.state.completed_sections.contains(i))
            .collect()
    }

    pub fn section_progress(&self, index: usize) -> u8 {
        self.state.section_progress.get(index).copied().unwrap_or(0)
    }

    pub fn last_touched(&self) -> DateTime<Utc> {
        self.state.last_touched
    }

    pub fn is_sealed(&self) -> bool {
        self.sealed
    }

    fn touch(&mut self) {
        let now = Utc::now();
        self.state.last_touched = if now > self.state.last_touched {
            now
        } else {
            self.state.last_touched + TimeDelta::microseconds(1)
        };
    }

    /// Add `index` to the completed set. Returns whether anything changed.
    ///
    /// Out-of-range indices and sealed stores are silently ignored.
    pub fn mark_complete(&mut self, index: usize) -> bool {
        if self.sealed || index >= self.state.section_count {
            return false;
        }
        let inserted = self.state.completed_sections.insert(index);
        if inserted {
            self.touch();
        }
        inserted
    }

    /// Move to `index`, clamped to `[0, section_count - 1]`. Returns the
    /// index actually selected.
    pub fn set_current(&mut self, index: usize) -> usize {
        let clamped = index.min(self.state.section_count.saturating_sub(1));
        if clamped != self.state.current_section {
            self.state.current_section = clamped;
            self.touch();
        }
        clamped
    }

    /// Store a display percentage for a section. Never affects completion.
    pub fn update_section_progress(&mut self, index: usize, percent: u8) {
        if self.sealed {
            return;
        }
        if let Some(slot) = self.state.section_progress.get_mut(index) {
            *slot = percent.min(100);
            self.touch();
        }
    }

    /// Lowest index not yet completed, or the last index when all are.
    pub fn next_incomplete_section(&self) -> usize {
        (0..self.state.section_count)
            .find(|i| !self.state.completed_sections.contains(i))
            .unwrap_or_else(|| self.state.section_count.saturating_sub(1))
    }

    /// `100 * completed / count` once anything is complete, otherwise a
    /// linear estimate from the current position. Rounded to the nearest
    /// integer.
    pub fn overall_progress(&self) -> u8 {
        let count = self.state.section_count;
        if count == 0 {
            return 0;
        }
        let done = if self.state.completed_sections.is_empty() {
            self.state.current_section
        } else {
            self.state.completed_sections.len()
        };
        ((200 * done.min(count) + count) / (2 * count)) as u8
    }

    /// Back to an empty state with the same section count.
    pub fn reset(&mut self) {
        if self.sealed {
            return;
        }
        let count = self.state.section_count;
        let last_touched = self.state.last_touched;
        self.state = ProgressState::empty(count);
        self.state.last_touched = last_touched;
        self.touch();
    }

    /// Freeze completion and per-section progress.
    pub fn seal(&mut self) {
        self.sealed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_at_earliest_gap() {
        let store = ProgressStore::seeded(5, [0, 1, 3]);
        assert_eq!(store.next_incomplete_section(), 2);
    }

    #[test]
    fn test_next_incomplete_when_all_complete_is_last() {
        let store = ProgressStore::seeded(3, [0, 1, 2]);
        assert!(store.all_complete());
        assert_eq!(store.next_incomplete_section(), 2);
    }

    #[test]
    fn test_mark_complete_is_idempotent_and_ignores_out_of_range() {
        let mut store = ProgressStore::new(3);
        assert!(store.mark_complete(1));
        assert!(!store.mark_complete(1));
        assert!(!store.mark_complete(7));
        assert_eq!(store.completed().iter().copied().collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn test_set_current_clamps() {
        let mut store = ProgressStore::new(4);
        assert_eq!(store.set_current(2), 2);
        assert_eq!(store.set_current(99), 3);
        assert_eq!(store.current(), 3);
    }

    #[test]
    fn test_navigation_never_shrinks_completion() {
        let mut store = ProgressStore::seeded(4, [0, 1]);
        let before = store.completed().clone();
        store.set_current(0);
        store.set_current(3);
        store.set_current(1);
        assert!(before.is_subset(store.completed()));
        assert_eq!(store.completed(), &before);
    }

    #[test]
    fn test_overall_progress_uses_completed_count() {
        let mut store = ProgressStore::new(3);
        store.mark_complete(0);
        store.mark_complete(1);
        assert_eq!(store.overall_progress(), 67);
    }

    #[test]
    fn test_overall_progress_estimates_from_position() {
        let mut store = ProgressStore::new(4);
        assert_eq!(store.overall_progress(), 0);
        store.set_current(2);
        assert_eq!(store.overall_progress(), 50);
    }

    #[test]
    fn test_section_progress_is_display_only() {
        let mut store = ProgressStore::new(2);
        store.update_section_progress(0, 100);
        assert_eq!(store.section_progress(0), 100);
        assert!(store.completed().is_empty());
        store.update_section_progress(1, 250);
        assert_eq!(store.section_progress(1), 100);
    }

    #[test]
    fn test_last_touched_is_monotonic() {
        let mut store = ProgressStore::new(5);
        let mut previous = store.last_touched();
        for i in 0..5 {
            store.mark_complete(i);
            assert!(store.last_touched() > previous);
            previous = store.last_touched();
        }
    }

    #[test]
    fn test_sealed_store_ignores_mutations() {
        let mut store = ProgressStore::seeded(3, [0]);
        store.seal();
        assert!(!store.mark_complete(1));
        store.update_section_progress(1, 50);
        store.reset();
        assert_eq!(store.completed().len(), 1);
        assert_eq!(store.section_progress(1), 0);
        // Viewing a sealed draft can still move between sections.
        assert_eq!(store.set_current(2), 2);
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut store = ProgressStore::seeded(3, [0, 2]);
        store.set_current(1);
        store.update_section_progress(1, 40);
        store.reset();
        assert!(store.completed().is_empty());
        assert_eq!(store.current(), 0);
        assert_eq!(store.section_progress(1), 0);
    }
}
