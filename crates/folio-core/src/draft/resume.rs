//! Resume-position resolution and cache reconciliation on load.
//!
//! The resume contract: given only an owner, answer "is there an
//! in-progress draft, and which section should be shown" from
//! `find_existing` plus the local cache. Nothing else is consulted.

use serde::Serialize;

use folio_types::cache::CacheEntry;
use folio_types::draft::{DraftKey, DraftStatus, OwnerKey, ReportKey};
use folio_types::error::PersistenceError;
use folio_types::section::SectionData;

use crate::cache::{CacheBridge, LocalCache};
use crate::progress::ProgressStore;
use crate::repository::report::ReportLifecycle;

/// Earliest incomplete section, unless the cached snapshot shows the user
/// had already moved further locally. Always a valid index.
pub fn resolve_resume_section(progress: &ProgressStore, cached: Option<&CacheEntry>) -> usize {
    let earliest_gap = progress.next_incomplete_section();
    let local = cached.map_or(0, |entry| entry.snapshot.current_section);
    earliest_gap
        .max(local)
        .min(progress.section_count().saturating_sub(1))
}

/// The cached payload of `section` if it should replace what the remote
/// returned.
///
/// Only for a section that is not confirmed complete and whose cached copy
/// was never confirmed by the remote. If the cache recorded a confirmed
/// payload that no longer matches the remote, the remote moved on without
/// this cache and wins.
pub fn cached_edit_to_merge(
    section: usize,
    progress: &ProgressStore,
    cached: &CacheEntry,
    remote: Option<&SectionData>,
) -> Option<SectionData> {
    if progress.is_complete(section) || !cached.is_section_dirty(section) {
        return None;
    }
    let local = cached.snapshot.sections.get(&section)?;
    if Some(local) == remote {
        return None;
    }
    if let Some(confirmed) = cached.synced.get(&section) {
        if Some(confirmed) != remote {
            return None;
        }
    }
    Some(local.clone())
}

/// Answer to the resume contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResumeTarget {
    pub status: DraftStatus,
    pub report_key: Option<ReportKey>,
    /// Section to show. `None` for a submitted report.
    pub section: Option<usize>,
    /// Whether the local cache holds edits the remote has not confirmed.
    pub unsynced_local_edits: bool,
}

/// Resolve where `owner` would resume, without touching section data.
pub async fn resume_target<L, C>(
    lifecycle: &L,
    cache: &CacheBridge<C>,
    owner: &OwnerKey,
    section_count: usize,
) -> Result<ResumeTarget, PersistenceError>
where
    L: ReportLifecycle,
    C: LocalCache,
{
    let existing = lifecycle.find_existing(owner).await?;
    let target = match (existing.status, existing.report_key) {
        (DraftStatus::Submitted, Some(key)) => ResumeTarget {
            status: DraftStatus::Submitted,
            report_key: Some(key),
            section: None,
            unsynced_local_edits: false,
        },
        (DraftStatus::InProgress, Some(key)) => {
            let progress = ProgressStore::seeded(section_count, existing.completed_sections);
            let cached = cache.read(owner, &DraftKey::Report(key));
            ResumeTarget {
                status: DraftStatus::InProgress,
                report_key: Some(key),
                section: Some(resolve_resume_section(&progress, cached.as_ref())),
                unsynced_local_edits: cached.is_some_and(|entry| entry.is_dirty()),
            }
        }
        _ => {
            let cached = cache.read(owner, &DraftKey::Unsaved);
            ResumeTarget {
                status: DraftStatus::None,
                report_key: None,
                section: Some(0),
                unsynced_local_edits: cached.is_some(),
            }
        }
    };
    Ok(target)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use chrono::Utc;

    use super::*;
    use crate::testing::{MemoryBackend, MemoryCache};
    use folio_types::cache::{CACHE_SCHEMA_VERSION, FormSnapshot};
    use folio_types::section::Enrollment;

    fn enrollment(total: u32) -> SectionData {
        SectionData::Enrollment(Enrollment {
            total_enrolled: Some(total),
            ..Default::default()
        })
    }

    fn entry(
        current: usize,
        sections: &[(usize, SectionData)],
        synced: &[(usize, SectionData)],
    ) -> CacheEntry {
        CacheEntry {
            owner_key: OwnerKey::new("alice"),
            draft_key: "draft".to_string(),
            snapshot: FormSnapshot {
                sections: sections.iter().cloned().collect(),
                current_section: current,
            },
            synced: synced.iter().cloned().collect::<BTreeMap<_, _>>(),
            saved_at: None,
            updated_at: Utc::now(),
            schema_version: CACHE_SCHEMA_VERSION,
        }
    }

    #[test]
    fn test_resume_defaults_to_earliest_gap() {
        let progress = ProgressStore::seeded(5, [0, 1, 3]);
        assert_eq!(resolve_resume_section(&progress, None), 2);
    }

    #[test]
    fn test_further_local_position_wins() {
        let progress = ProgressStore::seeded(5, [0, 1]);
        let cached = entry(4, &[], &[]);
        assert_eq!(resolve_resume_section(&progress, Some(&cached)), 4);

        let behind = entry(0, &[], &[]);
        assert_eq!(resolve_resume_section(&progress, Some(&behind)), 2);
    }

    #[test]
    fn test_cached_position_is_clamped() {
        let progress = ProgressStore::new(3);
        let cached = entry(12, &[], &[]);
        assert_eq!(resolve_resume_section(&progress, Some(&cached)), 2);
    }

    #[test]
    fn test_merge_edit_the_remote_never_confirmed() {
        let progress = ProgressStore::seeded(5, [0]);
        let cached = entry(1, &[(1, enrollment(7))], &[]);
        let merged = cached_edit_to_merge(1, &progress, &cached, Some(&enrollment(3)));
        assert_eq!(merged, Some(enrollment(7)));
    }

    #[test]
    fn test_merge_edit_made_while_older_save_landed() {
        // The remote confirmed 3, then the user typed 7 before that was known.
        let progress = ProgressStore::seeded(5, [0]);
        let cached = entry(1, &[(1, enrollment(7))], &[(1, enrollment(3))]);
        let merged = cached_edit_to_merge(1, &progress, &cached, Some(&enrollment(3)));
        assert_eq!(merged, Some(enrollment(7)));
    }

    #[test]
    fn test_never_merge_over_confirmed_section() {
        let progress = ProgressStore::seeded(5, [0, 1]);
        let cached = entry(1, &[(1, enrollment(7))], &[]);
        assert!(cached_edit_to_merge(1, &progress, &cached, Some(&enrollment(3))).is_none());
    }

    #[test]
    fn test_skip_merge_when_synced_or_remote_moved_on() {
        let progress = ProgressStore::new(5);
        let clean = entry(1, &[(1, enrollment(3))], &[(1, enrollment(3))]);
        assert!(cached_edit_to_merge(1, &progress, &clean, Some(&enrollment(3))).is_none());

        let moved = entry(1, &[(1, enrollment(7))], &[(1, enrollment(3))]);
        assert!(cached_edit_to_merge(1, &progress, &moved, Some(&enrollment(5))).is_none());
    }

    #[tokio::test]
    async fn test_resume_target_uses_only_lookup_and_cache() {
        let backend = MemoryBackend::new();
        let cache = Arc::new(MemoryCache::default());
        let bridge = CacheBridge::new(Arc::clone(&cache));
        let owner = OwnerKey::new("alice");

        let none = resume_target(&backend, &bridge, &owner, 5).await.unwrap();
        assert_eq!(none.status, DraftStatus::None);
        assert_eq!(none.section, Some(0));
        assert!(!none.unsynced_local_edits);

        let key = backend.seed_report("alice");
        backend.seed_completed(&key, [0, 1, 3]);
        let target = resume_target(&backend, &bridge, &owner, 5).await.unwrap();
        assert_eq!(target.report_key, Some(key));
        assert_eq!(target.section, Some(2));

        backend.set_status(&key, DraftStatus::Submitted);
        let done = resume_target(&backend, &bridge, &owner, 5).await.unwrap();
        assert_eq!(done.status, DraftStatus::Submitted);
        assert_eq!(done.section, None);
        assert_eq!(backend.save_attempts(), 0);
    }
}
