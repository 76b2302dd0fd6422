//! In-memory remote store and local cache for engine tests.
//!
//! `MemoryBackend` implements `ReportLifecycle` and hands out one
//! `SectionAdapter` per slot. Failures, latency and an in-flight counter can
//! be injected. Lock guards are never held across an await.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};

use folio_types::cache::CacheEntry;
use folio_types::draft::{DraftKey, DraftStatus, ExistingReport, OwnerKey, ReportKey};
use folio_types::error::{CacheError, ConflictError, PersistenceError, RemoteError};
use folio_types::section::{BasicInfo, SectionData, SectionKind};

use crate::cache::LocalCache;
use crate::repository::report::ReportLifecycle;
use crate::repository::section::SectionAdapter;
use crate::section::registry::SectionRegistry;

#[derive(Debug, Clone)]
pub struct StoredReport {
    pub owner: OwnerKey,
    pub status: DraftStatus,
    pub completed: BTreeSet<usize>,
    pub sections: BTreeMap<usize, SectionData>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default)]
struct BackendState {
    reports: BTreeMap<ReportKey, StoredReport>,
    save_attempts: usize,
    save_log: Vec<(usize, SectionData)>,
    fail_saves: u32,
    save_delay: Option<Duration>,
    in_flight: usize,
    max_in_flight: usize,
    create_calls: usize,
    finalize_calls: usize,
    finalize_effects: usize,
    fail_finalize: u32,
    fail_find: bool,
}

#[derive(Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<BackendState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BackendState> {
        self.state.lock().unwrap()
    }

    pub fn adapter(&self, index: usize) -> MemorySectionAdapter {
        MemorySectionAdapter {
            backend: self.clone(),
            index,
        }
    }

    /// Insert an empty in-progress report for `owner`.
    pub fn seed_report(&self, owner: &str) -> ReportKey {
        let key = ReportKey::new();
        self.lock().reports.insert(
            key,
            StoredReport {
                owner: OwnerKey::new(owner),
                status: DraftStatus::InProgress,
                completed: BTreeSet::new(),
                sections: BTreeMap::new(),
                updated_at: Utc::now(),
            },
        );
        key
    }

    pub fn seed_section(&self, key: &ReportKey, index: usize, data: SectionData) {
        let mut state = self.lock();
        if let Some(report) = state.reports.get_mut(key) {
            report.sections.insert(index, data);
            report.updated_at = Utc::now();
        }
    }

    pub fn seed_completed(&self, key: &ReportKey, indices: impl IntoIterator<Item = usize>) {
        let mut state = self.lock();
        if let Some(report) = state.reports.get_mut(key) {
            report.completed.extend(indices);
        }
    }

    pub fn set_status(&self, key: &ReportKey, status: DraftStatus) {
        if let Some(report) = self.lock().reports.get_mut(key) {
            report.status = status;
        }
    }

    pub fn fail_next_saves(&self, count: u32) {
        self.lock().fail_saves = count;
    }

    pub fn fail_next_finalize(&self, count: u32) {
        self.lock().fail_finalize = count;
    }

    pub fn fail_find(&self, fail: bool) {
        self.lock().fail_find = fail;
    }

    pub fn set_save_delay(&self, delay: Option<Duration>) {
        self.lock().save_delay = delay;
    }

    pub fn report(&self, key: &ReportKey) -> Option<StoredReport> {
        self.lock().reports.get(key).cloned()
    }

    pub fn section(&self, key: &ReportKey, index: usize) -> Option<SectionData> {
        self.lock()
            .reports
            .get(key)
            .and_then(|r| r.sections.get(&index).cloned())
    }

    pub fn save_attempts(&self) -> usize {
        self.lock().save_attempts
    }

    /// Successful section saves, in order.
    pub fn save_log(&self) -> Vec<(usize, SectionData)> {
        self.lock().save_log.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.lock().max_in_flight
    }

    pub fn create_calls(&self) -> usize {
        self.lock().create_calls
    }

    pub fn finalize_calls(&self) -> usize {
        self.lock().finalize_calls
    }

    /// Finalize calls that actually changed the report.
    pub fn finalize_effects(&self) -> usize {
        self.lock().finalize_effects
    }
}

impl ReportLifecycle for MemoryBackend {
    async fn find_existing(&self, owner: &OwnerKey) -> Result<ExistingReport, PersistenceError> {
        let state = self.lock();
        if state.fail_find {
            return Err(PersistenceError::Unavailable("injected".into()));
        }
        let best = state
            .reports
            .iter()
            .filter(|(_, r)| &r.owner == owner)
            .max_by_key(|(_, r)| (r.status == DraftStatus::InProgress, r.updated_at));
        Ok(match best {
            Some((key, report)) => ExistingReport {
                status: report.status,
                report_key: Some(*key),
                completed_sections: report.completed.iter().copied().collect(),
                updated_at: Some(report.updated_at),
            },
            None => ExistingReport::none(),
        })
    }

    async fn create(&self, owner: &OwnerKey, basic: &BasicInfo) -> Result<ReportKey, RemoteError> {
        let key = ReportKey::new();
        let mut state = self.lock();
        state.create_calls += 1;
        state.reports.insert(
            key,
            StoredReport {
                owner: owner.clone(),
                status: DraftStatus::InProgress,
                completed: BTreeSet::new(),
                sections: BTreeMap::from([(0, SectionData::BasicInfo(basic.clone()))]),
                updated_at: Utc::now(),
            },
        );
        Ok(key)
    }

    async fn confirm_section(&self, key: &ReportKey, index: usize) -> Result<(), PersistenceError> {
        let mut state = self.lock();
        let report = state.reports.get_mut(key).ok_or(ConflictError::NotFound)?;
        if report.status == DraftStatus::Submitted {
            return Err(ConflictError::AlreadyFinalized.into());
        }
        report.completed.insert(index);
        report.updated_at = Utc::now();
        Ok(())
    }

    async fn finalize(&self, key: &ReportKey) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.finalize_calls += 1;
        if state.fail_finalize > 0 {
            state.fail_finalize -= 1;
            return Err(PersistenceError::Unavailable("injected".into()).into());
        }
        let report = state.reports.get_mut(key).ok_or(ConflictError::NotFound)?;
        if report.status == DraftStatus::Submitted {
            return Err(ConflictError::AlreadyFinalized.into());
        }
        report.status = DraftStatus::Submitted;
        report.updated_at = Utc::now();
        state.finalize_effects += 1;
        Ok(())
    }
}

pub struct MemorySectionAdapter {
    backend: MemoryBackend,
    index: usize,
}

/// Decrements the in-flight counter even when the save is cancelled.
struct InFlight(MemoryBackend);

impl Drop for InFlight {
    fn drop(&mut self) {
        if let Ok(mut state) = self.0.state.lock() {
            state.in_flight -= 1;
        }
    }
}

impl SectionAdapter for MemorySectionAdapter {
    async fn load(&self, key: &ReportKey) -> Result<Option<SectionData>, PersistenceError> {
        Ok(self.backend.section(key, self.index))
    }

    async fn save(&self, key: &ReportKey, data: &SectionData) -> Result<(), PersistenceError> {
        let delay = {
            let mut state = self.backend.lock();
            state.save_attempts += 1;
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.save_delay
        };
        let _in_flight = InFlight(self.backend.clone());
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.backend.lock();
        if state.fail_saves > 0 {
            state.fail_saves -= 1;
            return Err(PersistenceError::Unavailable("injected".into()));
        }
        let report = state.reports.get_mut(key).ok_or(ConflictError::NotFound)?;
        if report.status == DraftStatus::Submitted {
            return Err(ConflictError::AlreadyFinalized.into());
        }
        report.sections.insert(self.index, data.clone());
        report.updated_at = Utc::now();
        state.save_log.push((self.index, data.clone()));
        Ok(())
    }
}

/// The five-section report wired to `backend`.
pub fn school_registry(backend: &MemoryBackend) -> SectionRegistry {
    SectionRegistry::builder()
        .section("Basic information", SectionKind::BasicInfo, backend.adapter(0))
        .section("Enrollment", SectionKind::Enrollment, backend.adapter(1))
        .section("Attendance", SectionKind::Attendance, backend.adapter(2))
        .section("Finance", SectionKind::Finance, backend.adapter(3))
        .section("Declaration", SectionKind::Declaration, backend.adapter(4))
        .build()
}

#[derive(Default)]
pub struct MemoryCache {
    entries: Mutex<HashMap<(OwnerKey, String), CacheEntry>>,
    unavailable: AtomicBool,
}

impl MemoryCache {
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    fn check(&self) -> Result<(), CacheError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(CacheError::Unavailable("injected".into()));
        }
        Ok(())
    }
}

impl LocalCache for MemoryCache {
    fn read(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<Option<CacheEntry>, CacheError> {
        self.check()?;
        let entries = self.entries.lock().unwrap();
        Ok(entries.get(&(owner.clone(), draft_key.to_string())).cloned())
    }

    fn write(&self, entry: &CacheEntry) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .insert((entry.owner_key.clone(), entry.draft_key.clone()), entry.clone());
        Ok(())
    }

    fn remove(&self, owner: &OwnerKey, draft_key: &DraftKey) -> Result<(), CacheError> {
        self.check()?;
        self.entries
            .lock()
            .unwrap()
            .remove(&(owner.clone(), draft_key.to_string()));
        Ok(())
    }
}
