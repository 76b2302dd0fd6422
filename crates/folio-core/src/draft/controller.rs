//! Draft Controller: orchestrates the registry, progress store, cache bridge
//! and auto-save scheduler for one owner's draft.
//!
//! Phases:
//!
//! ```text
//! Uninitialized -> Loading -> { NoDraft | ResumingDraft | ViewingSubmitted }
//! NoDraft | ResumingDraft -> Editing <-> SavingSection -> { Editing | Submitting }
//! Submitting -> Submitted
//! ```
//!
//! Two persistence layers run side by side: every edit is mirrored to the
//! local cache and handed to the scheduler for a best-effort background
//! save, while `save_section` is an authoritative, awaited confirmation that
//! gates moving forward. Both go through the same [`SaveGate`].

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use folio_types::autosave::SaveStatus;
use folio_types::cache::FormSnapshot;
use folio_types::config::AutoSaveConfig;
use folio_types::draft::{Draft, DraftKey, DraftStatus, ExistingReport, OwnerKey, ReportKey};
use folio_types::error::{
    ConflictError, DraftError, PersistenceError, RemoteError, ValidationError,
};
use folio_types::section::{BasicInfo, SectionData, SectionKind};

use super::resume::{cached_edit_to_merge, resolve_resume_section};
use crate::autosave::{AutoSaveContext, AutoSaveHandle, SaveGate};
use crate::cache::{CacheBridge, LocalCache};
use crate::progress::ProgressStore;
use crate::repository::report::ReportLifecycle;
use crate::section::registry::SectionRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftPhase {
    Uninitialized,
    Loading,
    NoDraft,
    ResumingDraft,
    ViewingSubmitted,
    Editing,
    SavingSection,
    Submitting,
    Submitted,
}

/// What `load` found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No report yet. Unsaved edits cached under `"draft"` were restored if
    /// `restored_local_edits`.
    NoDraft { restored_local_edits: bool },
    Resumed {
        report_key: ReportKey,
        resume_section: usize,
        /// The cached copy of the resume section replaced the remote one.
        restored_local_edits: bool,
    },
    ViewingSubmitted { report_key: ReportKey },
}

/// Result of an explicit save of the current section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Advanced { next_section: usize },
    /// The last section was confirmed but earlier ones are still open; the
    /// controller moved to the earliest of them.
    Incomplete { missing: Vec<usize> },
    Submitted,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionSummary {
    pub index: usize,
    pub title: String,
    pub kind: SectionKind,
    pub completion_percent: u8,
    pub confirmed: bool,
}

/// Serializable snapshot of the controller for presentation layers.
#[derive(Debug, Clone, Serialize)]
pub struct DraftSummary {
    pub owner: String,
    pub status: DraftStatus,
    pub report_key: Option<ReportKey>,
    pub phase: DraftPhase,
    pub current_section: usize,
    pub completed_sections: Vec<usize>,
    pub overall_progress: u8,
    pub sections: Vec<SectionSummary>,
    pub sync: Option<SaveStatus>,
}

pub struct DraftController<L, C> {
    owner: OwnerKey,
    registry: Arc<SectionRegistry>,
    lifecycle: L,
    cache: Arc<CacheBridge<C>>,
    config: AutoSaveConfig,
    gate: SaveGate,
    phase: DraftPhase,
    draft: Draft,
    progress: ProgressStore,
    /// In-memory form state.
    form: BTreeMap<usize, SectionData>,
    /// Last content known to be in the remote store, per section.
    remote: BTreeMap<usize, SectionData>,
    /// Bumped on every edit; lets the scheduler tell stale snapshots apart.
    revision: u64,
    autosave: Option<AutoSaveHandle>,
}

impl<L, C> DraftController<L, C>
where
    L: ReportLifecycle,
    C: LocalCache + 'static,
{
    pub fn new(
        owner: OwnerKey,
        registry: Arc<SectionRegistry>,
        lifecycle: L,
        cache: CacheBridge<C>,
        config: AutoSaveConfig,
    ) -> Self {
        let section_count = registry.len();
        Self {
            draft: Draft::new(owner.clone()),
            owner,
            registry,
            lifecycle,
            cache: Arc::new(cache),
            config,
            gate: SaveGate::new(),
            phase: DraftPhase::Uninitialized,
            progress: ProgressStore::new(section_count),
            form: BTreeMap::new(),
            remote: BTreeMap::new(),
            revision: 0,
            autosave: None,
        }
    }

    // -- queries -----------------------------------------------------------

    pub fn phase(&self) -> DraftPhase {
        self.phase
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    pub fn progress(&self) -> &ProgressStore {
        &self.progress
    }

    pub fn registry(&self) -> &SectionRegistry {
        &self.registry
    }

    pub fn current_section(&self) -> usize {
        self.progress.current()
    }

    /// In-memory payload of a section, or an empty one if never touched.
    pub fn section_data(&self, index: usize) -> Result<SectionData, ValidationError> {
        match self.form.get(&index) {
            Some(data) => Ok(data.clone()),
            None => self.registry.empty_payload(index),
        }
    }

    pub fn is_read_only(&self) -> bool {
        self.draft.status.is_terminal() || self.phase == DraftPhase::ViewingSubmitted
    }

    /// Latest scheduler status, if a scheduler is running.
    pub fn sync_status(&self) -> Option<SaveStatus> {
        self.autosave.as_ref().map(AutoSaveHandle::status)
    }

    pub fn subscribe_status(&self) -> Option<watch::Receiver<SaveStatus>> {
        self.autosave.as_ref().map(AutoSaveHandle::subscribe)
    }

    pub fn summary(&self) -> DraftSummary {
        let sections = self
            .registry
            .iter()
            .map(|(index, def)| SectionSummary {
                index,
                title: def.title.clone(),
                kind: def.kind,
                completion_percent: self.progress.section_progress(index),
                confirmed: self.progress.is_complete(index),
            })
            .collect();
        DraftSummary {
            owner: self.owner.to_string(),
            status: self.draft.status,
            report_key: self.draft.draft_id,
            phase: self.phase,
            current_section: self.progress.current(),
            completed_sections: self.progress.completed().iter().copied().collect(),
            overall_progress: self.progress.overall_progress(),
            sections,
            sync: self.sync_status(),
        }
    }

    // -- load --------------------------------------------------------------

    /// Resolve the owner's draft and decide which section to show.
    ///
    /// Only valid once per controller; a reload is a fresh controller. A
    /// failed lookup leaves the controller uninitialized so `load` can be
    /// retried.
    pub async fn load(&mut self) -> Result<LoadOutcome, DraftError> {
        if self.phase != DraftPhase::Uninitialized {
            return Err(DraftError::ReloadRequired(
                "controller already loaded".to_string(),
            ));
        }
        self.phase = DraftPhase::Loading;
        debug!(owner = %self.owner, "loading draft");

        let existing = match self.lifecycle.find_existing(&self.owner).await {
            Ok(existing) => existing,
            Err(err) => {
                self.phase = DraftPhase::Uninitialized;
                return Err(err.into());
            }
        };

        let outcome = match (existing.status, existing.report_key) {
            (DraftStatus::Submitted, Some(key)) => self.load_submitted(key, &existing).await,
            (DraftStatus::InProgress, Some(key)) => self.resume(key, &existing).await,
            _ => Ok(self.start_fresh()),
        };
        if outcome.is_err() {
            self.phase = DraftPhase::Uninitialized;
        }
        outcome
    }

    fn start_fresh(&mut self) -> LoadOutcome {
        self.phase = DraftPhase::NoDraft;
        self.draft = Draft::new(self.owner.clone());
        self.progress = ProgressStore::new(self.registry.len());

        let mut restored = false;
        if let Some(entry) = self.cache.read(&self.owner, &DraftKey::Unsaved) {
            for (index, data) in entry.snapshot.sections {
                if self.registry.check_kind(index, &data).is_err() {
                    warn!(owner = %self.owner, section = index, "dropping cached section of the wrong kind");
                    continue;
                }
                self.progress
                    .update_section_progress(index, data.completion_percent());
                self.form.insert(index, data);
                restored = true;
            }
        }

        info!(owner = %self.owner, restored, "no existing draft");
        self.phase = DraftPhase::Editing;
        LoadOutcome::NoDraft {
            restored_local_edits: restored,
        }
    }

    async fn load_submitted(
        &mut self,
        key: ReportKey,
        existing: &ExistingReport,
    ) -> Result<LoadOutcome, DraftError> {
        self.draft.draft_id = Some(key);
        self.draft.status = DraftStatus::Submitted;
        self.progress = ProgressStore::seeded(
            self.registry.len(),
            existing.completed_sections.iter().copied(),
        );
        self.load_sections(key).await?;

        // A submitted remote always beats the cache.
        self.cache.clear(&self.owner, &DraftKey::Report(key));
        self.cache.clear(&self.owner, &DraftKey::Unsaved);
        self.progress.seal();

        info!(owner = %self.owner, report_key = %key, "draft already submitted, read-only");
        self.phase = DraftPhase::ViewingSubmitted;
        Ok(LoadOutcome::ViewingSubmitted { report_key: key })
    }

    async fn resume(
        &mut self,
        key: ReportKey,
        existing: &ExistingReport,
    ) -> Result<LoadOutcome, DraftError> {
        self.phase = DraftPhase::ResumingDraft;
        self.draft.draft_id = Some(key);
        self.draft.status = DraftStatus::InProgress;
        self.progress = ProgressStore::seeded(
            self.registry.len(),
            existing.completed_sections.iter().copied(),
        );
        self.load_sections(key).await?;

        let cached = self.cache.read(&self.owner, &DraftKey::Report(key));
        let section = resolve_resume_section(&self.progress, cached.as_ref());
        self.progress.set_current(section);

        let merged = cached
            .as_ref()
            .and_then(|entry| {
                cached_edit_to_merge(section, &self.progress, entry, self.remote.get(&section))
            })
            .filter(|data| self.registry.check_kind(section, data).is_ok());
        let restored = merged.is_some();

        if let Some(entry) = &cached {
            let dropped: Vec<usize> = entry
                .dirty_sections()
                .into_iter()
                .filter(|&index| !(restored && index == section))
                .filter(|index| entry.snapshot.sections.get(index) != self.remote.get(index))
                .collect();
            if !dropped.is_empty() {
                debug!(owner = %self.owner, sections = ?dropped, "discarding cached edits not restored on resume");
            }
        }

        self.spawn_autosave(key);
        self.cache.write_reconciled(
            &self.owner,
            &DraftKey::Report(key),
            &self.snapshot(),
            &self.remote,
        );
        if let Some(data) = merged {
            debug!(owner = %self.owner, section, "restoring unsynced local edits");
            self.apply_edit(section, data);
        }

        info!(
            owner = %self.owner,
            report_key = %key,
            resume_section = section,
            completed = self.progress.completed().len(),
            restored,
            "resumed draft"
        );
        self.phase = DraftPhase::Editing;
        Ok(LoadOutcome::Resumed {
            report_key: key,
            resume_section: section,
            restored_local_edits: restored,
        })
    }

    /// Pull every section from the remote into `form` and `remote`.
    async fn load_sections(&mut self, key: ReportKey) -> Result<(), PersistenceError> {
        self.form.clear();
        self.remote.clear();
        for index in 0..self.registry.len() {
            let loaded = self.registry.load(index, &key).await?;
            match loaded {
                Some(data) if self.registry.check_kind(index, &data).is_ok() => {
                    self.progress
                        .update_section_progress(index, data.completion_percent());
                    self.form.insert(index, data.clone());
                    self.remote.insert(index, data);
                }
                Some(data) => {
                    warn!(report_key = %key, section = index, kind = %data.kind(), "remote returned a payload of the wrong kind");
                    self.progress.update_section_progress(index, 0);
                }
                None => self.progress.update_section_progress(index, 0),
            }
        }
        Ok(())
    }

    fn spawn_autosave(&mut self, key: ReportKey) {
        if self.autosave.is_some() {
            return;
        }
        self.autosave = Some(AutoSaveHandle::spawn(AutoSaveContext {
            owner: self.owner.clone(),
            report_key: key,
            registry: Arc::clone(&self.registry),
            cache: Arc::clone(&self.cache),
            gate: self.gate.clone(),
            config: self.config.clone(),
        }));
    }

    // -- editing -----------------------------------------------------------

    fn ensure_loaded(&self) -> Result<(), DraftError> {
        match self.phase {
            DraftPhase::Uninitialized | DraftPhase::Loading => Err(DraftError::NotLoaded),
            _ => Ok(()),
        }
    }

    fn ensure_editable(&self) -> Result<(), DraftError> {
        self.ensure_loaded()?;
        if self.is_read_only() {
            return Err(DraftError::ReadOnly);
        }
        Ok(())
    }

    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot {
            sections: self.form.clone(),
            current_section: self.progress.current(),
        }
    }

    /// Write the in-memory form to the local cache.
    fn mirror(&self) {
        self.cache
            .write(&self.owner, &self.draft.cache_key(), &self.snapshot());
    }

    fn apply_edit(&mut self, index: usize, data: SectionData) {
        self.progress
            .update_section_progress(index, data.completion_percent());
        self.form.insert(index, data.clone());
        self.mirror();
        self.revision += 1;
        if self.progress.is_complete(index) {
            // Confirmed content only changes through `save_section`.
            debug!(owner = %self.owner, section = index, "edit to a confirmed section held locally");
            return;
        }
        if let Some(autosave) = &self.autosave {
            autosave.schedule(index, data, self.revision);
        }
    }

    /// Replace a section's in-memory payload.
    ///
    /// Mirrors to the cache synchronously. Feeds the scheduler unless the
    /// section is already confirmed. Never touches the completed set.
    pub fn edit(&mut self, index: usize, data: SectionData) -> Result<(), DraftError> {
        self.ensure_editable()?;
        self.registry.check_kind(index, &data)?;
        self.apply_edit(index, data);
        Ok(())
    }

    /// Set one field from its textual form; see [`edit`](Self::edit).
    pub fn set_field(&mut self, index: usize, field: &str, value: &str) -> Result<(), DraftError> {
        self.ensure_editable()?;
        let mut data = self.section_data(index)?;
        data.set_field(field, value)?;
        self.apply_edit(index, data);
        Ok(())
    }

    // -- navigation --------------------------------------------------------

    /// Show another section. Never calls the remote, never changes the
    /// completed set. Out-of-range indices are clamped.
    pub fn go_to(&mut self, index: usize) -> Result<usize, DraftError> {
        self.ensure_loaded()?;
        let selected = self.progress.set_current(index);
        if !self.is_read_only() {
            self.mirror();
        }
        Ok(selected)
    }

    pub fn next_section(&mut self) -> Result<usize, DraftError> {
        let target = self.progress.current() + 1;
        self.go_to(target)
    }

    pub fn prev_section(&mut self) -> Result<usize, DraftError> {
        let target = self.progress.current().saturating_sub(1);
        self.go_to(target)
    }

    // -- explicit persistence ----------------------------------------------

    /// Validate and confirm the current section with the remote store, then
    /// advance. Saving the last section finalizes once every section is
    /// complete.
    ///
    /// A failed remote call leaves the controller in `Editing` with the
    /// entered data intact.
    pub async fn save_section(&mut self) -> Result<SaveOutcome, DraftError> {
        self.ensure_editable()?;
        let index = self.progress.current();
        let data = self.section_data(index)?;
        self.registry.validate(index, &data)?;
        if self.draft.draft_id.is_none() && index != 0 {
            return Err(ValidationError::DraftNotStarted(index).into());
        }

        self.phase = DraftPhase::SavingSection;
        let key = match self.confirm(index, &data).await {
            Ok(key) => key,
            Err(DraftError::Persistence(PersistenceError::Conflict(conflict))) => {
                self.phase = DraftPhase::Editing;
                return self.settle_section_conflict(index, &data, conflict).await;
            }
            Err(err) => {
                warn!(owner = %self.owner, section = index, error = %err, "section confirmation failed");
                self.phase = DraftPhase::Editing;
                return Err(err);
            }
        };

        self.progress.mark_complete(index);
        self.remote.insert(index, data.clone());
        info!(owner = %self.owner, report_key = %key, section = index, "section confirmed");

        if index == self.registry.last_index() {
            if self.progress.all_complete() {
                self.phase = DraftPhase::Editing;
                self.finalize().await?;
                return Ok(SaveOutcome::Submitted);
            }
            let missing = self.progress.missing_sections();
            self.progress.set_current(self.progress.next_incomplete_section());
            self.mirror();
            self.cache
                .mark_synced(&self.owner, &DraftKey::Report(key), index, &data);
            self.phase = DraftPhase::Editing;
            return Ok(SaveOutcome::Incomplete { missing });
        }

        let next = self.progress.set_current(index + 1);
        self.mirror();
        self.cache
            .mark_synced(&self.owner, &DraftKey::Report(key), index, &data);
        self.phase = DraftPhase::Editing;
        Ok(SaveOutcome::Advanced { next_section: next })
    }

    /// Remote half of `save_section`: create the report if needed, then
    /// write and confirm the section while holding the save gate.
    async fn confirm(&mut self, index: usize, data: &SectionData) -> Result<ReportKey, DraftError> {
        let revision = self.revision;
        let key = match self.draft.draft_id {
            Some(key) => key,
            None => self.create_draft(data).await?,
        };

        let mut ledger = self.gate.acquire().await;
        let save = self.registry.save(index, &key, data);
        match tokio::time::timeout(self.config.save_timeout(), save).await {
            Ok(result) => result?,
            Err(_) => return Err(PersistenceError::Timeout.into()),
        }
        self.lifecycle.confirm_section(&key, index).await?;
        ledger.record(index, revision);
        drop(ledger);

        if let Some(autosave) = &self.autosave {
            autosave.confirmed(index, revision);
        }
        Ok(key)
    }

    /// The remote refused a section write. Success only if the report is
    /// already submitted with exactly this content; anything else needs a
    /// reload.
    async fn settle_section_conflict(
        &mut self,
        index: usize,
        data: &SectionData,
        conflict: ConflictError,
    ) -> Result<SaveOutcome, DraftError> {
        warn!(owner = %self.owner, section = index, error = %conflict, "remote refused section write");
        let Some(key) = self.draft.draft_id else {
            return Err(DraftError::ReloadRequired(conflict.to_string()));
        };
        let existing = self.lifecycle.find_existing(&self.owner).await?;
        if existing.report_key == Some(key) && existing.status == DraftStatus::Submitted {
            let stored = self.registry.load(index, &key).await?;
            if stored.as_ref() == Some(data) {
                info!(owner = %self.owner, report_key = %key, section = index, "section already stored in the submitted report");
                self.enter_submitted(key).await;
                return Ok(SaveOutcome::Submitted);
            }
        }
        Err(DraftError::ReloadRequired(conflict.to_string()))
    }

    async fn create_draft(&mut self, data: &SectionData) -> Result<ReportKey, DraftError> {
        let basic = match data {
            SectionData::BasicInfo(basic) => basic.clone(),
            _ => BasicInfo::default(),
        };
        let key = {
            let _gate = self.gate.acquire().await;
            self.lifecycle.create(&self.owner, &basic).await?
        };

        self.draft.draft_id = Some(key);
        self.draft.status = DraftStatus::InProgress;
        self.cache
            .rekey(&self.owner, &DraftKey::Unsaved, &DraftKey::Report(key));
        self.spawn_autosave(key);
        info!(owner = %self.owner, report_key = %key, "draft created");
        Ok(key)
    }

    /// Move the draft to `submitted`.
    ///
    /// Idempotent: on an already submitted draft this returns `Ok` without
    /// calling the remote. Requires every section to be confirmed. On a
    /// failure the draft stays `in_progress` and finalize can be retried.
    pub async fn finalize(&mut self) -> Result<(), DraftError> {
        self.ensure_loaded()?;
        if self.draft.status == DraftStatus::Submitted {
            debug!(owner = %self.owner, "finalize on a submitted draft, nothing to do");
            return Ok(());
        }
        let missing = self.progress.missing_sections();
        if !missing.is_empty() {
            return Err(ValidationError::IncompleteSections(missing).into());
        }
        let Some(key) = self.draft.draft_id else {
            return Err(ValidationError::DraftNotStarted(0).into());
        };

        self.phase = DraftPhase::Submitting;
        if let Err(err) = self.confirm_held_edits().await {
            self.phase = DraftPhase::Editing;
            return Err(err);
        }
        if let Some(autosave) = &self.autosave {
            if let Err(err) = autosave.flush().await {
                warn!(owner = %self.owner, report_key = %key, error = %err, "pending edits could not be synced before finalize");
                self.phase = DraftPhase::Editing;
                return Err(err.into());
            }
        }

        let result = {
            let _gate = self.gate.acquire().await;
            self.lifecycle.finalize(&key).await
        };
        match result {
            Ok(()) => {}
            Err(RemoteError::Conflict(conflict)) => {
                let remote = self.lifecycle.find_existing(&self.owner).await;
                match remote {
                    Ok(existing)
                        if existing.report_key == Some(key)
                            && existing.status == DraftStatus::Submitted =>
                    {
                        info!(owner = %self.owner, report_key = %key, "report was already finalized remotely");
                    }
                    Ok(_) => {
                        self.phase = DraftPhase::Editing;
                        return Err(DraftError::ReloadRequired(conflict.to_string()));
                    }
                    Err(err) => {
                        self.phase = DraftPhase::Editing;
                        return Err(err.into());
                    }
                }
            }
            Err(err) => {
                warn!(owner = %self.owner, report_key = %key, error = %err, "finalize failed");
                self.phase = DraftPhase::Editing;
                return Err(err.into());
            }
        }

        self.enter_submitted(key).await;
        info!(owner = %self.owner, report_key = %key, "draft submitted");
        Ok(())
    }

    /// Edits made to confirmed sections since they were confirmed. Each is
    /// validated and confirmed before the report is submitted; an invalid
    /// one stops the submission and becomes the current section.
    async fn confirm_held_edits(&mut self) -> Result<(), DraftError> {
        let held: Vec<(usize, SectionData)> = self
            .progress
            .completed()
            .iter()
            .filter_map(|&index| {
                let data = self.form.get(&index)?;
                (self.remote.get(&index) != Some(data)).then(|| (index, data.clone()))
            })
            .collect();

        for (index, data) in held {
            if let Err(err) = self.registry.validate(index, &data) {
                self.progress.set_current(index);
                self.mirror();
                return Err(err.into());
            }
            let key = self.confirm(index, &data).await?;
            self.remote.insert(index, data.clone());
            self.cache
                .mark_synced(&self.owner, &DraftKey::Report(key), index, &data);
            info!(owner = %self.owner, report_key = %key, section = index, "held edit confirmed before submission");
        }
        Ok(())
    }

    /// Adopt the submitted state: stop background saves, purge the cache and
    /// lock the progress store.
    async fn enter_submitted(&mut self, key: ReportKey) {
        self.draft.status = DraftStatus::Submitted;
        if let Some(autosave) = self.autosave.take() {
            autosave.disable();
            autosave.shutdown().await;
        }
        self.cache.clear(&self.owner, &DraftKey::Report(key));
        self.cache.clear(&self.owner, &DraftKey::Unsaved);
        self.progress.reset();
        self.progress.seal();
        self.phase = DraftPhase::Submitted;
    }

    /// Push pending background edits now. A no-op once submitted or before
    /// the report exists.
    pub async fn save_now(&mut self) -> Result<(), DraftError> {
        self.ensure_loaded()?;
        if self.is_read_only() {
            return Ok(());
        }
        match &self.autosave {
            Some(autosave) => autosave.flush().await.map_err(DraftError::from),
            None => Ok(()),
        }
    }

    /// Throw away local unsynced edits and reload from the remote.
    pub async fn discard(&mut self) -> Result<(), DraftError> {
        self.ensure_editable()?;
        if let Some(autosave) = &self.autosave {
            autosave.discard_pending();
            // Waits for a save that already started.
            if let Err(err) = autosave.flush().await {
                debug!(error = %err, "in-flight save failed during discard");
            }
        }
        self.cache.clear(&self.owner, &self.draft.cache_key());

        match self.draft.draft_id {
            Some(key) => self.load_sections(key).await?,
            None => {
                self.form.clear();
                for index in 0..self.registry.len() {
                    self.progress.update_section_progress(index, 0);
                }
            }
        }
        info!(owner = %self.owner, "local edits discarded");
        Ok(())
    }

    /// End the sitting: write what is pending and stop the scheduler.
    pub async fn close(mut self) {
        if let Some(autosave) = self.autosave.take() {
            autosave.shutdown().await;
        }
        debug!(owner = %self.owner, "draft controller closed");
    }
}
