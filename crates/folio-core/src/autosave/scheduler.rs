//! Auto-Save Scheduler.
//!
//! A single background task per draft turns a stream of edits into debounced
//! remote saves. The task owns all save bookkeeping; callers talk to it
//! through [`AutoSaveHandle`] over an unbounded command channel and observe
//! it through a `watch` channel of [`SaveStatus`].
//!
//! Follows a `tokio::select!` single-loop shape: one branch for commands,
//! one for the in-flight save, one for the debounce/backoff deadline.
//!
//! - One pending snapshot per section. A newer edit replaces the older one.
//! - At most one save in flight. The flight also holds the [`SaveGate`], so
//!   explicit confirmations and background saves never overlap.
//! - An in-flight save is never cancelled by a later edit; the edit is
//!   picked up once the flight lands.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};

use folio_types::autosave::{SaveState, SaveStatus, SyncIndicator};
use folio_types::config::AutoSaveConfig;
use folio_types::draft::{DraftKey, OwnerKey, ReportKey};
use folio_types::error::PersistenceError;
use folio_types::section::SectionData;

use super::gate::SaveGate;
use super::retry::RetryPolicy;
use crate::cache::{CacheBridge, LocalCache};
use crate::section::registry::SectionRegistry;

/// Everything a background save needs. Shared with each in-flight future.
pub struct AutoSaveContext<C> {
    pub owner: OwnerKey,
    pub report_key: ReportKey,
    pub registry: Arc<SectionRegistry>,
    pub cache: Arc<CacheBridge<C>>,
    pub gate: SaveGate,
    pub config: AutoSaveConfig,
}

type Reply = oneshot::Sender<Result<(), PersistenceError>>;

enum Command {
    Schedule {
        section: usize,
        data: SectionData,
        revision: u64,
    },
    Confirmed {
        section: usize,
        revision: u64,
    },
    DiscardPending,
    Flush {
        reply: Reply,
    },
    Disable,
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

// ---------------------------------------------------------------------------
// AutoSaveHandle
// ---------------------------------------------------------------------------

/// Caller side of the scheduler task.
pub struct AutoSaveHandle {
    tx: mpsc::UnboundedSender<Command>,
    status: watch::Receiver<SaveStatus>,
    task: JoinHandle<()>,
}

impl AutoSaveHandle {
    /// Spawn the scheduler task on the current runtime.
    pub fn spawn<C: LocalCache + 'static>(ctx: AutoSaveContext<C>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, status) = watch::channel(SaveStatus::default());
        let worker = Worker::new(Arc::new(ctx), rx, status_tx);
        let task = tokio::spawn(worker.run());
        Self { tx, status, task }
    }

    fn send(&self, command: Command) {
        if self.tx.send(command).is_err() {
            warn!("auto-save task is gone, command dropped");
        }
    }

    /// Queue `data` as the newest snapshot of `section` and restart the
    /// debounce window. `revision` must increase with every edit.
    pub fn schedule(&self, section: usize, data: SectionData, revision: u64) {
        self.send(Command::Schedule {
            section,
            data,
            revision,
        });
    }

    /// An explicit confirmation wrote `section` with every edit up to
    /// `revision`; drop the pending snapshot if it is not newer.
    pub fn confirmed(&self, section: usize, revision: u64) {
        self.send(Command::Confirmed { section, revision });
    }

    /// Forget every pending snapshot. An in-flight save still lands.
    pub fn discard_pending(&self) {
        self.send(Command::DiscardPending);
    }

    /// Save everything pending now, skipping the debounce window.
    ///
    /// Waits behind a save already in flight. Resolves with the outcome of
    /// the first save attempt that runs after the call; a failure leaves the
    /// background retry schedule in place.
    pub async fn flush(&self) -> Result<(), PersistenceError> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Flush { reply });
        rx.await
            .unwrap_or_else(|_| Err(PersistenceError::Unavailable("auto-save task stopped".into())))
    }

    /// Turn every later `schedule` and `flush` into a no-op.
    pub fn disable(&self) {
        self.send(Command::Disable);
    }

    /// Try to write what is still pending, then stop the task.
    ///
    /// Failures at this point are not retried; the unsynced snapshot stays
    /// in the local cache for the next sitting.
    pub async fn shutdown(self) {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Shutdown { reply });
        let _ = rx.await;
        if let Err(err) = self.task.await {
            error!(error = %err, "auto-save task panicked");
        }
    }

    pub fn status(&self) -> SaveStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SaveStatus> {
        self.status.clone()
    }
}

// ---------------------------------------------------------------------------
// Worker
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
struct Pending {
    data: SectionData,
    revision: u64,
}

struct Flight {
    section: usize,
    pending: Pending,
    /// `Ok(false)` means the snapshot was superseded and nothing was written.
    fut: BoxFuture<'static, Result<bool, PersistenceError>>,
}

enum Event {
    Command(Option<Command>),
    Landed(Result<bool, PersistenceError>),
    Due,
}

struct Worker<C> {
    ctx: Arc<AutoSaveContext<C>>,
    rx: mpsc::UnboundedReceiver<Command>,
    rx_open: bool,
    status_tx: watch::Sender<SaveStatus>,
    pending: BTreeMap<usize, Pending>,
    flight: Option<Flight>,
    deadline: Option<Instant>,
    attempt: u32,
    failed: bool,
    disabled: bool,
    closing: bool,
    waiters: Vec<Reply>,
    shutdown_replies: Vec<oneshot::Sender<()>>,
    last_saved_at: Option<DateTime<Utc>>,
}

impl<C: LocalCache + 'static> Worker<C> {
    fn new(
        ctx: Arc<AutoSaveContext<C>>,
        rx: mpsc::UnboundedReceiver<Command>,
        status_tx: watch::Sender<SaveStatus>,
    ) -> Self {
        Self {
            ctx,
            rx,
            rx_open: true,
            status_tx,
            pending: BTreeMap::new(),
            flight: None,
            deadline: None,
            attempt: 0,
            failed: false,
            disabled: false,
            closing: false,
            waiters: Vec::new(),
            shutdown_replies: Vec::new(),
            last_saved_at: None,
        }
    }

    async fn run(mut self) {
        debug!(report_key = %self.ctx.report_key, "auto-save scheduler started");
        loop {
            self.publish();
            if self.finished() {
                break;
            }

            let deadline = if self.flight.is_none() {
                self.deadline
            } else {
                None
            };
            let event = tokio::select! {
                biased;
                cmd = self.rx.recv(), if self.rx_open => Event::Command(cmd),
                result = land(&mut self.flight) => Event::Landed(result),
                () = fire_at(deadline) => Event::Due,
            };

            match event {
                Event::Command(Some(command)) => self.handle(command),
                Event::Command(None) => {
                    self.rx_open = false;
                    self.begin_close();
                }
                Event::Landed(result) => self.on_landed(result),
                Event::Due => {
                    self.deadline = None;
                    self.launch_next();
                }
            }
        }

        self.settle_waiters(Ok(()));
        for reply in self.shutdown_replies.drain(..) {
            let _ = reply.send(());
        }
        debug!(report_key = %self.ctx.report_key, "auto-save scheduler stopped");
    }

    fn finished(&self) -> bool {
        self.closing
            && self.flight.is_none()
            && (self.pending.is_empty() || self.disabled || self.failed)
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Schedule {
                section,
                data,
                revision,
            } => {
                if self.disabled {
                    return;
                }
                self.pending.insert(section, Pending { data, revision });
                if self.failed {
                    // A fresh edit earns a fresh set of attempts.
                    self.failed = false;
                    self.attempt = 0;
                }
                self.deadline = Some(Instant::now() + self.ctx.config.debounce());
            }
            Command::Confirmed { section, revision } => {
                let stale = self
                    .pending
                    .get(&section)
                    .is_some_and(|p| p.revision <= revision);
                if stale {
                    self.pending.remove(&section);
                }
                if self.pending.is_empty() {
                    self.deadline = None;
                    self.failed = false;
                    self.attempt = 0;
                    if self.flight.is_none() {
                        self.settle_waiters(Ok(()));
                    }
                }
            }
            Command::DiscardPending => {
                self.pending.clear();
                self.deadline = None;
                self.failed = false;
                self.attempt = 0;
                if self.flight.is_none() {
                    self.settle_waiters(Ok(()));
                }
            }
            Command::Flush { reply } => {
                if self.disabled || (self.pending.is_empty() && self.flight.is_none()) {
                    let _ = reply.send(Ok(()));
                    return;
                }
                self.waiters.push(reply);
                if self.failed {
                    self.failed = false;
                    self.attempt = 0;
                }
                if !self.pending.is_empty() {
                    self.deadline = Some(Instant::now());
                }
            }
            Command::Disable => {
                info!(report_key = %self.ctx.report_key, "auto-save disabled");
                self.disabled = true;
                self.pending.clear();
                self.deadline = None;
                self.settle_waiters(Ok(()));
            }
            Command::Shutdown { reply } => {
                self.shutdown_replies.push(reply);
                self.begin_close();
            }
        }
    }

    fn begin_close(&mut self) {
        self.closing = true;
        if !self.pending.is_empty() && !self.failed && !self.disabled {
            self.deadline = Some(Instant::now());
        }
    }

    /// Start saving the lowest pending section.
    fn launch_next(&mut self) {
        if self.flight.is_some() || self.disabled {
            return;
        }
        let Some((section, pending)) = self.pending.pop_first() else {
            return;
        };

        let ctx = Arc::clone(&self.ctx);
        let data = pending.data.clone();
        let revision = pending.revision;
        let attempt = self.attempt + 1;
        debug!(report_key = %ctx.report_key, section, attempt, "background save started");

        let fut = async move {
            let ledger = ctx.gate.acquire().await;
            if ledger.is_superseded(section, revision) {
                debug!(section, revision, "background save superseded by confirmation");
                return Ok(false);
            }
            let save = ctx.registry.save(section, &ctx.report_key, &data);
            match tokio::time::timeout(ctx.config.save_timeout(), save).await {
                Ok(result) => result.map(|()| true),
                Err(_) => Err(PersistenceError::Timeout),
            }
        }
        .boxed();

        self.flight = Some(Flight {
            section,
            pending,
            fut,
        });
    }

    fn on_landed(&mut self, result: Result<bool, PersistenceError>) {
        let Some(flight) = self.flight.take() else {
            return;
        };
        let section = flight.section;

        match result {
            Ok(written) => {
                self.attempt = 0;
                self.failed = false;
                if written {
                    self.last_saved_at = Some(Utc::now());
                    self.ctx.cache.mark_synced(
                        &self.ctx.owner,
                        &DraftKey::Report(self.ctx.report_key),
                        section,
                        &flight.pending.data,
                    );
                    debug!(report_key = %self.ctx.report_key, section, "background save confirmed");
                }
                if self.pending.is_empty() {
                    self.deadline = None;
                    self.settle_waiters(Ok(()));
                } else if self.disabled {
                    self.pending.clear();
                } else if self.closing || !self.waiters.is_empty() || self.deadline.is_none() {
                    self.deadline = Some(Instant::now());
                }
            }
            Err(err) => {
                self.attempt += 1;
                // Keep a newer edit if one arrived while this was in flight.
                if !self.disabled {
                    self.pending.entry(section).or_insert(flight.pending);
                }
                self.settle_waiters(Err(err.clone()));

                if self.disabled {
                    return;
                }
                if self.closing {
                    warn!(report_key = %self.ctx.report_key, section, error = %err, "final background save failed, edits kept locally");
                    self.failed = true;
                    return;
                }
                if !err.is_retryable() {
                    error!(
                        report_key = %self.ctx.report_key,
                        section,
                        error = %err,
                        "remote report no longer accepts edits, saved locally only"
                    );
                    self.failed = true;
                    self.deadline = None;
                    return;
                }
                if RetryPolicy::should_retry(&self.ctx.config, self.attempt) {
                    let delay = RetryPolicy::backoff(&self.ctx.config, self.attempt);
                    warn!(
                        report_key = %self.ctx.report_key,
                        section,
                        attempt = self.attempt,
                        retry_in_ms = delay.as_millis() as u64,
                        error = %err,
                        "background save failed, retrying"
                    );
                    let retry_at = Instant::now() + delay;
                    self.deadline = Some(self.deadline.map_or(retry_at, |d| d.max(retry_at)));
                } else {
                    error!(
                        report_key = %self.ctx.report_key,
                        section,
                        attempt = self.attempt,
                        error = %err,
                        "background save retries exhausted, saved locally only"
                    );
                    self.failed = true;
                    self.deadline = None;
                }
            }
        }
    }

    fn settle_waiters(&mut self, result: Result<(), PersistenceError>) {
        for waiter in self.waiters.drain(..) {
            let _ = waiter.send(result.clone());
        }
    }

    fn publish(&self) {
        let mut pending_sections: BTreeSet<usize> = self.pending.keys().copied().collect();
        if let Some(flight) = &self.flight {
            pending_sections.insert(flight.section);
        }

        let (state, indicator) = if self.flight.is_some() {
            (SaveState::InFlight, SyncIndicator::Saving)
        } else if self.failed {
            (SaveState::Failed, SyncIndicator::SavedLocally)
        } else if !self.pending.is_empty() {
            (SaveState::Scheduled, SyncIndicator::Dirty)
        } else {
            (SaveState::Idle, SyncIndicator::Clean)
        };

        self.status_tx.send_replace(SaveStatus {
            state,
            attempt: self.attempt,
            indicator,
            last_saved_at: self.last_saved_at,
            pending_sections,
            disabled: self.disabled,
        });
    }
}

async fn land(flight: &mut Option<Flight>) -> Result<bool, PersistenceError> {
    match flight {
        Some(flight) => (&mut flight.fut).await,
        None => std::future::pending().await,
    }
}

async fn fire_at(deadline: Option<Instant>) {
    match deadline {
        Some(at) => tokio::time::sleep_until(at).await,
        None => std::future::pending().await,
    }
}
