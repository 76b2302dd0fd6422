//! Report lifecycle port.

use std::future::Future;

use folio_types::draft::{ExistingReport, OwnerKey, ReportKey};
use folio_types::error::{PersistenceError, RemoteError};
use folio_types::section::BasicInfo;

/// Creation, lookup and finalization of an owner's report.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait ReportLifecycle: Send + Sync {
    /// Look up the owner's report.
    ///
    /// Returns `ExistingReport::none()` when the owner has no report. An
    /// in-progress report is preferred over a submitted one.
    fn find_existing(
        &self,
        owner: &OwnerKey,
    ) -> impl Future<Output = Result<ExistingReport, PersistenceError>> + Send;

    /// Create a report from the first section's data.
    fn create(
        &self,
        owner: &OwnerKey,
        basic_info: &BasicInfo,
    ) -> impl Future<Output = Result<ReportKey, RemoteError>> + Send;

    /// Record that a section was confirmed through an explicit save.
    ///
    /// Idempotent: confirming an already confirmed section is a no-op.
    fn confirm_section(
        &self,
        report_key: &ReportKey,
        section: usize,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;

    /// Move the report to `submitted`.
    ///
    /// Fails with `ConflictError::AlreadyFinalized` if a finalize already
    /// ran for this report.
    fn finalize(
        &self,
        report_key: &ReportKey,
    ) -> impl Future<Output = Result<(), RemoteError>> + Send;
}
