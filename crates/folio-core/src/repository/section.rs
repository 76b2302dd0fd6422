//! Section persistence port.

use std::future::Future;

use folio_types::draft::ReportKey;
use folio_types::error::PersistenceError;
use folio_types::section::SectionData;

/// Load/save for one section's payload. One instance per section.
pub trait SectionAdapter: Send + Sync {
    /// Returns `None` if the section was never saved for this report.
    fn load(
        &self,
        report_key: &ReportKey,
    ) -> impl Future<Output = Result<Option<SectionData>, PersistenceError>> + Send;

    /// Overwrite the section's payload.
    fn save(
        &self,
        report_key: &ReportKey,
        data: &SectionData,
    ) -> impl Future<Output = Result<(), PersistenceError>> + Send;
}
