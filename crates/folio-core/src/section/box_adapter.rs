//! BoxSectionAdapter -- object-safe dynamic dispatch wrapper for SectionAdapter.
//!
//! 1. `SectionAdapterDyn` is an object-safe mirror of `SectionAdapter` with boxed futures
//! 2. Blanket-impl `SectionAdapterDyn` for all `T: SectionAdapter`
//! 3. `BoxSectionAdapter` wraps `Box<dyn SectionAdapterDyn>` and delegates

use futures_util::future::BoxFuture;

use folio_types::draft::ReportKey;
use folio_types::error::PersistenceError;
use folio_types::section::SectionData;

use crate::repository::section::SectionAdapter;

/// Object-safe version of [`SectionAdapter`] with boxed futures.
pub trait SectionAdapterDyn: Send + Sync {
    fn load_boxed<'a>(
        &'a self,
        report_key: &'a ReportKey,
    ) -> BoxFuture<'a, Result<Option<SectionData>, PersistenceError>>;

    fn save_boxed<'a>(
        &'a self,
        report_key: &'a ReportKey,
        data: &'a SectionData,
    ) -> BoxFuture<'a, Result<(), PersistenceError>>;
}

impl<T: SectionAdapter> SectionAdapterDyn for T {
    fn load_boxed<'a>(
        &'a self,
        report_key: &'a ReportKey,
    ) -> BoxFuture<'a, Result<Option<SectionData>, PersistenceError>> {
        Box::pin(self.load(report_key))
    }

    fn save_boxed<'a>(
        &'a self,
        report_key: &'a ReportKey,
        data: &'a SectionData,
    ) -> BoxFuture<'a, Result<(), PersistenceError>> {
        Box::pin(self.save(report_key, data))
    }
}

/// Type-erased section adapter so the registry can hold a different
/// adapter type per section.
pub struct BoxSectionAdapter {
    inner: Box<dyn SectionAdapterDyn>,
}

impl BoxSectionAdapter {
    pub fn new<T: SectionAdapter + 'static>(adapter: T) -> Self {
        Self {
            inner: Box::new(adapter),
        }
    }

    pub async fn load(
        &self,
        report_key: &ReportKey,
    ) -> Result<Option<SectionData>, PersistenceError> {
        self.inner.load_boxed(report_key).await
    }

    pub async fn save(
        &self,
        report_key: &ReportKey,
        data: &SectionData,
    ) -> Result<(), PersistenceError> {
        self.inner.save_boxed(report_key, data).await
    }
}

impl std::fmt::Debug for BoxSectionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxSectionAdapter").finish_non_exhaustive()
    }
}
