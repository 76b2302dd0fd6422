//! Section Registry: the fixed, ordered list of sections.
//!
//! Pure data plus a thin dispatch table. Each slot carries its payload
//! kind, validator and persistence adapter; the registry holds no state.

use folio_types::draft::ReportKey;
use folio_types::error::{PersistenceError, ValidationError};
use folio_types::section::{SectionData, SectionKind};

use super::box_adapter::BoxSectionAdapter;
use super::validator::{Validator, default_validator};
use crate::repository::section::SectionAdapter;

/// One slot in the registry.
pub struct SectionDefinition {
    pub title: String,
    pub kind: SectionKind,
    pub validator: Validator,
    pub adapter: BoxSectionAdapter,
}

impl std::fmt::Debug for SectionDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionDefinition")
            .field("title", &self.title)
            .field("kind", &self.kind)
            .finish_non_exhaustive()
    }
}

/// Ordered sections `0..len()`.
#[derive(Debug)]
pub struct SectionRegistry {
    sections: Vec<SectionDefinition>,
}

impl SectionRegistry {
    pub fn builder() -> SectionRegistryBuilder {
        SectionRegistryBuilder::default()
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn last_index(&self) -> usize {
        self.sections.len().saturating_sub(1)
    }

    pub fn get(&self, index: usize) -> Option<&SectionDefinition> {
        self.sections.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &SectionDefinition)> {
        self.sections.iter().enumerate()
    }

    fn slot(&self, index: usize) -> Result<&SectionDefinition, ValidationError> {
        self.sections
            .get(index)
            .ok_or(ValidationError::NoSuchSection(index))
    }

    /// Empty payload for a slot.
    pub fn empty_payload(&self, index: usize) -> Result<SectionData, ValidationError> {
        Ok(self.slot(index)?.kind.empty_payload())
    }

    /// Reject a payload whose kind does not belong in this slot.
    pub fn check_kind(&self, index: usize, data: &SectionData) -> Result<(), ValidationError> {
        let slot = self.slot(index)?;
        if data.kind() != slot.kind {
            return Err(ValidationError::SectionMismatch {
                index,
                expected: slot.kind.to_string(),
                actual: data.kind().to_string(),
            });
        }
        Ok(())
    }

    /// Run the slot's validator.
    pub fn validate(&self, index: usize, data: &SectionData) -> Result<(), ValidationError> {
        self.check_kind(index, data)?;
        (self.slot(index)?.validator)(data)
    }

    pub async fn load(
        &self,
        index: usize,
        report_key: &ReportKey,
    ) -> Result<Option<SectionData>, PersistenceError> {
        match self.sections.get(index) {
            Some(slot) => slot.adapter.load(report_key).await,
            None => Ok(None),
        }
    }

    pub async fn save(
        &self,
        index: usize,
        report_key: &ReportKey,
        data: &SectionData,
    ) -> Result<(), PersistenceError> {
        let slot = self
            .sections
            .get(index)
            .ok_or_else(|| PersistenceError::Backend(format!("section {index} does not exist")))?;
        slot.adapter.save(report_key, data).await
    }
}

/// Builds a registry in section order.
#[derive(Default)]
pub struct SectionRegistryBuilder {
    sections: Vec<SectionDefinition>,
}

impl SectionRegistryBuilder {
    /// Append a section using the stock validator for its kind.
    pub fn section<A: SectionAdapter + 'static>(
        self,
        title: impl Into<String>,
        kind: SectionKind,
        adapter: A,
    ) -> Self {
        self.section_with(title, kind, default_validator(kind), adapter)
    }

    /// Append a section with a custom validator.
    pub fn section_with<A: SectionAdapter + 'static>(
        mut self,
        title: impl Into<String>,
        kind: SectionKind,
        validator: Validator,
        adapter: A,
    ) -> Self {
        self.sections.push(SectionDefinition {
            title: title.into(),
            kind,
            validator,
            adapter: BoxSectionAdapter::new(adapter),
        });
        self
    }

    pub fn build(self) -> SectionRegistry {
        SectionRegistry {
            sections: self.sections,
        }
    }
}
