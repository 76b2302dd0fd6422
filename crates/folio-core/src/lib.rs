//! Draft workflow engine and port traits for folio.
//!
//! This crate defines the "ports" (`ReportLifecycle`, `SectionAdapter`,
//! `LocalCache`) that the infrastructure layer implements, plus the engine
//! built on them. It depends only on `folio-types` -- never on
//! `folio-infra` or any database/IO crate.

pub mod autosave;
pub mod cache;
pub mod draft;
pub mod progress;
pub mod repository;
pub mod section;

#[cfg(test)]
pub(crate) mod testing;
