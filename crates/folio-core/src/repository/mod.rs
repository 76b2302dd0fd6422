//! Remote store trait definitions (ports).
//!
//! These traits define the interface to the backing store that the
//! infrastructure layer (folio-infra) implements. The core crate never
//! depends on any specific storage technology or wire format.

pub mod report;
pub mod section;
