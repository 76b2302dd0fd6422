//! Shared domain types for folio.
//!
//! Drafts, section payloads, progress, cache entries, auto-save status,
//! configuration, and the error taxonomy used across the workspace.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod autosave;
pub mod cache;
pub mod config;
pub mod draft;
pub mod error;
pub mod progress;
pub mod section;
