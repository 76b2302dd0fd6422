//! Infrastructure layer for folio.
//!
//! Implements the ports defined in `folio-core`: the SQLite-backed report
//! store and section adapters, the file and in-memory local caches, plus
//! configuration loading and data directory layout.

pub mod cache;
pub mod config;
pub mod filesystem;
pub mod registry;
pub mod sqlite;
