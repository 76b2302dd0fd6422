//! Local Cache Bridge: mirrors in-memory form state so a reload can recover
//! edits the remote store has not confirmed yet.

pub mod bridge;
pub mod local_cache;

pub use bridge::CacheBridge;
pub use local_cache::LocalCache;
