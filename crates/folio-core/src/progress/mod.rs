//! Progress Store.

pub mod store;

pub use store::ProgressStore;
