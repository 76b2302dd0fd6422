//! Auto-Save Scheduler: debounced, bounded-retry background persistence.

pub mod gate;
pub mod retry;
pub mod scheduler;

pub use gate::{SaveGate, SaveLedger};
pub use scheduler::{AutoSaveContext, AutoSaveHandle};
