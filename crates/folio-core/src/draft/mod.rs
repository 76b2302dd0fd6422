//! Draft Controller and resume resolution.

pub mod controller;
pub mod resume;

pub use controller::{
    DraftController, DraftPhase, DraftSummary, LoadOutcome, SaveOutcome, SectionSummary,
};
pub use resume::{ResumeTarget, resume_target};
