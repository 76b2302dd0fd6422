//! Draft identity and lifecycle types.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies whose draft this is. Namespaces the local cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerKey(pub String);

impl OwnerKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque identifier handed out by the remote store when a draft is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportKey(pub Uuid);

impl ReportKey {
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for ReportKey {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ReportKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl std::str::FromStr for ReportKey {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Lifecycle status of a draft.
///
/// `None -> InProgress` on the first confirmed section,
/// `InProgress -> Submitted` on finalize. `Submitted` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DraftStatus {
    #[default]
    None,
    InProgress,
    Submitted,
}

impl DraftStatus {
    pub fn is_terminal(self) -> bool {
        self == DraftStatus::Submitted
    }
}

impl fmt::Display for DraftStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftStatus::None => write!(f, "none"),
            DraftStatus::InProgress => write!(f, "in_progress"),
            DraftStatus::Submitted => write!(f, "submitted"),
        }
    }
}

impl std::str::FromStr for DraftStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(DraftStatus::None),
            "in_progress" => Ok(DraftStatus::InProgress),
            "submitted" => Ok(DraftStatus::Submitted),
            other => Err(format!("invalid draft status: '{other}'")),
        }
    }
}

/// The logical unit of work.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    /// Absent until the first section is confirmed with the remote store.
    pub draft_id: Option<ReportKey>,
    pub status: DraftStatus,
    pub owner_key: OwnerKey,
}

impl Draft {
    pub fn new(owner_key: OwnerKey) -> Self {
        Self {
            draft_id: None,
            status: DraftStatus::None,
            owner_key,
        }
    }

    /// Key under which this draft is mirrored in the local cache.
    pub fn cache_key(&self) -> DraftKey {
        match self.draft_id {
            Some(key) => DraftKey::Report(key),
            None => DraftKey::Unsaved,
        }
    }
}

/// Second half of a cache key: the report key, or `"draft"` before one exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DraftKey {
    Report(ReportKey),
    Unsaved,
}

impl fmt::Display for DraftKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftKey::Report(key) => key.fmt(f),
            DraftKey::Unsaved => f.write_str("draft"),
        }
    }
}

/// What the remote store knows about an owner's report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingReport {
    pub status: DraftStatus,
    pub report_key: Option<ReportKey>,
    pub completed_sections: Vec<usize>,
    /// Last confirmed remote write for this report.
    pub updated_at: Option<DateTime<Utc>>,
}

impl ExistingReport {
    pub fn none() -> Self {
        Self {
            status: DraftStatus::None,
            report_key: None,
            completed_sections: Vec::new(),
            updated_at: None,
        }
    }
}
