use thiserror::Error;

/// A section's fields are missing or internally inconsistent.
///
/// Produced synchronously by section validators and never sent to the
/// remote store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("required field '{field}' is missing")]
    MissingField { field: String },

    #[error("invalid value '{value}' for field '{field}'")]
    InvalidValue { field: String, value: String },

    #[error("unknown field '{field}' for section '{section}'")]
    UnknownField { section: String, field: String },

    #[error("'{field}' must equal the sum of its parts: expected {expected}, got {actual}")]
    SumMismatch {
        field: String,
        expected: i64,
        actual: i64,
    },

    #[error("field '{field}' is out of range: {detail}")]
    OutOfRange { field: String, detail: String },

    #[error("section {index} expects a '{expected}' payload, got '{actual}'")]
    SectionMismatch {
        index: usize,
        expected: String,
        actual: String,
    },

    #[error("section {0} does not exist")]
    NoSuchSection(usize),

    #[error("the first section must be saved before section {0}")]
    DraftNotStarted(usize),

    #[error("sections {0:?} are not complete")]
    IncompleteSections(Vec<usize>),
}

/// A remote save or load failed. Recoverable by retrying, except `Conflict`.
#[derive(Debug, Clone, Error)]
pub enum PersistenceError {
    #[error("remote store unavailable: {0}")]
    Unavailable(String),

    #[error("remote call timed out")]
    Timeout,

    #[error("remote store rejected the request: {0}")]
    Backend(String),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    /// The report no longer accepts section writes.
    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

impl PersistenceError {
    /// Whether sending the same request again can succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, Self::Conflict(_))
    }
}

/// The remote already holds a state that conflicts with the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConflictError {
    #[error("report has already been finalized")]
    AlreadyFinalized,

    #[error("report not found")]
    NotFound,
}

/// The local cache medium could not be used.
///
/// Never surfaced to the user; the engine falls back to remote-only
/// persistence.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("local cache unavailable: {0}")]
    Unavailable(String),

    #[error("local cache quota exceeded ({size} > {limit} bytes)")]
    QuotaExceeded { size: usize, limit: usize },

    #[error("cache entry could not be (de)serialized: {0}")]
    Serialization(String),
}

/// Errors from repository operations (SQLite layer).
#[derive(Debug, Clone, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Failure of a report lifecycle call (`create` / `finalize`).
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),
}

/// Errors returned by the draft controller.
#[derive(Debug, Error)]
pub enum DraftError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Persistence(#[from] PersistenceError),

    #[error(transparent)]
    Conflict(#[from] ConflictError),

    #[error("draft has been submitted and is read-only")]
    ReadOnly,

    #[error("draft has not been loaded")]
    NotLoaded,

    #[error("remote state diverged, reload required: {0}")]
    ReloadRequired(String),
}

impl From<RemoteError> for DraftError {
    fn from(err: RemoteError) -> Self {
        match err {
            RemoteError::Validation(e) => DraftError::Validation(e),
            RemoteError::Persistence(e) => DraftError::Persistence(e),
            RemoteError::Conflict(e) => DraftError::Conflict(e),
        }
    }
}
