//! SQLite-backed remote store.
//!
//! Plays the role of the backend the draft engine talks to: a report
//! lifecycle table plus one adapter per section over `report_sections`.

pub mod pool;
pub mod report;
pub mod section;

use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::Row;

use folio_types::draft::{DraftStatus, ReportKey};
use folio_types::error::{ConflictError, PersistenceError, RepositoryError};

use self::pool::DatabasePool;

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

/// Fixed-width so that text ordering matches time ordering.
fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn query_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Query(e.to_string())
}

/// Current status of a report, `None` if it does not exist.
async fn report_status(pool: &DatabasePool, report_key: &ReportKey) -> Result<Option<DraftStatus>, RepositoryError> {
    let row = sqlx::query("SELECT status FROM reports WHERE id = ?")
        .bind(report_key.to_string())
        .fetch_optional(&pool.reader)
        .await
        .map_err(query_error)?;
    row.map(|row| {
        let status: String = row.try_get("status").map_err(query_error)?;
        status.parse::<DraftStatus>().map_err(RepositoryError::Query)
    })
    .transpose()
}

/// Why a write guarded on `status = 'in_progress'` touched nothing.
async fn not_editable(pool: &DatabasePool, report_key: &ReportKey) -> PersistenceError {
    match report_status(pool, report_key).await {
        Ok(Some(DraftStatus::Submitted)) => ConflictError::AlreadyFinalized.into(),
        Ok(None) => ConflictError::NotFound.into(),
        Ok(Some(status)) => {
            RepositoryError::Conflict(format!("report {report_key} is {status}, not open for edits")).into()
        }
        Err(err) => err.into(),
    }
}
