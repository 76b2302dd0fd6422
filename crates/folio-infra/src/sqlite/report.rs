//! SQLite implementation of `ReportLifecycle`.

use chrono::Utc;
use sqlx::Row;
use tracing::debug;

use folio_core::repository::report::ReportLifecycle;
use folio_types::draft::{DraftStatus, ExistingReport, OwnerKey, ReportKey};
use folio_types::error::{
    ConflictError, PersistenceError, RemoteError, RepositoryError, ValidationError,
};
use folio_types::section::{BasicInfo, SectionData};

use super::pool::DatabasePool;
use super::{format_datetime, parse_datetime, not_editable, query_error, report_status};

pub struct SqliteReportStore {
    pool: DatabasePool,
}

impl SqliteReportStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

impl ReportLifecycle for SqliteReportStore {
    async fn find_existing(&self, owner: &OwnerKey) -> Result<ExistingReport, PersistenceError> {
        let row = sqlx::query(
            "SELECT id, status, updated_at FROM reports WHERE owner_key = ?
             ORDER BY CASE status WHEN 'in_progress' THEN 0 ELSE 1 END, updated_at DESC
             LIMIT 1",
        )
        .bind(owner.as_str())
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(ExistingReport::none());
        };

        let id: String = row.try_get("id").map_err(query_error)?;
        let status: String = row.try_get("status").map_err(query_error)?;
        let updated_at: String = row.try_get("updated_at").map_err(query_error)?;
        let report_key: ReportKey = id
            .parse()
            .map_err(|e| RepositoryError::Query(format!("invalid report id: {e}")))?;
        let status: DraftStatus = status.parse().map_err(RepositoryError::Query)?;

        let completed: Vec<(i64,)> = sqlx::query_as(
            "SELECT section_index FROM report_completions WHERE report_id = ? ORDER BY section_index",
        )
        .bind(&id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(query_error)?;

        Ok(ExistingReport {
            status,
            report_key: Some(report_key),
            completed_sections: completed
                .into_iter()
                .filter_map(|(index,)| usize::try_from(index).ok())
                .collect(),
            updated_at: Some(parse_datetime(&updated_at)?),
        })
    }

    async fn create(&self, owner: &OwnerKey, basic_info: &BasicInfo) -> Result<ReportKey, RemoteError> {
        let named = basic_info
            .organisation_name
            .as_deref()
            .is_some_and(|name| !name.trim().is_empty());
        if !named {
            return Err(ValidationError::MissingField {
                field: "organisation_name".to_string(),
            }
            .into());
        }

        let key = ReportKey::new();
        let now = format_datetime(&Utc::now());
        let payload = serde_json::to_string(&SectionData::BasicInfo(basic_info.clone()))
            .map_err(|e| PersistenceError::Backend(format!("failed to serialize section: {e}")))?;

        let mut tx = self.pool.writer.begin().await.map_err(query_error).map_err(PersistenceError::from)?;
        sqlx::query(
            "INSERT INTO reports (id, owner_key, status, created_at, updated_at)
             VALUES (?, ?, 'in_progress', ?, ?)",
        )
        .bind(key.to_string())
        .bind(owner.as_str())
        .bind(&now)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(query_error)
        .map_err(PersistenceError::from)?;

        sqlx::query(
            "INSERT INTO report_sections (report_id, section_index, payload, updated_at)
             VALUES (?, 0, ?, ?)",
        )
        .bind(key.to_string())
        .bind(&payload)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(query_error)
        .map_err(PersistenceError::from)?;

        tx.commit().await.map_err(query_error).map_err(PersistenceError::from)?;
        debug!(%owner, report_key = %key, "report created");
        Ok(key)
    }

    async fn confirm_section(&self, report_key: &ReportKey, section: usize) -> Result<(), PersistenceError> {
        let now = format_datetime(&Utc::now());
        let mut tx = self.pool.writer.begin().await.map_err(query_error)?;

        let touched = sqlx::query("UPDATE reports SET updated_at = ? WHERE id = ? AND status = 'in_progress'")
            .bind(&now)
            .bind(report_key.to_string())
            .execute(&mut *tx)
            .await
            .map_err(query_error)?
            .rows_affected();
        if touched == 0 {
            drop(tx);
            return Err(not_editable(&self.pool, report_key).await);
        }

        sqlx::query(
            "INSERT INTO report_completions (report_id, section_index, confirmed_at)
             VALUES (?, ?, ?)
             ON CONFLICT (report_id, section_index) DO NOTHING",
        )
        .bind(report_key.to_string())
        .bind(section as i64)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }

    async fn finalize(&self, report_key: &ReportKey) -> Result<(), RemoteError> {
        let now = format_datetime(&Utc::now());
        let updated = sqlx::query(
            "UPDATE reports SET status = 'submitted', submitted_at = ?, updated_at = ?
             WHERE id = ? AND status = 'in_progress'",
        )
        .bind(&now)
        .bind(&now)
        .bind(report_key.to_string())
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)
        .map_err(PersistenceError::from)?
        .rows_affected();

        if updated == 1 {
            debug!(report_key = %report_key, "report finalized");
            return Ok(());
        }
        match report_status(&self.pool, report_key).await.map_err(PersistenceError::from)? {
            Some(DraftStatus::Submitted) => Err(ConflictError::AlreadyFinalized.into()),
            Some(_) => Err(PersistenceError::Backend(format!("report {report_key} could not be finalized")).into()),
            None => Err(ConflictError::NotFound.into()),
        }
    }
}
