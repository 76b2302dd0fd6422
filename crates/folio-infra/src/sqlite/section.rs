//! SQLite section adapter over `report_sections`.

use chrono::Utc;
use sqlx::Row;

use folio_core::repository::section::SectionAdapter;
use folio_types::draft::ReportKey;
use folio_types::error::PersistenceError;
use folio_types::section::SectionData;

use super::pool::DatabasePool;
use super::{format_datetime, not_editable, query_error};

/// Stores one section slot of a report as a JSON payload.
pub struct SqliteSectionAdapter {
    pool: DatabasePool,
    index: usize,
}

impl SqliteSectionAdapter {
    pub fn new(pool: DatabasePool, index: usize) -> Self {
        Self { pool, index }
    }
}

impl SectionAdapter for SqliteSectionAdapter {
    async fn load(&self, report_key: &ReportKey) -> Result<Option<SectionData>, PersistenceError> {
        let row = sqlx::query(
            "SELECT payload FROM report_sections WHERE report_id = ? AND section_index = ?",
        )
        .bind(report_key.to_string())
        .bind(self.index as i64)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(query_error)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let payload: String = row.try_get("payload").map_err(query_error)?;
        let data = serde_json::from_str(&payload).map_err(|e| {
            PersistenceError::Backend(format!("corrupt payload for section {}: {e}", self.index))
        })?;
        Ok(Some(data))
    }

    async fn save(&self, report_key: &ReportKey, data: &SectionData) -> Result<(), PersistenceError> {
        let payload = serde_json::to_string(data)
            .map_err(|e| PersistenceError::Backend(format!("failed to serialize section: {e}")))?;
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
            "INSERT INTO report_sections (report_id, section_index, payload, updated_at)
             VALUES (?, ?, ?, ?)
             ON CONFLICT (report_id, section_index)
             DO UPDATE SET payload = excluded.payload, updated_at = excluded.updated_at",
        )
        .bind(report_key.to_string())
        .bind(self.index as i64)
        .bind(&payload)
        .bind(&now)
        .execute(&mut *tx)
        .await
        .map_err(query_error)?;

        tx.commit().await.map_err(query_error)?;
        Ok(())
    }
}
