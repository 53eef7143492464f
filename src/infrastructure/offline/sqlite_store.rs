use super::mappers::{domain_dead_letter_from_row, domain_record_from_row, params_from_record};
use super::rows::{DeadLetterRow, WriteQueueRow};
use crate::application::ports::offline_store::{DeadLetterStore, WriteQueueStore};
use crate::domain::entities::offline::{DeadLetterRecord, WriteRecord};
use crate::domain::value_objects::offline::WriteId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use sqlx::{Pool, Sqlite};

pub struct SqliteWriteQueueStore {
    pool: Pool<Sqlite>,
}

impl SqliteWriteQueueStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WriteQueueStore for SqliteWriteQueueStore {
    async fn append(&self, record: &WriteRecord) -> Result<(), AppError> {
        let params = params_from_record(record)?;

        sqlx::query(
            r#"
            INSERT INTO write_queue (
                id, table_name, operation, payload, filters, on_conflict, created_at, retries
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&params.id)
        .bind(&params.table_name)
        .bind(params.operation)
        .bind(&params.payload)
        .bind(&params.filters)
        .bind(&params.on_conflict)
        .bind(params.created_at)
        .bind(params.retries)
        .execute(&self.pool)
        .await
        .map_err(|err| AppError::Storage(format!("failed to append write {}: {err}", params.id)))?;

        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<WriteRecord>, AppError> {
        let rows = sqlx::query_as::<_, WriteQueueRow>(
            r#"
            SELECT seq, id, table_name, operation, payload, filters, on_conflict, created_at, retries
            FROM write_queue
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(domain_record_from_row).collect()
    }

    async fn remove(&self, id: &WriteId) -> Result<(), AppError> {
        sqlx::query("DELETE FROM write_queue WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn increment_retry(&self, id: &WriteId) -> Result<(), AppError> {
        sqlx::query("UPDATE write_queue SET retries = retries + 1 WHERE id = ?1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM write_queue")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl DeadLetterStore for SqliteWriteQueueStore {
    async fn record_dead_letter(&self, letter: &DeadLetterRecord) -> Result<(), AppError> {
        let params = params_from_record(&letter.record)?;

        // A repeated eviction of the same id keeps the first dead letter.
        sqlx::query(
            r#"
            INSERT INTO write_dead_letters (
                id, table_name, operation, payload, filters, on_conflict,
                created_at, retries, evicted_at, reason
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&params.id)
        .bind(&params.table_name)
        .bind(params.operation)
        .bind(&params.payload)
        .bind(&params.filters)
        .bind(&params.on_conflict)
        .bind(params.created_at)
        .bind(params.retries)
        .bind(letter.evicted_at.timestamp_millis())
        .bind(&letter.reason)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn list_dead_letters(&self) -> Result<Vec<DeadLetterRecord>, AppError> {
        let rows = sqlx::query_as::<_, DeadLetterRow>(
            r#"
            SELECT seq, id, table_name, operation, payload, filters, on_conflict,
                   created_at, retries, evicted_at, reason
            FROM write_dead_letters
            ORDER BY seq ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(domain_dead_letter_from_row).collect()
    }

    async fn count_dead_letters(&self) -> Result<u64, AppError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM write_dead_letters")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }

    async fn purge_dead_letters(&self) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM write_dead_letters")
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
