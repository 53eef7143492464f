use super::rows::{DeadLetterRow, WriteQueueRow, WriteRecordParams};
use crate::domain::entities::offline::{DeadLetterRecord, WriteRecord};
use crate::domain::value_objects::offline::{
    TableName, WriteFilters, WriteId, WriteOperation, WritePayload,
};
use crate::shared::error::AppError;
use chrono::{DateTime, Utc};

pub fn params_from_record(record: &WriteRecord) -> Result<WriteRecordParams, AppError> {
    let payload = serde_json::to_string(record.payload.as_map())
        .map_err(|err| AppError::SerializationError(err.to_string()))?;
    let filters = record
        .filters
        .as_ref()
        .map(|filters| serde_json::to_string(filters.as_map()))
        .transpose()
        .map_err(|err| AppError::SerializationError(err.to_string()))?;

    Ok(WriteRecordParams {
        id: record.id.to_string(),
        table_name: record.table.to_string(),
        operation: record.operation.as_str(),
        payload,
        filters,
        on_conflict: record.on_conflict.clone(),
        created_at: record.created_at.timestamp_millis(),
        retries: i64::from(record.retries),
    })
}

pub fn domain_record_from_row(row: WriteQueueRow) -> Result<WriteRecord, AppError> {
    build_record(
        &row.id,
        &row.table_name,
        &row.operation,
        &row.payload,
        row.filters.as_deref(),
        row.on_conflict,
        row.created_at,
        row.retries,
    )
}

pub fn domain_dead_letter_from_row(row: DeadLetterRow) -> Result<DeadLetterRecord, AppError> {
    let record = build_record(
        &row.id,
        &row.table_name,
        &row.operation,
        &row.payload,
        row.filters.as_deref(),
        row.on_conflict,
        row.created_at,
        row.retries,
    )?;
    Ok(DeadLetterRecord::new(
        record,
        timestamp_to_datetime(row.evicted_at)?,
        row.reason,
    ))
}

#[allow(clippy::too_many_arguments)]
fn build_record(
    id: &str,
    table_name: &str,
    operation: &str,
    payload: &str,
    filters: Option<&str>,
    on_conflict: Option<String>,
    created_at: i64,
    retries: i64,
) -> Result<WriteRecord, AppError> {
    let id = WriteId::parse(id).map_err(AppError::DeserializationError)?;
    let table = TableName::parse(table_name).map_err(AppError::DeserializationError)?;
    let operation = operation
        .parse::<WriteOperation>()
        .map_err(AppError::DeserializationError)?;
    let payload = WritePayload::from_json_str(payload).map_err(AppError::DeserializationError)?;
    let filters = filters
        .map(WriteFilters::from_json_str)
        .transpose()
        .map_err(AppError::DeserializationError)?;
    let retries = u32::try_from(retries).map_err(|_| {
        AppError::DeserializationError(format!("retries out of range for {id}: {retries}"))
    })?;

    Ok(WriteRecord {
        id,
        table,
        operation,
        payload,
        filters,
        on_conflict,
        created_at: timestamp_to_datetime(created_at)?,
        retries,
    })
}

fn timestamp_to_datetime(millis: i64) -> Result<DateTime<Utc>, AppError> {
    DateTime::from_timestamp_millis(millis).ok_or_else(|| {
        AppError::DeserializationError(format!("invalid timestamp: {millis}"))
    })
}
