use sqlx::FromRow;

#[derive(Debug, Clone, FromRow)]
pub struct WriteQueueRow {
    pub seq: i64,
    pub id: String,
    pub table_name: String,
    pub operation: String,
    pub payload: String,
    pub filters: Option<String>,
    pub on_conflict: Option<String>,
    pub created_at: i64,
    pub retries: i64,
}

#[derive(Debug, Clone, FromRow)]
pub struct DeadLetterRow {
    pub seq: i64,
    pub id: String,
    pub table_name: String,
    pub operation: String,
    pub payload: String,
    pub filters: Option<String>,
    pub on_conflict: Option<String>,
    pub created_at: i64,
    pub retries: i64,
    pub evicted_at: i64,
    pub reason: String,
}

/// Column values of a write record, serialised for binding.
#[derive(Debug, Clone)]
pub struct WriteRecordParams {
    pub id: String,
    pub table_name: String,
    pub operation: &'static str,
    pub payload: String,
    pub filters: Option<String>,
    pub on_conflict: Option<String>,
    pub created_at: i64,
    pub retries: i64,
}
