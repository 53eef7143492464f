use super::write_request::WriteRequest;
use crate::domain::value_objects::offline::{
    TableName, WriteFilters, WriteId, WriteOperation, WritePayload,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The durable unit of deferred work. Only `retries` changes after creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteRecord {
    pub id: WriteId,
    pub table: TableName,
    pub operation: WriteOperation,
    pub payload: WritePayload,
    pub filters: Option<WriteFilters>,
    pub on_conflict: Option<String>,
    pub created_at: DateTime<Utc>,
    pub retries: u32,
}

impl WriteRecord {
    pub fn from_request(id: WriteId, request: WriteRequest, created_at: DateTime<Utc>) -> Self {
        let WriteRequest {
            table,
            operation,
            payload,
            filters,
            on_conflict,
        } = request;

        Self {
            id,
            table,
            operation,
            payload,
            filters,
            on_conflict,
            created_at,
            retries: 0,
        }
    }

    pub fn has_exhausted(&self, max_retries: u32) -> bool {
        self.retries >= max_retries
    }
}
