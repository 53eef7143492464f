use crate::domain::value_objects::offline::{TableName, WriteFilters, WriteOperation, WritePayload};
use serde::{Deserialize, Serialize};

/// A mutation as requested by feature code, before the enqueue policy has looked at it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WriteRequest {
    pub table: TableName,
    pub operation: WriteOperation,
    pub payload: WritePayload,
    pub filters: Option<WriteFilters>,
    pub on_conflict: Option<String>,
}

impl WriteRequest {
    pub fn new(
        table: TableName,
        operation: WriteOperation,
        payload: WritePayload,
        filters: Option<WriteFilters>,
    ) -> Self {
        Self {
            table,
            operation,
            payload,
            filters,
            on_conflict: None,
        }
    }

    pub fn insert(table: TableName, payload: WritePayload) -> Self {
        Self::new(table, WriteOperation::Insert, payload, None)
    }

    pub fn update(table: TableName, payload: WritePayload, filters: WriteFilters) -> Self {
        Self::new(table, WriteOperation::Update, payload, Some(filters))
    }

    pub fn upsert(table: TableName, payload: WritePayload) -> Self {
        Self::new(table, WriteOperation::Upsert, payload, None)
    }

    pub fn delete(table: TableName, filters: WriteFilters) -> Self {
        Self::new(
            table,
            WriteOperation::Delete,
            WritePayload::default(),
            Some(filters),
        )
    }

    pub fn with_on_conflict(mut self, columns: impl Into<String>) -> Self {
        self.on_conflict = Some(columns.into());
        self
    }
}
