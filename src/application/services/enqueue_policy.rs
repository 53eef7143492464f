use crate::domain::entities::offline::WriteRequest;
use crate::domain::value_objects::offline::{TableName, WriteOperation, WritePayload};
use crate::shared::config::DEFAULT_PROTECTED_TABLES;
use chrono::{DateTime, SecondsFormat, Utc};
use std::collections::HashSet;

/// Entity-class rules applied to a write before it is queued.
///
/// Protected tables never receive a hard delete from the queue: a delete is
/// rewritten into an update that sets `deleted_at`, and read paths filter on
/// `deleted_at IS NULL`.
#[derive(Debug, Clone)]
pub struct EnqueuePolicy {
    protected_tables: HashSet<String>,
}

impl EnqueuePolicy {
    pub fn new<I, S>(protected_tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            protected_tables: protected_tables.into_iter().map(Into::into).collect(),
        }
    }

    pub fn is_protected(&self, table: &TableName) -> bool {
        self.protected_tables.contains(table.as_str())
    }

    pub fn apply(&self, request: WriteRequest, now: DateTime<Utc>) -> WriteRequest {
        if request.operation != WriteOperation::Delete || !self.is_protected(&request.table) {
            return request;
        }

        let deleted_at = now.to_rfc3339_opts(SecondsFormat::Millis, true);
        tracing::debug!(
            target: "offline::enqueue",
            table = %request.table,
            deleted_at = %deleted_at,
            "rewriting delete on protected table into tombstone update"
        );

        WriteRequest {
            table: request.table,
            operation: WriteOperation::Update,
            payload: WritePayload::tombstone(deleted_at),
            filters: request.filters,
            on_conflict: None,
        }
    }
}

impl Default for EnqueuePolicy {
    fn default() -> Self {
        Self::new(DEFAULT_PROTECTED_TABLES.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_objects::offline::WriteFilters;
    use chrono::TimeZone;
    use serde_json::json;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap()
    }

    #[test]
    fn protected_delete_becomes_tombstone_update() {
        let policy = EnqueuePolicy::default();
        let request = WriteRequest::delete(
            TableName::parse("plant_profiles").unwrap(),
            WriteFilters::eq("id", "p1"),
        );

        let rewritten = policy.apply(request, fixed_now());

        assert_eq!(rewritten.operation, WriteOperation::Update);
        assert_eq!(
            rewritten.payload.into_inner(),
            json!({"deleted_at": "2026-10-19T08:30:00.000Z"})
        );
        assert_eq!(rewritten.filters, Some(WriteFilters::eq("id", "p1")));
    }

    #[test]
    fn unprotected_delete_passes_through() {
        let policy = EnqueuePolicy::new(["plant_profiles"]);
        let request = WriteRequest::delete(
            TableName::parse("watering_reminders").unwrap(),
            WriteFilters::eq("id", "r1"),
        );

        let result = policy.apply(request.clone(), fixed_now());
        assert_eq!(result, request);
    }

    #[test]
    fn non_delete_on_protected_table_passes_through() {
        let policy = EnqueuePolicy::default();
        let request = WriteRequest::update(
            TableName::parse("plant_profiles").unwrap(),
            WritePayload::new(json!({"nickname": "Fernando"})).unwrap(),
            WriteFilters::eq("id", "p1"),
        );

        assert_eq!(policy.apply(request.clone(), fixed_now()), request);
    }
}
