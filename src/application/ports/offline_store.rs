use crate::domain::entities::offline::{DeadLetterRecord, WriteRecord};
use crate::domain::value_objects::offline::WriteId;
use crate::shared::error::AppError;
use async_trait::async_trait;

/// Durable queue of deferred writes.
///
/// Every operation touches a single record, so implementations only need
/// per-statement atomicity. `list_all` returns records in insertion order.
#[async_trait]
pub trait WriteQueueStore: Send + Sync {
    async fn append(&self, record: &WriteRecord) -> Result<(), AppError>;
    async fn list_all(&self) -> Result<Vec<WriteRecord>, AppError>;
    /// Removing an unknown id is not an error.
    async fn remove(&self, id: &WriteId) -> Result<(), AppError>;
    /// No-op when the record was already removed.
    async fn increment_retry(&self, id: &WriteId) -> Result<(), AppError>;
    async fn count(&self) -> Result<u64, AppError>;
}

/// Where evicted writes go instead of disappearing.
#[async_trait]
pub trait DeadLetterStore: Send + Sync {
    async fn record_dead_letter(&self, letter: &DeadLetterRecord) -> Result<(), AppError>;
    async fn list_dead_letters(&self) -> Result<Vec<DeadLetterRecord>, AppError>;
    async fn count_dead_letters(&self) -> Result<u64, AppError>;
    async fn purge_dead_letters(&self) -> Result<u64, AppError>;
}
