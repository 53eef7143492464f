use super::enqueue_policy::EnqueuePolicy;
use crate::application::ports::offline_store::WriteQueueStore;
use crate::domain::entities::offline::{WriteRecord, WriteRequest};
use crate::domain::value_objects::offline::WriteId;
use crate::shared::error::AppError;
use async_trait::async_trait;
use chrono::{SubsecRound, Utc};
use std::sync::Arc;

#[async_trait]
pub trait OfflineWriteServiceTrait: Send + Sync {
    /// Queues a write and returns once it is durable.
    async fn enqueue(&self, request: WriteRequest) -> Result<WriteId, AppError>;
    async fn pending_count(&self) -> Result<u64, AppError>;
    async fn list_pending(&self) -> Result<Vec<WriteRecord>, AppError>;
}

pub struct OfflineWriteService {
    store: Arc<dyn WriteQueueStore>,
    policy: EnqueuePolicy,
}

impl OfflineWriteService {
    pub fn new(store: Arc<dyn WriteQueueStore>, policy: EnqueuePolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> &EnqueuePolicy {
        &self.policy
    }
}

#[async_trait]
impl OfflineWriteServiceTrait for OfflineWriteService {
    async fn enqueue(&self, request: WriteRequest) -> Result<WriteId, AppError> {
        // Millisecond precision is what the store keeps.
        let now = Utc::now().trunc_subsecs(3);
        let request = self.policy.apply(request, now);
        let record = WriteRecord::from_request(WriteId::generate(), request, now);

        if let Err(err) = self.store.append(&record).await {
            tracing::error!(
                target: "offline::enqueue",
                table = %record.table,
                operation = %record.operation,
                error = %err,
                "failed to persist queued write"
            );
            return Err(err);
        }

        tracing::debug!(
            target: "offline::enqueue",
            write_id = %record.id,
            table = %record.table,
            operation = %record.operation,
            "write queued"
        );
        Ok(record.id)
    }

    async fn pending_count(&self) -> Result<u64, AppError> {
        self.store.count().await
    }

    async fn list_pending(&self) -> Result<Vec<WriteRecord>, AppError> {
        self.store.list_all().await
    }
}
