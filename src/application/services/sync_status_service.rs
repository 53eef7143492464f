use super::replay_scheduler::{ReplayScheduler, ReplayState};
use crate::application::ports::offline_store::{DeadLetterStore, WriteQueueStore};
use crate::infrastructure::offline::metrics::ReplayMetricsSnapshot;
use crate::shared::error::AppError;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SyncStatusSnapshot {
    pub pending_count: u64,
    pub dead_letter_count: Option<u64>,
    pub is_reachable: bool,
    pub replay_state: ReplayState,
    pub metrics: ReplayMetricsSnapshot,
}

/// Read-only view for UI badges and diagnostics.
pub struct SyncStatusService {
    store: Arc<dyn WriteQueueStore>,
    dead_letters: Option<Arc<dyn DeadLetterStore>>,
    scheduler: Arc<ReplayScheduler>,
}

impl SyncStatusService {
    pub fn new(
        store: Arc<dyn WriteQueueStore>,
        dead_letters: Option<Arc<dyn DeadLetterStore>>,
        scheduler: Arc<ReplayScheduler>,
    ) -> Self {
        Self {
            store,
            dead_letters,
            scheduler,
        }
    }

    pub async fn pending_count(&self) -> Result<u64, AppError> {
        self.store.count().await
    }

    pub async fn snapshot(&self) -> Result<SyncStatusSnapshot, AppError> {
        let pending_count = self.store.count().await?;
        let dead_letter_count = match &self.dead_letters {
            Some(store) => Some(store.count_dead_letters().await?),
            None => None,
        };

        Ok(SyncStatusSnapshot {
            pending_count,
            dead_letter_count,
            is_reachable: self.scheduler.is_reachable(),
            replay_state: self.scheduler.state(),
            metrics: self.scheduler.metrics(),
        })
    }
}
