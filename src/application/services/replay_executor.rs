use crate::application::ports::offline_store::{DeadLetterStore, WriteQueueStore};
use crate::application::ports::remote_data_service::{DispatchError, RemoteDataService};
use crate::domain::entities::offline::{DeadLetterRecord, RecordOutcome, ReplayReport, WriteRecord};
use crate::shared::error::AppError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Walks a queue snapshot in order and settles each record against the remote.
///
/// A record failing never stops the pass. Only a store error does, since the
/// queue can no longer be trusted to reflect what was delivered.
pub struct ReplayExecutor {
    store: Arc<dyn WriteQueueStore>,
    remote: Arc<dyn RemoteDataService>,
    dead_letters: Option<Arc<dyn DeadLetterStore>>,
    max_retries: u32,
    dispatch_timeout: Duration,
}

impl ReplayExecutor {
    pub fn new(
        store: Arc<dyn WriteQueueStore>,
        remote: Arc<dyn RemoteDataService>,
        dead_letters: Option<Arc<dyn DeadLetterStore>>,
        max_retries: u32,
        dispatch_timeout: Duration,
    ) -> Self {
        Self {
            store,
            remote,
            dead_letters,
            max_retries,
            dispatch_timeout,
        }
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    pub async fn run_pass(&self, records: Vec<WriteRecord>) -> Result<ReplayReport, AppError> {
        let mut report = ReplayReport::begin(records.len());

        for record in records {
            if record.has_exhausted(self.max_retries) {
                self.evict(&record).await?;
                report.push(
                    record.id,
                    RecordOutcome::Evicted {
                        retries: record.retries,
                    },
                );
                continue;
            }

            match self.dispatch(&record).await {
                Ok(()) => {
                    self.store.remove(&record.id).await?;
                    tracing::debug!(
                        target: "offline::replay",
                        write_id = %record.id,
                        table = %record.table,
                        operation = %record.operation,
                        "queued write delivered"
                    );
                    report.push(record.id, RecordOutcome::Delivered);
                }
                Err(err) => {
                    self.store.increment_retry(&record.id).await?;
                    let retries = record.retries.saturating_add(1);
                    tracing::warn!(
                        target: "offline::replay",
                        write_id = %record.id,
                        table = %record.table,
                        operation = %record.operation,
                        retries,
                        retryable = err.is_retryable(),
                        error = %err,
                        "queued write dispatch failed"
                    );
                    report.push(
                        record.id,
                        RecordOutcome::Retained {
                            retries,
                            error: err.to_string(),
                        },
                    );
                }
            }
        }

        Ok(report.finish())
    }

    async fn dispatch(&self, record: &WriteRecord) -> Result<(), DispatchError> {
        match tokio::time::timeout(self.dispatch_timeout, self.remote.dispatch(record)).await {
            Ok(result) => result,
            Err(_) => Err(DispatchError::Timeout(self.dispatch_timeout.as_millis() as u64)),
        }
    }

    async fn evict(&self, record: &WriteRecord) -> Result<(), AppError> {
        if let Some(dead_letters) = &self.dead_letters {
            let letter = DeadLetterRecord::new(
                record.clone(),
                Utc::now(),
                format!("exceeded {} replay attempts", self.max_retries),
            );
            if let Err(err) = dead_letters.record_dead_letter(&letter).await {
                tracing::error!(
                    target: "offline::replay",
                    write_id = %record.id,
                    error = %err,
                    "failed to keep evicted write as dead letter"
                );
            }
        }

        self.store.remove(&record.id).await?;
        tracing::warn!(
            target: "offline::replay",
            write_id = %record.id,
            table = %record.table,
            operation = %record.operation,
            retries = record.retries,
            "evicting write after exhausting retries"
        );
        Ok(())
    }
}
