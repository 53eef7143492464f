use crate::domain::value_objects::offline::WriteId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RecordOutcome {
    Delivered,
    Retained { retries: u32, error: String },
    Evicted { retries: u32 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordResult {
    pub id: WriteId,
    pub outcome: RecordOutcome,
}

/// Summary of one replay pass over a queue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayReport {
    pub snapshot_len: usize,
    pub dispatched: u32,
    pub delivered: u32,
    pub failed: u32,
    pub evicted: u32,
    pub results: Vec<RecordResult>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ReplayReport {
    pub fn begin(snapshot_len: usize) -> Self {
        let now = Utc::now();
        Self {
            snapshot_len,
            dispatched: 0,
            delivered: 0,
            failed: 0,
            evicted: 0,
            results: Vec::with_capacity(snapshot_len),
            started_at: now,
            finished_at: now,
        }
    }

    pub fn push(&mut self, id: WriteId, outcome: RecordOutcome) {
        match &outcome {
            RecordOutcome::Delivered => {
                self.dispatched += 1;
                self.delivered += 1;
            }
            RecordOutcome::Retained { .. } => {
                self.dispatched += 1;
                self.failed += 1;
            }
            RecordOutcome::Evicted { .. } => self.evicted += 1,
        }
        self.results.push(RecordResult { id, outcome });
    }

    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self
    }

    pub fn duration_ms(&self) -> u64 {
        self.finished_at
            .signed_duration_since(self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }
}
