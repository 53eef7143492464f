use super::write_record::WriteRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A write that was evicted from the queue without ever being delivered.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeadLetterRecord {
    pub record: WriteRecord,
    pub evicted_at: DateTime<Utc>,
    pub reason: String,
}

impl DeadLetterRecord {
    pub fn new(record: WriteRecord, evicted_at: DateTime<Utc>, reason: impl Into<String>) -> Self {
        Self {
            record,
            evicted_at,
            reason: reason.into(),
        }
    }
}
