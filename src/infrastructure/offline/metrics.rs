use crate::domain::entities::offline::ReplayReport;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PassOutcomeStatus {
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ReplayMetricsSnapshot {
    pub total_passes: u64,
    pub aborted_passes: u64,
    pub skipped_triggers: u64,
    pub total_dispatched: u64,
    pub total_delivered: u64,
    pub total_failed: u64,
    pub total_evicted: u64,
    pub last_outcome: Option<PassOutcomeStatus>,
    pub last_trigger: Option<String>,
    pub last_snapshot_len: Option<usize>,
    pub last_duration_ms: Option<u64>,
    pub last_error: Option<String>,
    pub last_completed_ms: Option<u64>,
}

#[derive(Default, Clone)]
struct LastPassMetadata {
    outcome: Option<PassOutcomeStatus>,
    trigger: Option<String>,
    snapshot_len: Option<usize>,
    duration_ms: Option<u64>,
    error: Option<String>,
}

/// Counters for one scheduler's replay passes.
pub struct ReplayMetrics {
    passes: AtomicU64,
    aborted: AtomicU64,
    skipped: AtomicU64,
    dispatched: AtomicU64,
    delivered: AtomicU64,
    failed: AtomicU64,
    evicted: AtomicU64,
    last_completed_ms: AtomicU64,
    metadata: Mutex<LastPassMetadata>,
}

impl ReplayMetrics {
    pub fn new() -> Self {
        Self {
            passes: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            dispatched: AtomicU64::new(0),
            delivered: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            evicted: AtomicU64::new(0),
            last_completed_ms: AtomicU64::new(0),
            metadata: Mutex::new(LastPassMetadata::default()),
        }
    }

    pub fn record_completed(&self, trigger: &str, report: &ReplayReport) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.dispatched
            .fetch_add(u64::from(report.dispatched), Ordering::Relaxed);
        self.delivered
            .fetch_add(u64::from(report.delivered), Ordering::Relaxed);
        self.failed.fetch_add(u64::from(report.failed), Ordering::Relaxed);
        self.evicted
            .fetch_add(u64::from(report.evicted), Ordering::Relaxed);
        self.last_completed_ms
            .store(current_unix_ms(), Ordering::Relaxed);

        if let Ok(mut guard) = self.metadata.lock() {
            guard.outcome = Some(PassOutcomeStatus::Completed);
            guard.trigger = Some(trigger.to_string());
            guard.snapshot_len = Some(report.snapshot_len);
            guard.duration_ms = Some(report.duration_ms());
            guard.error = None;
        }
    }

    pub fn record_aborted(&self, trigger: &str, error: &str) {
        self.passes.fetch_add(1, Ordering::Relaxed);
        self.aborted.fetch_add(1, Ordering::Relaxed);

        if let Ok(mut guard) = self.metadata.lock() {
            guard.outcome = Some(PassOutcomeStatus::Aborted);
            guard.trigger = Some(trigger.to_string());
            guard.snapshot_len = None;
            guard.duration_ms = None;
            guard.error = Some(error.to_string());
        }
    }

    pub fn record_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ReplayMetricsSnapshot {
        let metadata = self
            .metadata
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default();

        ReplayMetricsSnapshot {
            total_passes: self.passes.load(Ordering::Relaxed),
            aborted_passes: self.aborted.load(Ordering::Relaxed),
            skipped_triggers: self.skipped.load(Ordering::Relaxed),
            total_dispatched: self.dispatched.load(Ordering::Relaxed),
            total_delivered: self.delivered.load(Ordering::Relaxed),
            total_failed: self.failed.load(Ordering::Relaxed),
            total_evicted: self.evicted.load(Ordering::Relaxed),
            last_outcome: metadata.outcome,
            last_trigger: metadata.trigger,
            last_snapshot_len: metadata.snapshot_len,
            last_duration_ms: metadata.duration_ms,
            last_error: metadata.error,
            last_completed_ms: to_option(self.last_completed_ms.load(Ordering::Relaxed)),
        }
    }
}

impl Default for ReplayMetrics {
    fn default() -> Self {
        Self::new()
    }
}

fn to_option(value: u64) -> Option<u64> {
    if value == 0 { None } else { Some(value) }
}

fn current_unix_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|duration| duration.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::offline::RecordOutcome;
    use crate::domain::value_objects::offline::WriteId;

    #[test]
    fn record_completed_and_aborted() {
        let metrics = ReplayMetrics::new();

        let mut report = ReplayReport::begin(3);
        report.push(WriteId::generate(), RecordOutcome::Delivered);
        report.push(
            WriteId::generate(),
            RecordOutcome::Retained {
                retries: 1,
                error: "timeout".into(),
            },
        );
        report.push(WriteId::generate(), RecordOutcome::Evicted { retries: 5 });
        metrics.record_completed("became_reachable", &report.finish());

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_passes, 1);
        assert_eq!(snapshot.total_dispatched, 2);
        assert_eq!(snapshot.total_delivered, 1);
        assert_eq!(snapshot.total_failed, 1);
        assert_eq!(snapshot.total_evicted, 1);
        assert_eq!(snapshot.last_outcome, Some(PassOutcomeStatus::Completed));
        assert_eq!(snapshot.last_trigger.as_deref(), Some("became_reachable"));
        assert_eq!(snapshot.last_snapshot_len, Some(3));
        assert!(snapshot.last_completed_ms.is_some());

        metrics.record_aborted("interval", "database is locked");
        metrics.record_skipped();
        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_passes, 2);
        assert_eq!(snapshot.aborted_passes, 1);
        assert_eq!(snapshot.skipped_triggers, 1);
        assert_eq!(snapshot.last_outcome, Some(PassOutcomeStatus::Aborted));
        assert_eq!(snapshot.last_error.as_deref(), Some("database is locked"));
    }
}
