use super::replay_executor::ReplayExecutor;
use crate::application::ports::connectivity::{ConnectivityEvent, ConnectivityMonitor};
use crate::application::ports::offline_store::WriteQueueStore;
use crate::domain::entities::offline::ReplayReport;
use crate::infrastructure::offline::metrics::{ReplayMetrics, ReplayMetricsSnapshot};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum ReplayState {
    Idle,
    Replaying { snapshot_len: usize },
}

impl ReplayState {
    pub fn is_replaying(&self) -> bool {
        matches!(self, ReplayState::Replaying { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayTrigger {
    Startup,
    BecameReachable,
    Interval,
    Manual,
}

impl ReplayTrigger {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReplayTrigger::Startup => "startup",
            ReplayTrigger::BecameReachable => "became_reachable",
            ReplayTrigger::Interval => "interval",
            ReplayTrigger::Manual => "manual",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TriggerOutcome {
    Completed(ReplayReport),
    /// The pass started but a store error stopped it.
    Aborted(String),
    /// Another pass was already running.
    Skipped,
    Unreachable,
}

/// Decides when replay passes run and keeps at most one in flight.
pub struct ReplayScheduler {
    store: Arc<dyn WriteQueueStore>,
    executor: ReplayExecutor,
    connectivity: Arc<dyn ConnectivityMonitor>,
    interval: Duration,
    gate: Mutex<()>,
    state: watch::Sender<ReplayState>,
    metrics: ReplayMetrics,
}

impl ReplayScheduler {
    pub fn new(
        store: Arc<dyn WriteQueueStore>,
        executor: ReplayExecutor,
        connectivity: Arc<dyn ConnectivityMonitor>,
        interval: Duration,
    ) -> Arc<Self> {
        let (state, _) = watch::channel(ReplayState::Idle);
        Arc::new(Self {
            store,
            executor,
            connectivity,
            interval,
            gate: Mutex::new(()),
            state,
            metrics: ReplayMetrics::new(),
        })
    }

    pub fn state(&self) -> ReplayState {
        *self.state.borrow()
    }

    pub fn watch_state(&self) -> watch::Receiver<ReplayState> {
        self.state.subscribe()
    }

    pub fn metrics(&self) -> ReplayMetricsSnapshot {
        self.metrics.snapshot()
    }

    pub fn is_reachable(&self) -> bool {
        self.connectivity.is_reachable()
    }

    /// Runs one pass unless another is in flight or the remote is unreachable.
    ///
    /// A trigger arriving during a pass is dropped, not queued; the next
    /// event or timer tick covers anything it would have picked up.
    pub async fn trigger(&self, trigger: ReplayTrigger) -> TriggerOutcome {
        if !self.connectivity.is_reachable() {
            tracing::debug!(
                target: "offline::scheduler",
                trigger = trigger.as_str(),
                "remote unreachable, replay not started"
            );
            return TriggerOutcome::Unreachable;
        }

        let _gate = match self.gate.try_lock() {
            Ok(guard) => guard,
            Err(_) => {
                self.metrics.record_skipped();
                tracing::debug!(
                    target: "offline::scheduler",
                    trigger = trigger.as_str(),
                    "replay already running, trigger dropped"
                );
                return TriggerOutcome::Skipped;
            }
        };

        let _idle = IdleOnDrop(&self.state);
        self.run_pass(trigger).await
    }

    async fn run_pass(&self, trigger: ReplayTrigger) -> TriggerOutcome {
        let records = match self.store.list_all().await {
            Ok(records) => records,
            Err(err) => return self.abort(trigger, err.to_string()),
        };

        let snapshot_len = records.len();
        self.state.send_replace(ReplayState::Replaying { snapshot_len });
        tracing::info!(
            target: "offline::scheduler",
            trigger = trigger.as_str(),
            snapshot_len,
            "replay pass started"
        );

        match self.executor.run_pass(records).await {
            Ok(report) => {
                self.metrics.record_completed(trigger.as_str(), &report);
                tracing::info!(
                    target: "offline::scheduler",
                    trigger = trigger.as_str(),
                    delivered = report.delivered,
                    failed = report.failed,
                    evicted = report.evicted,
                    duration_ms = report.duration_ms(),
                    "replay pass completed"
                );
                TriggerOutcome::Completed(report)
            }
            Err(err) => self.abort(trigger, err.to_string()),
        }
    }

    fn abort(&self, trigger: ReplayTrigger, error: String) -> TriggerOutcome {
        self.metrics.record_aborted(trigger.as_str(), &error);
        tracing::error!(
            target: "offline::scheduler",
            trigger = trigger.as_str(),
            error = %error,
            "replay pass aborted"
        );
        TriggerOutcome::Aborted(error)
    }

    /// Starts the trigger loop: a startup pass when already reachable, one pass
    /// per became-reachable transition, and a periodic pass while reachable.
    ///
    /// Cancelling the token stops new passes. A pass already in flight runs to
    /// completion.
    pub fn spawn(self: &Arc<Self>, cancel: CancellationToken) -> JoinHandle<()> {
        // Subscribe before spawning so an early transition is not missed.
        let events = self.connectivity.subscribe();
        let scheduler = Arc::clone(self);

        tokio::spawn(async move {
            scheduler.run_loop(events, cancel).await;
            tracing::debug!(target: "offline::scheduler", "replay scheduler stopped");
        })
    }

    async fn run_loop(
        self: Arc<Self>,
        events: broadcast::Receiver<ConnectivityEvent>,
        cancel: CancellationToken,
    ) {
        let mut events = Some(events);

        if self.connectivity.is_reachable() {
            self.dispatch_trigger(ReplayTrigger::Startup);
        }

        let start = tokio::time::Instant::now() + self.interval;
        let mut ticker = tokio::time::interval_at(start, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => break,
                event = next_event(&mut events) => match event {
                    Ok(ConnectivityEvent::BecameReachable) => {
                        self.dispatch_trigger(ReplayTrigger::BecameReachable);
                    }
                    Ok(ConnectivityEvent::BecameUnreachable) => {
                        tracing::debug!(
                            target: "offline::scheduler",
                            "remote became unreachable"
                        );
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            target: "offline::scheduler",
                            skipped,
                            "connectivity events lagged"
                        );
                        if self.connectivity.is_reachable() {
                            self.dispatch_trigger(ReplayTrigger::BecameReachable);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => {
                        tracing::warn!(
                            target: "offline::scheduler",
                            "connectivity events closed, falling back to timer"
                        );
                        events = None;
                    }
                },
                _ = ticker.tick() => {
                    if self.connectivity.is_reachable() {
                        self.dispatch_trigger(ReplayTrigger::Interval);
                    }
                }
            }
        }
    }

    fn dispatch_trigger(self: &Arc<Self>, trigger: ReplayTrigger) {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            scheduler.trigger(trigger).await;
        });
    }
}

/// Publishes `Idle` when a pass ends, whether it returned or unwound.
struct IdleOnDrop<'a>(&'a watch::Sender<ReplayState>);

impl Drop for IdleOnDrop<'_> {
    fn drop(&mut self) {
        self.0.send_replace(ReplayState::Idle);
    }
}

async fn next_event(
    events: &mut Option<broadcast::Receiver<ConnectivityEvent>>,
) -> Result<ConnectivityEvent, broadcast::error::RecvError> {
    match events {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
