mod common;

use common::{care_event, setup_harness, wait_until};
use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use verdant_sync::{
    DeadLetterStore, OfflineWriteServiceTrait, RecordOutcome, ReplayState, ReplayTrigger,
    TriggerOutcome, WriteId,
};

async fn enqueue_care_events(harness: &common::SyncHarness, count: usize) -> Vec<WriteId> {
    let mut ids = Vec::with_capacity(count);
    for index in 0..count {
        ids.push(
            harness
                .state
                .write_service
                .enqueue(care_event(index))
                .await
                .unwrap(),
        );
    }
    ids
}

fn as_strings(ids: &[&WriteId]) -> Vec<String> {
    ids.iter().map(|id| id.as_str().to_string()).collect()
}

#[tokio::test]
async fn partial_failure_keeps_order_and_only_failed_record() {
    let harness = setup_harness(true).await;
    let ids = enqueue_care_events(&harness, 3).await;
    let (a, b, c) = (&ids[0], &ids[1], &ids[2]);
    harness.remote.fail_record(b.as_str());

    let outcome = harness.state.scheduler.trigger(ReplayTrigger::Manual).await;
    let report = match outcome {
        TriggerOutcome::Completed(report) => report,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(report.delivered, 2);
    assert_eq!(report.failed, 1);

    assert_eq!(harness.remote.attempt_ids(), as_strings(&[a, b, c]));
    assert_eq!(harness.remote.delivered_ids(), as_strings(&[a, c]));

    let remaining = harness.state.write_service.list_pending().await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(&remaining[0].id, b);
    assert_eq!(remaining[0].retries, 1);
}

#[tokio::test]
async fn exhausted_records_are_evicted_without_dispatch() {
    let harness = setup_harness(true).await;
    enqueue_care_events(&harness, 5).await;
    harness.remote.fail_all(true);

    for pass in 1..=5u32 {
        let outcome = harness.state.scheduler.trigger(ReplayTrigger::Manual).await;
        match outcome {
            TriggerOutcome::Completed(report) => {
                assert_eq!(report.failed, 5);
                assert_eq!(report.evicted, 0);
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        let pending = harness.state.write_service.list_pending().await.unwrap();
        assert_eq!(pending.len(), 5);
        assert!(pending.iter().all(|record| record.retries == pass));
    }
    assert_eq!(harness.remote.attempt_count(), 25);

    let outcome = harness.state.scheduler.trigger(ReplayTrigger::Manual).await;
    let report = match outcome {
        TriggerOutcome::Completed(report) => report,
        other => panic!("unexpected outcome {other:?}"),
    };
    assert_eq!(report.evicted, 5);
    assert_eq!(report.dispatched, 0);
    assert!(report
        .results
        .iter()
        .all(|result| result.outcome == RecordOutcome::Evicted { retries: 5 }));

    assert_eq!(harness.remote.attempt_count(), 25);
    assert_eq!(harness.state.write_service.pending_count().await.unwrap(), 0);

    let letters = harness.state.store.list_dead_letters().await.unwrap();
    assert_eq!(letters.len(), 5);
    let snapshot = harness.state.status.snapshot().await.unwrap();
    assert_eq!(snapshot.dead_letter_count, Some(5));
    assert_eq!(snapshot.metrics.total_evicted, 5);
}

#[tokio::test]
async fn overlapping_triggers_run_a_single_pass() {
    let harness = setup_harness(true).await;
    enqueue_care_events(&harness, 3).await;
    harness.remote.set_delay(Duration::from_millis(50));

    let mut state = harness.state.scheduler.watch_state();
    let first = {
        let scheduler = harness.state.scheduler.clone();
        tokio::spawn(async move { scheduler.trigger(ReplayTrigger::Manual).await })
    };
    state.wait_for(|s| s.is_replaying()).await.unwrap();

    let second = harness
        .state
        .scheduler
        .trigger(ReplayTrigger::BecameReachable)
        .await;
    let third = harness.state.scheduler.trigger(ReplayTrigger::Interval).await;
    assert_eq!(second, TriggerOutcome::Skipped);
    assert_eq!(third, TriggerOutcome::Skipped);

    assert!(matches!(
        first.await.unwrap(),
        TriggerOutcome::Completed(_)
    ));

    let attempts = harness.remote.attempt_ids();
    assert_eq!(attempts.len(), 3);
    assert_eq!(attempts.iter().collect::<HashSet<_>>().len(), 3);
    assert_eq!(harness.remote.max_in_flight(), 1);

    let metrics = harness.state.scheduler.metrics();
    assert_eq!(metrics.total_passes, 1);
    assert_eq!(metrics.skipped_triggers, 2);
    assert_eq!(harness.state.scheduler.state(), ReplayState::Idle);
}

#[tokio::test]
async fn write_enqueued_mid_pass_waits_for_next_pass() {
    let harness = setup_harness(true).await;
    enqueue_care_events(&harness, 1).await;
    harness.remote.set_delay(Duration::from_millis(50));

    let mut state = harness.state.scheduler.watch_state();
    let running = {
        let scheduler = harness.state.scheduler.clone();
        tokio::spawn(async move { scheduler.trigger(ReplayTrigger::Manual).await })
    };
    state.wait_for(|s| s.is_replaying()).await.unwrap();
    let late = harness
        .state
        .write_service
        .enqueue(care_event(99))
        .await
        .unwrap();

    match running.await.unwrap() {
        TriggerOutcome::Completed(report) => assert_eq!(report.snapshot_len, 1),
        other => panic!("unexpected outcome {other:?}"),
    }
    let pending = harness.state.write_service.list_pending().await.unwrap();
    assert_eq!(pending.len(), 1);
    assert_eq!(pending[0].id, late);
    assert_eq!(pending[0].retries, 0);

    harness.state.scheduler.trigger(ReplayTrigger::Manual).await;
    assert_eq!(harness.state.write_service.pending_count().await.unwrap(), 0);
}

#[tokio::test]
async fn reconnect_event_drains_queue_in_one_pass() {
    let harness = setup_harness(false).await;
    enqueue_care_events(&harness, 3).await;

    let cancel = CancellationToken::new();
    let handle = harness.state.start(cancel.clone());

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(harness.remote.attempt_count(), 0);
    assert_eq!(harness.state.scheduler.metrics().total_passes, 0);

    assert!(harness.network.report(true).is_some());

    let scheduler = harness.state.scheduler.clone();
    wait_until(|| {
        let scheduler = scheduler.clone();
        async move { scheduler.metrics().total_passes == 1 }
    })
    .await;

    assert_eq!(harness.state.write_service.pending_count().await.unwrap(), 0);
    assert_eq!(harness.remote.attempt_count(), 3);
    let metrics = harness.state.scheduler.metrics();
    assert_eq!(metrics.total_passes, 1);
    assert_eq!(metrics.last_trigger.as_deref(), Some("became_reachable"));

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn startup_pass_runs_when_already_reachable() {
    let harness = setup_harness(true).await;
    enqueue_care_events(&harness, 2).await;

    let cancel = CancellationToken::new();
    let handle = harness.state.start(cancel.clone());

    let scheduler = harness.state.scheduler.clone();
    wait_until(|| {
        let scheduler = scheduler.clone();
        async move { scheduler.metrics().total_passes == 1 }
    })
    .await;

    assert_eq!(harness.state.write_service.pending_count().await.unwrap(), 0);
    assert_eq!(
        harness.state.scheduler.metrics().last_trigger.as_deref(),
        Some("startup")
    );

    cancel.cancel();
    handle.await.unwrap();
}

#[tokio::test]
async fn status_reflects_pending_writes_while_offline() {
    let harness = setup_harness(false).await;
    enqueue_care_events(&harness, 4).await;

    let outcome = harness.state.scheduler.trigger(ReplayTrigger::Manual).await;
    assert_eq!(outcome, TriggerOutcome::Unreachable);

    let snapshot = harness.state.status.snapshot().await.unwrap();
    assert_eq!(snapshot.pending_count, 4);
    assert!(!snapshot.is_reachable);
    assert_eq!(snapshot.replay_state, ReplayState::Idle);
    assert_eq!(harness.state.status.pending_count().await.unwrap(), 4);
}
