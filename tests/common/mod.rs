#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use std::future::Future;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use verdant_sync::{
    AppConfig, ConnectionPool, DispatchError, NetworkStatusMonitor, RemoteDataService, SyncState,
    TableName, WriteFilters, WritePayload, WriteRecord, WriteRequest,
};

/// Remote double that records every dispatch attempt in arrival order.
#[derive(Default)]
pub struct ScriptedRemote {
    failing: Mutex<HashSet<String>>,
    fail_all: AtomicBool,
    delay: Mutex<Option<Duration>>,
    attempts: Mutex<Vec<WriteRecord>>,
    delivered: Mutex<Vec<WriteRecord>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_record(&self, id: &str) {
        self.failing.lock().unwrap().insert(id.to_string());
    }

    pub fn fail_all(&self, enabled: bool) {
        self.fail_all.store(enabled, Ordering::SeqCst);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn attempts(&self) -> Vec<WriteRecord> {
        self.attempts.lock().unwrap().clone()
    }

    pub fn attempt_ids(&self) -> Vec<String> {
        ids(&self.attempts.lock().unwrap())
    }

    pub fn delivered_ids(&self) -> Vec<String> {
        ids(&self.delivered.lock().unwrap())
    }

    pub fn attempt_count(&self) -> usize {
        self.attempts.lock().unwrap().len()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

fn ids(records: &[WriteRecord]) -> Vec<String> {
    records.iter().map(|r| r.id.as_str().to_string()).collect()
}

#[async_trait]
impl RemoteDataService for ScriptedRemote {
    async fn dispatch(&self, record: &WriteRecord) -> Result<(), DispatchError> {
        let now_in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now_in_flight, Ordering::SeqCst);
        self.attempts.lock().unwrap().push(record.clone());

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let fails = self.fail_all.load(Ordering::SeqCst)
            || self.failing.lock().unwrap().contains(record.id.as_str());
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if fails {
            return Err(DispatchError::Rejected {
                status: 503,
                body: "service unavailable".into(),
            });
        }
        self.delivered.lock().unwrap().push(record.clone());
        Ok(())
    }
}

pub struct SyncHarness {
    pub state: SyncState,
    pub remote: Arc<ScriptedRemote>,
    pub network: Arc<NetworkStatusMonitor>,
}

pub fn memory_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.database.url = "sqlite::memory:".to_string();
    config.replay.interval_secs = 3600;
    config.replay.dispatch_timeout_secs = 5;
    config
}

pub async fn setup_harness(reachable: bool) -> SyncHarness {
    setup_harness_with(memory_config(), reachable).await
}

pub async fn setup_harness_with(config: AppConfig, reachable: bool) -> SyncHarness {
    let pool = ConnectionPool::new(&config.database.url, config.database.max_connections)
        .await
        .expect("sqlite pool");
    pool.migrate().await.expect("migrations");

    let remote = ScriptedRemote::new();
    let network = Arc::new(NetworkStatusMonitor::new(reachable));
    let state = SyncState::with_pool(&config, pool, remote.clone(), network.clone())
        .expect("sync state");

    SyncHarness {
        state,
        remote,
        network,
    }
}

pub fn table(name: &str) -> TableName {
    TableName::parse(name).expect("table name")
}

pub fn care_event(index: usize) -> WriteRequest {
    WriteRequest::insert(
        table("care_events"),
        WritePayload::new(json!({
            "plant_id": format!("plant-{index}"),
            "kind": "watering",
            "noted_at": Utc::now().timestamp_millis(),
        }))
        .expect("payload"),
    )
}

pub fn rename_plant(id: &str, nickname: &str) -> WriteRequest {
    WriteRequest::update(
        table("plant_profiles"),
        WritePayload::new(json!({"nickname": nickname})).expect("payload"),
        WriteFilters::eq("id", id),
    )
}

/// Polls `condition` until it holds or two seconds pass.
pub async fn wait_until<F, Fut>(mut condition: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition().await {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met within 2s"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
