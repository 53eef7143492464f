use crate::application::ports::connectivity::ConnectivityMonitor;
use crate::application::ports::offline_store::{DeadLetterStore, WriteQueueStore};
use crate::application::ports::remote_data_service::RemoteDataService;
use crate::application::services::{
    EnqueuePolicy, OfflineWriteService, ReplayExecutor, ReplayScheduler, SyncStatusService,
};
use crate::infrastructure::connectivity::{HttpReachabilityProbe, ProbingConnectivityMonitor};
use crate::infrastructure::database::ConnectionPool;
use crate::infrastructure::offline::SqliteWriteQueueStore;
use crate::infrastructure::remote::PostgrestDataService;
use crate::shared::config::AppConfig;
use crate::shared::error::AppError;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Everything the offline write path needs, wired once at startup.
#[derive(Clone)]
pub struct SyncState {
    pub pool: ConnectionPool,
    pub store: Arc<SqliteWriteQueueStore>,
    pub write_service: Arc<OfflineWriteService>,
    pub scheduler: Arc<ReplayScheduler>,
    pub status: Arc<SyncStatusService>,
    pub connectivity: Arc<dyn ConnectivityMonitor>,
    /// Polled by [`SyncState::start`] when present.
    pub probing: Option<Arc<ProbingConnectivityMonitor>>,
}

impl SyncState {
    pub async fn initialize(
        config: &AppConfig,
        remote: Arc<dyn RemoteDataService>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Result<Self, AppError> {
        config.validate().map_err(AppError::ConfigurationError)?;

        let pool =
            ConnectionPool::new(&config.database.url, config.database.max_connections).await?;
        pool.migrate().await?;
        Self::with_pool(config, pool, remote, connectivity)
    }

    /// Wires services over an already migrated pool.
    pub fn with_pool(
        config: &AppConfig,
        pool: ConnectionPool,
        remote: Arc<dyn RemoteDataService>,
        connectivity: Arc<dyn ConnectivityMonitor>,
    ) -> Result<Self, AppError> {
        let store = Arc::new(SqliteWriteQueueStore::new(pool.get_pool().clone()));
        let queue: Arc<dyn WriteQueueStore> = store.clone();
        let dead_letters: Arc<dyn DeadLetterStore> = store.clone();

        let policy = EnqueuePolicy::new(config.replay.protected_tables.iter().cloned());
        let write_service = Arc::new(OfflineWriteService::new(queue.clone(), policy));

        let executor = ReplayExecutor::new(
            queue.clone(),
            remote,
            Some(dead_letters.clone()),
            config.replay.max_retries,
            Duration::from_secs(config.replay.dispatch_timeout_secs),
        );
        let scheduler = ReplayScheduler::new(
            queue.clone(),
            executor,
            connectivity.clone(),
            Duration::from_secs(config.replay.interval_secs),
        );
        let status = Arc::new(SyncStatusService::new(
            queue,
            Some(dead_letters),
            scheduler.clone(),
        ));

        tracing::info!(
            target: "offline::scheduler",
            max_retries = config.replay.max_retries,
            interval_secs = config.replay.interval_secs,
            protected_tables = ?config.replay.protected_tables,
            "offline sync state initialized"
        );

        Ok(Self {
            pool,
            store,
            write_service,
            scheduler,
            status,
            connectivity,
            probing: None,
        })
    }

    /// Attaches a probing monitor so `start` also runs its probe loop.
    pub fn with_probing(mut self, monitor: Arc<ProbingConnectivityMonitor>) -> Self {
        self.probing = Some(monitor);
        self
    }

    /// Builds the PostgREST remote and an HTTP-probing connectivity monitor from config.
    ///
    /// The monitor has probed once and is attached as `probing`; its loop runs
    /// after `start`. Platform signals can still be fed through its `report`.
    pub async fn connect(config: &AppConfig) -> Result<Self, AppError> {
        let base_url = config.remote.base_url.as_deref().ok_or_else(|| {
            AppError::ConfigurationError("remote base_url is not configured".to_string())
        })?;
        let api_key = config.remote.api_key.clone().unwrap_or_default();
        let timeout = Duration::from_secs(config.replay.dispatch_timeout_secs);

        let remote = Arc::new(PostgrestDataService::new(base_url, &api_key, timeout)?);

        let probe_url = config.probe_url().unwrap_or_else(|| format!("{base_url}/rest/v1/"));
        let probe = Arc::new(HttpReachabilityProbe::new(
            &probe_url,
            config.remote.api_key.clone(),
            timeout,
        )?);
        let monitor = ProbingConnectivityMonitor::start(
            probe,
            Duration::from_secs(config.connectivity.probe_interval_secs),
        )
        .await;

        let state = Self::initialize(config, remote, monitor.clone()).await?;
        Ok(state.with_probing(monitor))
    }

    /// Starts the replay trigger loop and, if attached, the probe loop.
    ///
    /// Both stop on `cancel`; the returned handle resolves once both have.
    pub fn start(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let probing = self
            .probing
            .as_ref()
            .map(|monitor| monitor.spawn(cancel.clone()));
        let scheduler = self.scheduler.spawn(cancel);

        tokio::spawn(async move {
            if let Err(error) = scheduler.await {
                tracing::error!(
                    target: "offline::scheduler",
                    error = %error,
                    "replay scheduler task failed"
                );
            }
            if let Some(handle) = probing {
                if let Err(error) = handle.await {
                    tracing::error!(
                        target: "offline::connectivity",
                        error = %error,
                        "probe loop task failed"
                    );
                }
            }
        })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::remote_data_service::DispatchError;
    use crate::domain::entities::offline::WriteRecord;
    use crate::infrastructure::connectivity::ReachabilityProbe;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct AcceptingRemote;

    #[async_trait]
    impl RemoteDataService for AcceptingRemote {
        async fn dispatch(&self, _record: &WriteRecord) -> Result<(), DispatchError> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingReachability {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl ReachabilityProbe for CountingReachability {
        async fn probe(&self) -> bool {
            self.calls.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    #[tokio::test]
    async fn start_polls_reachability_until_cancelled() {
        let reachability = Arc::new(CountingReachability::default());
        let monitor =
            ProbingConnectivityMonitor::start(reachability.clone(), Duration::from_millis(20)).await;
        assert_eq!(reachability.calls.load(Ordering::SeqCst), 1);

        let pool = ConnectionPool::from_memory().await.unwrap();
        pool.migrate().await.unwrap();
        let mut config = AppConfig::default();
        config.replay.interval_secs = 3600;
        let remote: Arc<dyn RemoteDataService> = Arc::new(AcceptingRemote);
        let state = SyncState::with_pool(&config, pool, remote, monitor.clone())
            .unwrap()
            .with_probing(monitor);

        let cancel = CancellationToken::new();
        let handle = state.start(cancel.clone());

        let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
        while reachability.calls.load(Ordering::SeqCst) < 3 {
            assert!(tokio::time::Instant::now() < deadline, "reachability was not polled");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        cancel.cancel();
        handle.await.unwrap();

        let stopped_at = reachability.calls.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(reachability.calls.load(Ordering::SeqCst), stopped_at);
        state.close().await;
    }
}
