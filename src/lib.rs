pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod shared;
pub mod state;

pub use application::ports::{
    ConnectivityEvent, ConnectivityMonitor, DeadLetterStore, DispatchError, RemoteDataService,
    WriteQueueStore,
};
pub use application::services::{
    EnqueuePolicy, OfflineWriteService, OfflineWriteServiceTrait, ReplayExecutor,
    ReplayScheduler, ReplayState, ReplayTrigger, SyncStatusService, SyncStatusSnapshot,
    TriggerOutcome,
};
pub use domain::entities::{
    DeadLetterRecord, RecordOutcome, ReplayReport, WriteRecord, WriteRequest,
};
pub use domain::value_objects::{TableName, WriteFilters, WriteId, WriteOperation, WritePayload};
pub use infrastructure::connectivity::{
    HttpReachabilityProbe, NetworkStatusMonitor, ProbingConnectivityMonitor, ReachabilityProbe,
};
pub use infrastructure::database::ConnectionPool;
pub use infrastructure::offline::{ReplayMetricsSnapshot, SqliteWriteQueueStore};
pub use infrastructure::remote::PostgrestDataService;
pub use shared::config::AppConfig;
pub use shared::error::AppError;
pub use state::SyncState;

/// Installs the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_logging() {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "verdant_sync=debug,info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
