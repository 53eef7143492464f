pub mod enqueue_policy;
pub mod offline_write_service;
pub mod replay_executor;
pub mod replay_scheduler;
pub mod sync_status_service;

pub use enqueue_policy::EnqueuePolicy;
pub use offline_write_service::{OfflineWriteService, OfflineWriteServiceTrait};
pub use replay_executor::ReplayExecutor;
pub use replay_scheduler::{ReplayScheduler, ReplayState, ReplayTrigger, TriggerOutcome};
pub use sync_status_service::{SyncStatusService, SyncStatusSnapshot};
