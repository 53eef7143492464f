pub mod ports;
pub mod services;

pub use services::{
    EnqueuePolicy, OfflineWriteService, ReplayExecutor, ReplayScheduler, SyncStatusService,
};
