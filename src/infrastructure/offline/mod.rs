mod mappers;
pub mod metrics;
mod rows;
pub mod sqlite_store;

pub use metrics::{PassOutcomeStatus, ReplayMetrics, ReplayMetricsSnapshot};
pub use sqlite_store::SqliteWriteQueueStore;
