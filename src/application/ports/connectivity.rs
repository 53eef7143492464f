use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityEvent {
    BecameReachable,
    BecameUnreachable,
}

/// Reachability of the remote data service.
pub trait ConnectivityMonitor: Send + Sync {
    fn is_reachable(&self) -> bool;
    /// Receives transitions only; repeated reports of the same state are not re-emitted.
    fn subscribe(&self) -> broadcast::Receiver<ConnectivityEvent>;
}
