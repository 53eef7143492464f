pub mod network_status;
pub mod probe;

pub use network_status::NetworkStatusMonitor;
pub use probe::{HttpReachabilityProbe, ProbingConnectivityMonitor, ReachabilityProbe};
