pub mod connectivity;
pub mod offline_store;
pub mod remote_data_service;

pub use connectivity::{ConnectivityEvent, ConnectivityMonitor};
pub use offline_store::{DeadLetterStore, WriteQueueStore};
pub use remote_data_service::{DispatchError, RemoteDataService};
