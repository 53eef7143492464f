use crate::domain::entities::offline::WriteRecord;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DispatchError {
    #[error("Network failure: {0}")]
    Network(String),

    #[error("Remote rejected write with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("Dispatch timed out after {0} ms")]
    Timeout(u64),

    #[error("Write cannot be expressed as a remote request: {0}")]
    InvalidRequest(String),
}

impl DispatchError {
    /// Whether a later attempt could plausibly succeed. Replay retries every
    /// failure regardless; this only feeds logging.
    pub fn is_retryable(&self) -> bool {
        match self {
            DispatchError::Network(_) | DispatchError::Timeout(_) => true,
            DispatchError::Rejected { status, .. } => {
                *status == 408 || *status == 429 || *status >= 500
            }
            DispatchError::InvalidRequest(_) => false,
        }
    }
}

/// The remote system of record. One call per queued write.
#[async_trait]
pub trait RemoteDataService: Send + Sync {
    async fn dispatch(&self, record: &WriteRecord) -> Result<(), DispatchError>;
}
