use reqwest::StatusCode;
use thiserror::Error;

/// Failures raised while talking to the upstream directory.
///
/// These never leave the service: each operation folds them into an
/// [`platform_api::Outcome`] through [`DirectoryError::status`].
#[derive(Debug, Error)]
pub enum DirectoryError {
    #[error("upstream request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("upstream rejected the request with status {0}")]
    Rejected(StatusCode),
    #[error("upstream body could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("employee `{id}` has no salary")]
    MissingSalary { id: String },
    #[error("upstream base url `{0}` cannot carry path segments")]
    InvalidBaseUrl(String),
    #[error("upstream worker pool is closed")]
    PoolClosed,
}

impl DirectoryError {
    /// Status reported to the caller: the upstream status for a rejection,
    /// the generic server error for everything else.
    pub fn status(&self) -> StatusCode {
        match self {
            DirectoryError::Rejected(status) => *status,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}
