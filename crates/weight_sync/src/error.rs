//! Error type for the sync pipeline.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("API error: {0}")]
    Client(#[from] garmin_notion_client::ClientError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

impl From<dotenvy::Error> for SyncError {
    fn from(err: dotenvy::Error) -> Self {
        SyncError::Config(err.to_string())
    }
}

/// Result type alias for sync operations.
pub type SyncResult<T> = Result<T, SyncError>;
