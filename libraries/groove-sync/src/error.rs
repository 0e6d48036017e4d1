use thiserror::Error;

/// Errors that can occur during a sync run
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid cutoff time: {0}")]
    InvalidCutoff(String),

    #[error("Staging aborted: {0}")]
    Staging(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),
}

pub type Result<T> = std::result::Result<T, SyncError>;
