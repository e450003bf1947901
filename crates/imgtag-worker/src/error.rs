//! Worker error types.

use thiserror::Error;

pub type WorkerResult<T> = Result<T, WorkerError>;

/// Errors that stop the worker.
///
/// Per-record problems (bad lines, missing images, failed fetches) never
/// reach this type; they are logged and skipped by the driver.
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Inference failed: {0}")]
    Vision(#[from] imgtag_vision::VisionError),

    #[error("Fetcher setup failed: {0}")]
    Fetch(#[from] imgtag_fetch::FetchError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl WorkerError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    /// Failed before any record was read.
    pub fn is_startup_error(&self) -> bool {
        match self {
            WorkerError::ConfigError(_) | WorkerError::Fetch(_) => true,
            WorkerError::Vision(e) => e.is_startup_error(),
            WorkerError::Io(_) => false,
        }
    }
}
