//! Image fetch error types.

use std::time::Duration;

use thiserror::Error;

pub type FetchResult<T> = Result<T, FetchError>;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error={status} for URL={url}")]
    Status { status: u16, url: String },

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Response body exceeds {limit} bytes")]
    TooLarge { limit: usize },

    #[error("Undecodable image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl FetchError {
    pub fn status(status: u16, url: impl Into<String>) -> Self {
        Self::Status {
            status,
            url: url.into(),
        }
    }

    /// Transport failures, timeouts, 5xx and 429 may succeed on a second try.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Network(_) | FetchError::Timeout(_) => true,
            FetchError::Status { status, .. } => *status == 429 || *status >= 500,
            FetchError::TooLarge { .. } | FetchError::Decode(_) => false,
        }
    }

    /// HTTP status code, if the server answered.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            FetchError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
