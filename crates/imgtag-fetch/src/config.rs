//! Fetcher configuration.

use std::time::Duration;

/// Default cap on image body size (20 MiB).
const DEFAULT_MAX_BYTES: usize = 20 * 1024 * 1024;

/// Configuration for image retrieval.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Overall request timeout
    pub timeout: Duration,
    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,
    /// Retries after the first attempt
    pub max_retries: u32,
    /// Largest accepted response body
    pub max_bytes: usize,
    /// User-Agent header
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            max_retries: 1,
            max_bytes: DEFAULT_MAX_BYTES,
            user_agent: default_user_agent(),
        }
    }
}

impl FetchConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            timeout: Duration::from_secs(
                std::env::var("IMGTAG_FETCH_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            connect_timeout: Duration::from_secs(
                std::env::var("IMGTAG_FETCH_CONNECT_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(10),
            ),
            max_retries: std::env::var("IMGTAG_FETCH_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(1),
            max_bytes: std::env::var("IMGTAG_FETCH_MAX_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_MAX_BYTES),
            user_agent: std::env::var("IMGTAG_USER_AGENT").unwrap_or_else(|_| default_user_agent()),
        }
    }
}

fn default_user_agent() -> String {
    format!("imgtag/{}", env!("CARGO_PKG_VERSION"))
}
