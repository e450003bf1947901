//! HTTP image retrieval.
//!
//! This crate provides the `ImageSource` seam used by the stream driver and
//! its reqwest implementation. A failed fetch is an expected outcome, so the
//! public API returns `Option` and logs; `HttpImageFetcher::try_fetch` keeps
//! the typed error for callers that need it.

pub mod client;
pub mod config;
pub mod error;
pub mod retry;

pub use client::{HttpImageFetcher, ImageSource};
pub use config::FetchConfig;
pub use error::{FetchError, FetchResult};
pub use retry::RetryConfig;
