//! Image HTTP client.

use async_trait::async_trait;
use image::DynamicImage;
use reqwest::Client;
use tracing::{debug, info, warn};

use imgtag_models::ImageReference;

use crate::config::FetchConfig;
use crate::error::{FetchError, FetchResult};
use crate::retry::{retry_async, RetryConfig};

/// Source of decoded images for the pipeline.
///
/// `None` means "nothing to classify": the server refused, the transport
/// failed, or the bytes were not an image. Implementations log the reason.
#[async_trait]
pub trait ImageSource: Send + Sync {
    async fn fetch_image(&self, url: &ImageReference) -> Option<DynamicImage>;
}

/// Fetches images over HTTP with a bounded timeout and a single retry.
pub struct HttpImageFetcher {
    http: Client,
    config: FetchConfig,
    retry: RetryConfig,
}

impl HttpImageFetcher {
    /// Create a new fetcher.
    pub fn new(config: FetchConfig) -> FetchResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        let retry = RetryConfig::default().with_max_retries(config.max_retries);

        Ok(Self {
            http,
            config,
            retry,
        })
    }

    /// Create from environment variables.
    pub fn from_env() -> FetchResult<Self> {
        Self::new(FetchConfig::from_env())
    }

    /// Override the retry policy.
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Download and decode one image, keeping the failure reason.
    pub async fn try_fetch(&self, url: &str) -> FetchResult<DynamicImage> {
        let body = retry_async(&self.retry, url, || self.download(url)).await?;
        let image = image::load_from_memory(&body)?;

        debug!(
            url = %url,
            bytes = body.len(),
            width = image.width(),
            height = image.height(),
            "Image fetched"
        );

        Ok(image)
    }

    /// One GET attempt returning the raw body.
    async fn download(&self, url: &str) -> FetchResult<Vec<u8>> {
        let mut response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify_transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::status(status.as_u16(), url));
        }

        let limit = self.config.max_bytes;
        if response.content_length().is_some_and(|len| len > limit as u64) {
            return Err(FetchError::TooLarge { limit });
        }

        // Chunked responses carry no length; stop reading once over the cap
        let mut body = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| self.classify_transport_error(e))?
        {
            if body.len() + chunk.len() > limit {
                return Err(FetchError::TooLarge { limit });
            }
            body.extend_from_slice(&chunk);
        }

        Ok(body)
    }

    fn classify_transport_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.config.timeout)
        } else {
            FetchError::Network(error)
        }
    }
}

#[async_trait]
impl ImageSource for HttpImageFetcher {
    async fn fetch_image(&self, url: &ImageReference) -> Option<DynamicImage> {
        match self.try_fetch(url.as_str()).await {
            Ok(image) => Some(image),
            Err(FetchError::Status { status, url }) => {
                info!(status, url = %url, "HTTP error={} for URL={}", status, url);
                None
            }
            // HTTP 200 with bytes that are not an image: same outcome as a failed fetch
            Err(FetchError::Decode(e)) => {
                warn!(url = %url, "Fetched body is not a decodable image: {}", e);
                None
            }
            Err(e) => {
                info!(url = %url, "Image fetch failed: {}", e);
                None
            }
        }
    }
}
