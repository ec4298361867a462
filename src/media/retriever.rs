use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use tracing::{debug, info};
use url::Url;

use super::{
    error::{RetrievalError, RetrievalResult},
    format,
};
use crate::catalog::ImageRecord;
use crate::config::FetchConfig;

/// A downloaded sample image, ready to be packaged into an analysis request.
#[derive(Debug, Clone)]
pub struct RetrievedImage {
    pub record: ImageRecord,
    pub bytes: Bytes,
    pub mime_type: String,
    /// Width and height when the header could be read
    pub dimensions: Option<(u32, u32)>,
}

impl RetrievedImage {
    pub fn new(record: ImageRecord, bytes: impl Into<Bytes>, mime_type: impl Into<String>) -> Self {
        let bytes = bytes.into();
        let dimensions = format::read_dimensions(&bytes);
        Self {
            record,
            bytes,
            mime_type: mime_type.into(),
            dimensions,
        }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// Fetches the bytes behind a catalog record.
///
/// Implementations make exactly one attempt per call. Retry policies wrap the
/// trait from the outside (see [`crate::retry`]).
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, record: &ImageRecord) -> RetrievalResult<RetrievedImage>;
}

/// HTTP implementation of [`ImageFetcher`].
#[derive(Clone)]
pub struct ImageRetriever {
    client: Client,
    fetch_timeout: Duration,
    min_image_bytes: usize,
    require_image_content_type: bool,
}

impl ImageRetriever {
    /// Build a retriever with its own HTTP client.
    pub fn new(config: &FetchConfig) -> RetrievalResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(RetrievalError::ClientInit)?;
        Ok(Self::with_client(client, config))
    }

    /// Build a retriever around an existing client.
    pub fn with_client(client: Client, config: &FetchConfig) -> Self {
        Self {
            client,
            fetch_timeout: config.timeout(),
            min_image_bytes: config.min_image_bytes,
            require_image_content_type: config.require_image_content_type,
        }
    }

    fn classify(&self, locator: &str, err: reqwest::Error) -> RetrievalError {
        if err.is_timeout() {
            RetrievalError::Timeout {
                locator: locator.to_string(),
                after: self.fetch_timeout,
            }
        } else {
            RetrievalError::Transport {
                locator: locator.to_string(),
                cause: err,
            }
        }
    }

    fn invalid(locator: &str, reason: impl Into<String>) -> RetrievalError {
        RetrievalError::InvalidContent {
            locator: locator.to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ImageFetcher for ImageRetriever {
    async fn fetch(&self, record: &ImageRecord) -> RetrievalResult<RetrievedImage> {
        let locator = record.source_locator.as_str();
        let url = Url::parse(locator).map_err(|_| RetrievalError::InvalidLocator {
            locator: locator.to_string(),
        })?;

        debug!(record = %record.id, locator, "Fetching sample image");

        let mut req = self.client.get(url);
        if self.fetch_timeout > Duration::ZERO {
            req = req.timeout(self.fetch_timeout);
        }

        let resp = req.send().await.map_err(|e| self.classify(locator, e))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RetrievalError::Status {
                status: status.as_u16(),
                locator: locator.to_string(),
            });
        }

        let declared = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(format::essence);

        if self.require_image_content_type {
            if let Some(declared) = declared.as_deref() {
                if !declared.starts_with("image/") {
                    return Err(Self::invalid(
                        locator,
                        format!("unexpected content type '{}'", declared),
                    ));
                }
            }
        }

        let bytes = resp.bytes().await.map_err(|e| self.classify(locator, e))?;

        // An empty body is passed through; request building rejects it
        if bytes.len() < self.min_image_bytes {
            return Err(Self::invalid(
                locator,
                format!(
                    "image too small: {} bytes (minimum {})",
                    bytes.len(),
                    self.min_image_bytes
                ),
            ));
        }

        let mime_type = format::resolve_mime_type(declared.as_deref(), &bytes);
        let image = RetrievedImage::new(record.clone(), bytes, mime_type);

        info!(
            record = %record.id,
            bytes = image.len(),
            mime_type = %image.mime_type,
            dimensions = ?image.dimensions,
            "Fetched sample image"
        );

        Ok(image)
    }
}
