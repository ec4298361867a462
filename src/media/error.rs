use std::time::Duration;

use reqwest::StatusCode;
use thiserror::Error;

pub type RetrievalResult<T> = Result<T, RetrievalError>;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("image host returned HTTP {status} for {locator}")]
    Status { status: u16, locator: String },
    #[error("network error while fetching {locator}: {cause}")]
    Transport {
        locator: String,
        #[source]
        cause: reqwest::Error,
    },
    #[error("fetching {locator} timed out after {after:?}")]
    Timeout { locator: String, after: Duration },
    #[error("invalid image locator: {locator}")]
    InvalidLocator { locator: String },
    #[error("unusable image at {locator}: {reason}")]
    InvalidContent { locator: String, reason: String },
    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
}

impl RetrievalError {
    /// HTTP status reported by the image host, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            RetrievalError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a caller-side retry has a chance of succeeding.
    pub fn is_retryable(&self) -> bool {
        match self {
            RetrievalError::Timeout { .. } | RetrievalError::Transport { .. } => true,
            RetrievalError::Status { status, .. } => StatusCode::from_u16(*status)
                .map(|s| {
                    s.is_server_error()
                        || s == StatusCode::REQUEST_TIMEOUT
                        || s == StatusCode::TOO_MANY_REQUESTS
                })
                .unwrap_or(false),
            _ => false,
        }
    }
}
