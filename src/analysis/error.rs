use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("vision service unavailable: {reason}")]
    ServiceUnavailable { reason: String },
    #[error("vision service rejected credentials (HTTP {status}): {message}")]
    Authentication { status: u16, message: String },
    #[error("vision service is throttling requests: {message}")]
    RateLimited {
        message: String,
        retry_after: Option<Duration>,
    },
    #[error("vision service reply does not match the expected schema: {reason}")]
    SchemaMismatch { reason: String },
    #[error("vision service refused the request (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("failed to build HTTP client: {0}")]
    ClientInit(#[source] reqwest::Error),
}

impl AnalysisError {
    pub(crate) fn schema(reason: impl Into<String>) -> Self {
        AnalysisError::SchemaMismatch {
            reason: reason.into(),
        }
    }

    pub(crate) fn unavailable(reason: impl Into<String>) -> Self {
        AnalysisError::ServiceUnavailable {
            reason: reason.into(),
        }
    }

    /// Transport failures and throttling are worth retrying; everything else
    /// fails the same way again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AnalysisError::ServiceUnavailable { .. } | AnalysisError::RateLimited { .. }
        )
    }
}
