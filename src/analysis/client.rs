use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header::RETRY_AFTER, Client, StatusCode};
use tracing::{debug, info};

use super::{
    error::AnalysisError,
    protocol::{ErrorEnvelope, GenerateContentRequest, GenerateContentResponse},
    request::AnalysisRequest,
    result::{parse_analysis, AnalysisResult},
};
use crate::config::VisionConfig;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// A remote service that turns an [`AnalysisRequest`] into a reply.
///
/// One call, one outbound request. Implementations never retry.
#[async_trait]
pub trait VisionService: Send + Sync {
    /// Send the request and return the reply text without validating it.
    async fn analyze_raw(&self, request: &AnalysisRequest) -> Result<String, AnalysisError>;

    /// Send the request and strictly parse the reply.
    async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let text = self.analyze_raw(request).await?;
        parse_analysis(&text)
    }

    fn name(&self) -> &str;
}

/// Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    config: VisionConfig,
    api_key: String,
}

impl std::fmt::Debug for GeminiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiClient")
            .field("config", &self.config)
            .finish()
    }
}

impl GeminiClient {
    pub fn new(config: VisionConfig) -> Result<Self, AnalysisError> {
        let client = Client::builder()
            .build()
            .map_err(AnalysisError::ClientInit)?;
        Self::with_client(client, config)
    }

    pub fn with_client(client: Client, config: VisionConfig) -> Result<Self, AnalysisError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AnalysisError::Authentication {
                status: StatusCode::UNAUTHORIZED.as_u16(),
                message: "no API key configured".to_string(),
            })?;
        Ok(Self {
            client,
            config,
            api_key,
        })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn classify_send_error(&self, err: reqwest::Error) -> AnalysisError {
        if err.is_timeout() {
            AnalysisError::unavailable(format!(
                "request timed out after {:?}",
                self.config.timeout()
            ))
        } else {
            AnalysisError::unavailable(err.to_string())
        }
    }
}

/// Map a non-success status and its body onto the error taxonomy.
pub(crate) fn error_for_status(
    status: StatusCode,
    body: &str,
    retry_after: Option<Duration>,
) -> AnalysisError {
    let envelope = ErrorEnvelope::from_body(body);
    let message = if envelope.error.message.is_empty() {
        status.to_string()
    } else {
        envelope.error.message
    };

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AnalysisError::Authentication {
            status: status.as_u16(),
            message,
        },
        // Gemini answers an unknown key with 400 INVALID_ARGUMENT
        StatusCode::BAD_REQUEST if message.contains("API key") => AnalysisError::Authentication {
            status: status.as_u16(),
            message,
        },
        StatusCode::TOO_MANY_REQUESTS => AnalysisError::RateLimited {
            message,
            retry_after,
        },
        s if s.is_server_error() => AnalysisError::ServiceUnavailable {
            reason: format!("HTTP {}: {}", s.as_u16(), message),
        },
        s => AnalysisError::Rejected {
            status: s.as_u16(),
            message,
        },
    }
}

fn parse_retry_after(resp: &reqwest::Response) -> Option<Duration> {
    resp.headers()
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

#[async_trait]
impl VisionService for GeminiClient {
    async fn analyze_raw(&self, request: &AnalysisRequest) -> Result<String, AnalysisError> {
        let body = GenerateContentRequest::from_analysis(request, &self.config);

        debug!(
            model = %self.config.model,
            image_bytes = request.image_bytes().len(),
            mime_type = request.mime_type(),
            "Sending analysis request"
        );

        let mut req = self
            .client
            .post(self.config.generate_content_url())
            .header(API_KEY_HEADER, &self.api_key)
            .json(&body);
        if self.config.timeout() > Duration::ZERO {
            req = req.timeout(self.config.timeout());
        }

        let resp = req
            .send()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        let status = resp.status();
        let retry_after = parse_retry_after(&resp);
        let text = resp
            .text()
            .await
            .map_err(|e| self.classify_send_error(e))?;

        if !status.is_success() {
            return Err(error_for_status(status, &text, retry_after));
        }

        let reply: GenerateContentResponse = serde_json::from_str(&text)
            .map_err(|e| AnalysisError::schema(format!("malformed service response: {}", e)))?;

        if let Some(reason) = reply.block_reason() {
            return Err(AnalysisError::schema(format!("prompt blocked: {}", reason)));
        }

        let content = reply.text().ok_or_else(|| {
            AnalysisError::schema(format!(
                "reply has no text (finish reason: {})",
                reply.finish_reason().unwrap_or("unknown")
            ))
        })?;

        info!(
            model = %self.config.model,
            reply_chars = content.len(),
            "Received analysis reply"
        );

        Ok(content)
    }

    fn name(&self) -> &str {
        "gemini"
    }
}
