use super::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_VISION_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_VISION_MODEL: &str = "gemini-2.0-flash-exp";
pub const DEFAULT_USER_AGENT: &str = concat!("room-analyzer/", env!("CARGO_PKG_VERSION"));

/// Top-level application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Image download settings
    pub fetch: FetchConfig,
    /// Vision service settings
    pub vision: VisionConfig,
    /// How strictly the service reply is validated
    pub parse_mode: ParseMode,
    /// Caller-side retry policy wrapped around fetch and analyze
    pub retry: RetryConfig,
    /// Log level (None = info)
    pub log_level: Option<String>,
    /// Log directory (None = stderr only)
    pub log_dir: Option<String>,
    /// Emit logs as json
    pub log_json: bool,
}

impl AppConfig {
    /// Load a JSON configuration file. Missing sections fall back to defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Retry policy the pipeline should apply. `max_retries` of 1 means a single attempt.
    pub fn effective_retry_config(&self) -> RetryConfig {
        let mut retry = self.retry.clone();
        retry.max_retries = retry.max_retries.max(1);
        retry
    }
}

/// Image retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent to the image host
    pub user_agent: String,
    /// Bodies smaller than this are rejected (0 disables the check)
    pub min_image_bytes: usize,
    /// Reject responses whose declared Content-Type is not image/*
    pub require_image_content_type: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 10,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            min_image_bytes: 0,
            require_image_content_type: true,
        }
    }
}

impl FetchConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Vision service configuration
#[derive(Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct VisionConfig {
    /// Service root, without the `/v1beta` suffix
    pub base_url: String,
    /// Model name, e.g. "gemini-2.0-flash-exp"
    pub model: String,
    /// API key sent as `x-goog-api-key`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_VISION_BASE_URL.to_string(),
            model: DEFAULT_VISION_MODEL.to_string(),
            api_key: None,
            timeout_secs: 60,
            temperature: 0.4,
            top_p: 0.95,
            top_k: 40,
            max_output_tokens: 8192,
        }
    }
}

impl VisionConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Full `generateContent` endpoint for the configured model.
    pub fn generate_content_url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl std::fmt::Debug for VisionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VisionConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .field("top_p", &self.top_p)
            .field("top_k", &self.top_k)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

/// Reply validation mode
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ParseMode {
    /// Malformed replies fail with a schema mismatch
    #[default]
    Strict,
    /// Malformed replies are handed back unparsed, tagged as raw
    Lenient,
}

/// Retry configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct RetryConfig {
    /// Maximum number of attempts (1 disables retries)
    pub max_retries: u32,
    /// Initial backoff delay in milliseconds
    pub initial_backoff_ms: u64,
    /// Maximum backoff delay in milliseconds
    pub max_backoff_ms: u64,
    /// Backoff multiplier for exponential backoff
    pub backoff_multiplier: f32,
    /// Jitter factor applied to backoff (0.0 - 1.0)
    /// Effective delay D' = D * (1 + U[-j, +j])
    pub jitter_factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 1,
            initial_backoff_ms: 500,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_service_settings() {
        let config = AppConfig::default();
        assert_eq!(config.vision.model, "gemini-2.0-flash-exp");
        assert_eq!(config.vision.top_k, 40);
        assert_eq!(config.fetch.timeout(), Duration::from_secs(10));
        assert_eq!(config.parse_mode, ParseMode::Strict);
        assert_eq!(config.retry.max_retries, 1);
    }

    #[test]
    fn test_generate_content_url_trims_trailing_slash() {
        let vision = VisionConfig {
            base_url: "http://127.0.0.1:9000/".to_string(),
            model: "gemini-test".to_string(),
            ..Default::default()
        };
        assert_eq!(
            vision.generate_content_url(),
            "http://127.0.0.1:9000/v1beta/models/gemini-test:generateContent"
        );
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let vision = VisionConfig {
            api_key: Some("secret-key".to_string()),
            ..Default::default()
        };
        let rendered = format!("{:?}", vision);
        assert!(!rendered.contains("secret-key"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{"parse_mode": "lenient", "vision": {"model": "gemini-pro-vision"}}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.parse_mode, ParseMode::Lenient);
        assert_eq!(config.vision.model, "gemini-pro-vision");
        assert_eq!(config.vision.timeout_secs, 60);
        assert_eq!(config.fetch, FetchConfig::default());
    }

    #[test]
    fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"fetch": {"timeout_secs": 3}}"#).unwrap();

        let config = AppConfig::from_json_file(&path).unwrap();
        assert_eq!(config.fetch.timeout_secs, 3);

        let missing = AppConfig::from_json_file(dir.path().join("missing.json"));
        assert!(matches!(missing, Err(ConfigError::LoadFailed { .. })));
    }

    #[test]
    fn test_effective_retry_never_below_one() {
        let mut config = AppConfig::default();
        config.retry.max_retries = 0;
        assert_eq!(config.effective_retry_config().max_retries, 1);
    }
}
