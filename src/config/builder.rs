use super::{AppConfig, ConfigResult, ConfigValidator, ParseMode, RetryConfig};

/// Builder for AppConfig that wraps the config itself
#[derive(Debug, Clone, Default)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing configuration, e.g. one loaded from a file
    pub fn from_config(config: AppConfig) -> Self {
        Self { config }
    }

    // ==================== Fetch ====================

    pub fn fetch_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.fetch.timeout_secs = timeout_secs;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.fetch.user_agent = user_agent.into();
        self
    }

    pub fn min_image_bytes(mut self, min_image_bytes: usize) -> Self {
        self.config.fetch.min_image_bytes = min_image_bytes;
        self
    }

    pub fn require_image_content_type(mut self, require: bool) -> Self {
        self.config.fetch.require_image_content_type = require;
        self
    }

    // ==================== Vision ====================

    pub fn vision_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.vision.base_url = base_url.into();
        self
    }

    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.vision.model = model.into();
        self
    }

    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.config.vision.api_key = Some(api_key.into());
        self
    }

    pub fn maybe_api_key(mut self, api_key: Option<impl Into<String>>) -> Self {
        if let Some(key) = api_key {
            self.config.vision.api_key = Some(key.into());
        }
        self
    }

    pub fn vision_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.config.vision.timeout_secs = timeout_secs;
        self
    }

    pub fn temperature(mut self, temperature: f32) -> Self {
        self.config.vision.temperature = temperature;
        self
    }

    pub fn max_output_tokens(mut self, max_output_tokens: u32) -> Self {
        self.config.vision.max_output_tokens = max_output_tokens;
        self
    }

    // ==================== Pipeline ====================

    pub fn parse_mode(mut self, parse_mode: ParseMode) -> Self {
        self.config.parse_mode = parse_mode;
        self
    }

    pub fn lenient(self, lenient: bool) -> Self {
        self.parse_mode(if lenient {
            ParseMode::Lenient
        } else {
            ParseMode::Strict
        })
    }

    pub fn retry_config(mut self, retry: RetryConfig) -> Self {
        self.config.retry = retry;
        self
    }

    pub fn max_retries(mut self, max_retries: u32) -> Self {
        self.config.retry.max_retries = max_retries;
        self
    }

    // ==================== Logging ====================

    pub fn log_level(mut self, level: impl Into<String>) -> Self {
        self.config.log_level = Some(level.into());
        self
    }

    pub fn log_dir(mut self, log_dir: impl Into<String>) -> Self {
        self.config.log_dir = Some(log_dir.into());
        self
    }

    pub fn log_json(mut self, json: bool) -> Self {
        self.config.log_json = json;
        self
    }

    // ==================== Build ====================

    /// Return the config without validation
    pub fn build_unchecked(self) -> AppConfig {
        self.config
    }

    /// Validate and return the config
    pub fn build(self) -> ConfigResult<AppConfig> {
        ConfigValidator::validate(&self.config)?;
        Ok(self.config)
    }
}
