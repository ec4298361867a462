use super::*;
use url::Url;

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    pub fn validate(config: &AppConfig) -> ConfigResult<()> {
        Self::validate_fetch(&config.fetch)?;
        Self::validate_vision(&config.vision)?;
        Self::validate_retry(&config.effective_retry_config())?;

        if let Some(level) = &config.log_level {
            Self::validate_log_level(level)?;
        }

        Ok(())
    }

    fn validate_fetch(fetch: &FetchConfig) -> ConfigResult<()> {
        if fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "fetch.timeout_secs".to_string(),
                value: fetch.timeout_secs.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }
        if fetch.user_agent.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "fetch.user_agent".to_string(),
            });
        }
        Ok(())
    }

    fn validate_vision(vision: &VisionConfig) -> ConfigResult<()> {
        match Url::parse(&vision.base_url) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => {}
            _ => {
                return Err(ConfigError::InvalidValue {
                    field: "vision.base_url".to_string(),
                    value: vision.base_url.clone(),
                    reason: "Must be an absolute http(s) URL".to_string(),
                });
            }
        }

        if vision.model.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "vision.model".to_string(),
            });
        }

        match &vision.api_key {
            Some(key) if !key.trim().is_empty() => {}
            _ => {
                return Err(ConfigError::MissingRequired {
                    field: "vision.api_key (set GEMINI_API_KEY)".to_string(),
                });
            }
        }

        if vision.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "vision.timeout_secs".to_string(),
                value: vision.timeout_secs.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&vision.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "vision.temperature".to_string(),
                value: vision.temperature.to_string(),
                reason: "Must be between 0.0 and 2.0".to_string(),
            });
        }

        if !(0.0..=1.0).contains(&vision.top_p) {
            return Err(ConfigError::InvalidValue {
                field: "vision.top_p".to_string(),
                value: vision.top_p.to_string(),
                reason: "Must be between 0.0 and 1.0".to_string(),
            });
        }

        if vision.top_k == 0 {
            return Err(ConfigError::InvalidValue {
                field: "vision.top_k".to_string(),
                value: vision.top_k.to_string(),
                reason: "Must be >= 1".to_string(),
            });
        }

        if vision.max_output_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "vision.max_output_tokens".to_string(),
                value: vision.max_output_tokens.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }

        Ok(())
    }

    fn validate_retry(retry: &RetryConfig) -> ConfigResult<()> {
        if retry.max_retries < 1 {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_retries".to_string(),
                value: retry.max_retries.to_string(),
                reason: "Must be >= 1 (set to 1 to effectively disable retries)".to_string(),
            });
        }
        if retry.initial_backoff_ms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.initial_backoff_ms".to_string(),
                value: retry.initial_backoff_ms.to_string(),
                reason: "Must be > 0".to_string(),
            });
        }
        if retry.max_backoff_ms < retry.initial_backoff_ms {
            return Err(ConfigError::InvalidValue {
                field: "retry.max_backoff_ms".to_string(),
                value: retry.max_backoff_ms.to_string(),
                reason: "Must be >= initial_backoff_ms".to_string(),
            });
        }
        if retry.backoff_multiplier < 1.0 {
            return Err(ConfigError::InvalidValue {
                field: "retry.backoff_multiplier".to_string(),
                value: retry.backoff_multiplier.to_string(),
                reason: "Must be >= 1.0".to_string(),
            });
        }
        if !(0.0..=1.0).contains(&retry.jitter_factor) {
            return Err(ConfigError::InvalidValue {
                field: "retry.jitter_factor".to_string(),
                value: retry.jitter_factor.to_string(),
                reason: "Must be between 0.0 and 1.0".to_string(),
            });
        }
        Ok(())
    }

    fn validate_log_level(level: &str) -> ConfigResult<()> {
        match level.to_ascii_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
            _ => Err(ConfigError::InvalidValue {
                field: "log_level".to_string(),
                value: level.to_string(),
                reason: "Must be one of trace, debug, info, warn, error".to_string(),
            }),
        }
    }
}
