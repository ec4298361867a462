use std::path::PathBuf;

use tracing::Level;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_log::LogTracer;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::config::AppConfig;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Configuration for the logging system
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Log level for the crate's own targets (default: INFO)
    pub level: Level,
    /// Emit one JSON object per event instead of text
    pub json_format: bool,
    /// Directory for daily-rotated log files. Console only when `None`
    pub log_dir: Option<String>,
    pub colorize: bool,
    pub log_file_name: String,
    /// Targets the level applies to
    pub log_targets: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            json_format: false,
            log_dir: None,
            colorize: true,
            log_file_name: "room-analyzer".to_string(),
            log_targets: vec!["room_analyzer".to_string()],
        }
    }
}

impl LoggingConfig {
    /// Derive logging settings from the application config. An unset or
    /// unparseable level falls back to INFO; validation rejects bad levels
    /// before this is reached.
    pub fn from_app_config(config: &AppConfig) -> Self {
        let level = config
            .log_level
            .as_deref()
            .and_then(|level| level.parse::<Level>().ok())
            .unwrap_or(Level::INFO);
        Self {
            level,
            json_format: config.log_json,
            log_dir: config.log_dir.clone(),
            ..Default::default()
        }
    }

    /// `EnvFilter` directive string: `<target>=<level>,...`
    pub fn filter_directives(&self) -> String {
        let level = self.level.as_str().to_lowercase();
        self.log_targets
            .iter()
            .map(|target| format!("{}={}", target, level))
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Keeps the file appender worker thread alive; hold it until exit.
#[allow(dead_code)]
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Install the global subscriber. Console output goes to stderr so stdout
/// carries only the command's result. `RUST_LOG` overrides the configured
/// level. Calling this twice is harmless; the second call is ignored.
pub fn init_logging(config: LoggingConfig) -> LogGuard {
    let _ = LogTracer::init();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    let mut layers = Vec::new();

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_ansi(config.colorize)
        .with_file(true)
        .with_line_number(true)
        .with_timer(ChronoUtc::new(TIME_FORMAT.to_string()))
        .with_writer(std::io::stderr);

    let stderr_layer = if config.json_format {
        stderr_layer.json().flatten_event(true).boxed()
    } else {
        stderr_layer.boxed()
    };
    layers.push(stderr_layer);

    let mut file_guard = None;

    if let Some(log_dir) = &config.log_dir {
        let log_dir = PathBuf::from(log_dir);

        if !log_dir.exists() {
            if let Err(e) = std::fs::create_dir_all(&log_dir) {
                eprintln!("Failed to create log directory: {}", e);
                return LogGuard { _file_guard: None };
            }
        }

        let file_appender =
            RollingFileAppender::new(Rotation::DAILY, log_dir, config.log_file_name.clone());
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        file_guard = Some(guard);

        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_file(true)
            .with_line_number(true)
            .with_timer(ChronoUtc::new(TIME_FORMAT.to_string()))
            .with_writer(non_blocking);

        let file_layer = if config.json_format {
            file_layer.json().flatten_event(true).boxed()
        } else {
            file_layer.boxed()
        };
        layers.push(file_layer);
    }

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(layers)
        .try_init();

    LogGuard {
        _file_guard: file_guard,
    }
}
