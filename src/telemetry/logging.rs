//! Diagnostic logging for the stdio server
//!
//! Standard output carries the MCP protocol, so every log line goes to stderr.
//! An optional daily-rolling file under `HITL_LOG_DIR` receives the same events,
//! in JSON when `HITL_JSON_LOGS` is set.

use crate::error::HitlError;
use std::path::PathBuf;
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{
    filter::Directive, fmt::format::FmtSpan, layer::SubscriberExt, util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Environment variable selecting the log filter
pub const LOG_LEVEL_ENV: &str = "HITL_LOG_LEVEL";
/// Environment variable enabling file logging into the given directory
pub const LOG_DIR_ENV: &str = "HITL_LOG_DIR";
/// Environment variable switching the file output to JSON
pub const JSON_LOGS_ENV: &str = "HITL_JSON_LOGS";

const LOG_FILE_PREFIX: &str = "hitl-mcp.log";

/// Configuration for the logging system
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingConfig {
    /// Filter directive for both outputs, e.g. `info` or `hitl_mcp=debug`
    pub level: String,
    /// Directory for the rolling log file; `None` logs to stderr only
    pub log_dir: Option<PathBuf>,
    /// Whether the file output uses JSON
    pub json_format: bool,
    /// Whether stderr output uses ANSI colors
    pub ansi: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_dir: None,
            json_format: false,
            ansi: false,
        }
    }
}

impl LoggingConfig {
    /// Create logging configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create logging configuration using `lookup` in place of the environment
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(level) = lookup(LOG_LEVEL_ENV).filter(|l| !l.trim().is_empty()) {
            config.level = level;
        }

        if let Some(log_dir) = lookup(LOG_DIR_ENV).filter(|d| !d.trim().is_empty()) {
            config.log_dir = Some(PathBuf::from(log_dir));
        }

        if let Some(json) = lookup(JSON_LOGS_ENV) {
            config.json_format = matches!(json.trim(), "1" | "true" | "TRUE" | "yes");
        }

        config
    }

    /// Override the filter, e.g. from a command-line flag
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    fn filter(&self) -> EnvFilter {
        let base = EnvFilter::try_new(&self.level).unwrap_or_else(|_| EnvFilter::new("info"));
        ["hyper=warn", "reqwest=warn", "h2=warn", "tokio=warn"]
            .iter()
            .filter_map(|directive| directive.parse::<Directive>().ok())
            .fold(base, |filter, directive| filter.add_directive(directive))
    }
}

/// Guard that must be kept alive for the duration of the application
/// to ensure proper log flushing
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Initialize the global subscriber
///
/// Fails if the log directory cannot be created or a subscriber is already set.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard, HitlError> {
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(config.ansi)
        .with_span_events(FmtSpan::NONE)
        .with_target(true)
        .with_filter(config.filter());

    let registry = tracing_subscriber::registry().with(console_layer);

    let file_guard = match &config.log_dir {
        Some(log_dir) => {
            std::fs::create_dir_all(log_dir).map_err(|e| {
                HitlError::logging(format!("Failed to create log directory: {}", e))
            })?;

            let file_appender = tracing_appender::rolling::daily(log_dir, LOG_FILE_PREFIX);
            let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

            let file_layer = if config.json_format {
                tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(
                        "%Y-%m-%d %H:%M:%S%.3f UTC".to_string(),
                    ))
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .json()
                    .with_filter(config.filter())
                    .boxed()
            } else {
                tracing_subscriber::fmt::layer()
                    .with_writer(file_writer)
                    .with_ansi(false)
                    .with_timer(tracing_subscriber::fmt::time::ChronoUtc::new(
                        "%Y-%m-%d %H:%M:%S%.3f UTC".to_string(),
                    ))
                    .with_file(true)
                    .with_line_number(true)
                    .with_target(true)
                    .with_filter(config.filter())
                    .boxed()
            };

            registry
                .with(file_layer)
                .try_init()
                .map_err(|e| HitlError::logging(format!("Failed to install logger: {}", e)))?;
            Some(guard)
        }
        None => {
            registry
                .try_init()
                .map_err(|e| HitlError::logging(format!("Failed to install logger: {}", e)))?;
            None
        }
    };

    info!(
        level = %config.level,
        log_dir = ?config.log_dir,
        json_format = config.json_format,
        "Logging initialized"
    );

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
