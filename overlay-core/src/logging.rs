//! Tracing setup: JSON lines to a rolling file, optional human-readable
//! stderr output, both behind the same `EnvFilter`.

use std::{path::PathBuf, str::FromStr};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use tracing_appender::{
    non_blocking::WorkerGuard,
    rolling::{RollingFileAppender, Rotation},
};
use tracing_subscriber::{
    EnvFilter, Layer, filter::Directive, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::error::DialogResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    pub log_dir: PathBuf,
    pub log_file_prefix: CompactString,
    pub log_level: CompactString,
    pub max_log_files: usize,
    pub rotation: LogRotation,
    /// Mirror events to stderr in the compact text format.
    pub stderr: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Never,
    Hourly,
    Daily,
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self {
            log_dir: PathBuf::from("./logs"),
            log_file_prefix: CompactString::const_new("overlay"),
            log_level: CompactString::const_new("info"),
            max_log_files: 10,
            rotation: LogRotation::Daily,
            stderr: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("Logger already initialized")]
    AlreadyInitialized,

    #[error("Invalid log level '{0}'")]
    InvalidLevel(CompactString),

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationFailed(#[from] std::io::Error),

    #[error("Failed to create log file appender: {0}")]
    Appender(String),
}

pub struct LoggerBuilder {
    config: LoggerConfig,
}

impl LoggerBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: LoggerConfig::default(),
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: LoggerConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_level(mut self, level: &str) -> Self {
        self.config.log_level = CompactString::new(level);
        self
    }

    /// Install the global subscriber. Keep the returned guard alive for as
    /// long as file logging should keep flushing.
    pub fn build(self) -> DialogResult<WorkerGuard> {
        Ok(self.install()?)
    }

    fn install(self) -> Result<WorkerGuard, LoggingError> {
        let config = self.config;
        let directive = parse_level(&config.log_level)?;
        std::fs::create_dir_all(&config.log_dir)?;

        let rotation = match config.rotation {
            LogRotation::Never => Rotation::NEVER,
            LogRotation::Hourly => Rotation::HOURLY,
            LogRotation::Daily => Rotation::DAILY,
        };

        let file_appender = RollingFileAppender::builder()
            .rotation(rotation)
            .filename_prefix(config.log_file_prefix.as_str())
            .filename_suffix("jsonl")
            .max_log_files(config.max_log_files)
            .build(&config.log_dir)
            .map_err(|e| LoggingError::Appender(e.to_string()))?;

        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        let make_filter = || EnvFilter::from_default_env().add_directive(directive.clone());

        let json_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(non_blocking)
            .with_filter(make_filter());

        let stderr_layer = config.stderr.then(|| {
            tracing_subscriber::fmt::layer()
                .compact()
                .with_target(false)
                .with_writer(std::io::stderr)
                .with_filter(make_filter())
        });

        tracing_subscriber::registry()
            .with(json_layer)
            .with(stderr_layer)
            .try_init()
            .map_err(|_| LoggingError::AlreadyInitialized)?;

        Ok(guard)
    }
}

impl Default for LoggerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn parse_level(level: &str) -> Result<Directive, LoggingError> {
    Directive::from_str(level).map_err(|_| LoggingError::InvalidLevel(CompactString::new(level)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DialogError;

    #[test]
    fn test_parse_level() {
        assert!(parse_level("debug").is_ok());
        assert!(parse_level("overlay_core=trace").is_ok());
        assert!(matches!(
            parse_level("overlay_core=loud"),
            Err(LoggingError::InvalidLevel(_))
        ));
    }

    #[test]
    fn test_build_rejects_bad_level_before_installing() {
        let dir = tempfile::TempDir::new().unwrap();
        let result = LoggerBuilder::new()
            .with_config(LoggerConfig {
                log_dir: dir.path().join("logs"),
                ..LoggerConfig::default()
            })
            .with_level("overlay_core=loud")
            .build();

        assert!(matches!(
            result,
            Err(DialogError::Logging(LoggingError::InvalidLevel(_)))
        ));
        assert!(!dir.path().join("logs").exists());
    }

    #[test]
    fn test_config_defaults_fill_missing_fields() {
        let cfg: LoggerConfig = toml::from_str("log_level = \"warn\"").unwrap();
        assert_eq!(cfg.log_level, "warn");
        assert_eq!(cfg.rotation, LogRotation::Daily);
        assert_eq!(cfg.log_file_prefix, "overlay");
    }
}
