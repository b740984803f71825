//! Logging system for avatar-gate
//!
//! Console and optional rolling-file output through `tracing-subscriber`,
//! text or JSON, filtered by a global level plus per-module overrides.
//! `RUST_LOG`, when set, replaces the configured filter.

mod config;

#[cfg(test)]
mod tests;

pub use self::config::{
    default_log_directory, LogFormat, LogLevel, LogOutput, LoggingConfig, RotationStrategy,
    LOG_FILE_PREFIX,
};

use std::path::PathBuf;
use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    fmt::{self, MakeWriter},
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    EnvFilter, Layer,
};

/// Logging system errors
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("Failed to initialize logging: {0}")]
    InitializationError(String),

    #[error("Failed to create log directory: {0}")]
    DirectoryCreationError(String),

    #[error("Invalid log filter directive: {0}")]
    InvalidDirective(String),
}

/// Result type for logging operations
pub type LoggingResult<T> = Result<T, LoggingError>;

/// Installed global subscriber. Dropping it flushes and stops the file writer.
pub struct LoggingSystem {
    log_directory: Option<PathBuf>,
    _guards: Vec<WorkerGuard>,
}

impl LoggingSystem {
    /// Install the global subscriber for the given configuration
    pub fn init(config: LoggingConfig) -> LoggingResult<Self> {
        let rust_log = std::env::var("RUST_LOG").ok();
        let filter = Self::resolve_env_filter(&config, rust_log.as_deref())?;
        Self::install(&config, filter)
    }

    /// `RUST_LOG` directives when present and non-blank, else the
    /// configured levels
    pub fn resolve_env_filter(
        config: &LoggingConfig,
        rust_log: Option<&str>,
    ) -> LoggingResult<EnvFilter> {
        match rust_log.map(str::trim).filter(|d| !d.is_empty()) {
            Some(directives) => EnvFilter::try_new(directives)
                .map_err(|e| LoggingError::InvalidDirective(format!("RUST_LOG: {}", e))),
            None => Self::build_env_filter(config),
        }
    }

    /// Build the filter from the global level and module overrides
    pub fn build_env_filter(config: &LoggingConfig) -> LoggingResult<EnvFilter> {
        let mut filter = EnvFilter::new(config.level.as_str());

        for (module, level) in &config.module_levels {
            let directive = format!("{}={}", module, level.as_str());
            let parsed = directive
                .parse()
                .map_err(|_| LoggingError::InvalidDirective(directive.clone()))?;
            filter = filter.add_directive(parsed);
        }

        Ok(filter)
    }

    fn install(config: &LoggingConfig, filter: EnvFilter) -> LoggingResult<Self> {
        let mut guards = Vec::new();

        let file_writer = if config.output.writes_file() {
            let (writer, guard) = file_writer(config)?;
            guards.push(guard);
            Some(writer)
        } else {
            None
        };

        let console_layer = config
            .output
            .writes_console()
            .then(|| format_layer(config.format, std::io::stdout, true));

        tracing_subscriber::registry()
            .with(filter)
            .with(console_layer)
            .with(file_writer.map(|writer| format_layer(config.format, writer, false)))
            .try_init()
            .map_err(|e| LoggingError::InitializationError(e.to_string()))?;

        Ok(Self {
            log_directory: config
                .output
                .writes_file()
                .then(|| config.resolved_log_directory()),
            _guards: guards,
        })
    }

    /// Directory of the rolling log file, when file output is on
    pub fn log_directory(&self) -> Option<&PathBuf> {
        self.log_directory.as_ref()
    }
}

fn format_layer<S, W>(format: LogFormat, writer: W, ansi: bool) -> Box<dyn Layer<S> + Send + Sync>
where
    S: tracing::Subscriber + for<'a> LookupSpan<'a>,
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_writer(writer)
        .with_target(true)
        .with_ansi(ansi);

    match format {
        LogFormat::Json => layer.json().boxed(),
        LogFormat::Text => layer.boxed(),
    }
}

fn file_writer(config: &LoggingConfig) -> LoggingResult<(NonBlocking, WorkerGuard)> {
    let log_dir = config.resolved_log_directory();
    std::fs::create_dir_all(&log_dir).map_err(|e| {
        LoggingError::DirectoryCreationError(format!("{}: {}", log_dir.display(), e))
    })?;

    let appender =
        RollingFileAppender::new(file_rotation(config.rotation), &log_dir, LOG_FILE_PREFIX);
    Ok(tracing_appender::non_blocking(appender))
}

fn file_rotation(strategy: RotationStrategy) -> Rotation {
    match strategy {
        RotationStrategy::Daily => Rotation::DAILY,
        RotationStrategy::Hourly => Rotation::HOURLY,
        RotationStrategy::Never => Rotation::NEVER,
    }
}

/// Console-only logging at `level`, for when the configured system cannot
/// be installed. `RUST_LOG` is not consulted, so a bad value there cannot
/// also break the fallback.
pub fn init_fallback_logging(level: LogLevel) -> LoggingResult<LoggingSystem> {
    let config = LoggingConfig::fallback(level);
    let filter = LoggingSystem::build_env_filter(&config)?;
    LoggingSystem::install(&config, filter)
}
