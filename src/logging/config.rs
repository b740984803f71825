//! What the service logs, how, and where

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

/// File name prefix for rolling log files
pub const LOG_FILE_PREFIX: &str = "avatar-gate.log";

/// Minimum severity that gets recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive spelling understood by `EnvFilter`
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

/// Line format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Sinks that receive events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogOutput {
    #[default]
    Console,
    File,
    Both,
}

impl LogOutput {
    pub fn writes_console(&self) -> bool {
        matches!(self, LogOutput::Console | LogOutput::Both)
    }

    pub fn writes_file(&self) -> bool {
        matches!(self, LogOutput::File | LogOutput::Both)
    }
}

/// How often the log file rolls over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RotationStrategy {
    #[default]
    Daily,
    Hourly,
    Never,
}

/// `[logging]` section of the gate configuration. Missing keys take the
/// console/text/info defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: LogLevel,
    pub format: LogFormat,
    pub output: LogOutput,
    /// Where rolling files go; the platform data directory when unset
    pub log_directory: Option<PathBuf>,
    pub rotation: RotationStrategy,
    /// Per-target overrides, e.g. `tower_http = "warn"`
    pub module_levels: HashMap<String, LogLevel>,
}

impl LoggingConfig {
    /// Debug-level text on the console
    pub fn development() -> Self {
        Self {
            level: LogLevel::Debug,
            ..Self::default()
        }
    }

    /// JSON on the console and in a daily file; request traces only at warn
    pub fn production() -> Self {
        Self {
            format: LogFormat::Json,
            output: LogOutput::Both,
            log_directory: Some(default_log_directory()),
            module_levels: HashMap::from([("tower_http".to_string(), LogLevel::Warn)]),
            ..Self::default()
        }
    }

    /// Console-only config used when the configured sinks cannot be set up
    pub fn fallback(level: LogLevel) -> Self {
        Self {
            level,
            ..Self::default()
        }
    }

    pub fn resolved_log_directory(&self) -> PathBuf {
        self.log_directory
            .clone()
            .unwrap_or_else(default_log_directory)
    }
}

/// Platform data directory, or `./logs` when there is none
pub fn default_log_directory() -> PathBuf {
    match dirs::data_local_dir() {
        Some(data_dir) => data_dir.join("avatar-gate").join("logs"),
        None => PathBuf::from("logs"),
    }
}
