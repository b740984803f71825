//! Configuration for avatar-gate
//!
//! Layered with the `config` crate: built-in defaults, then an optional
//! TOML file, then `AVATAR_GATE_*` environment variables, then
//! `AVATAR_TOKEN_SECRET`. The result is validated once at startup into an
//! immutable [`GateConfig`].

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, Result};
use crate::logging::LoggingConfig;

/// Configuration result type
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Environment variable holding the shared signing secret
pub const SECRET_ENV_VAR: &str = "AVATAR_TOKEN_SECRET";

/// Environment variable pointing at a configuration file
pub const CONFIG_PATH_ENV_VAR: &str = "AVATAR_GATE_CONFIG";

/// Prefix for environment overrides, e.g. `AVATAR_GATE_BIND_ADDR`
pub const ENV_PREFIX: &str = "AVATAR_GATE";

/// Base name of the optional config file in the working directory
pub const DEFAULT_CONFIG_FILE: &str = "avatar-gate";

/// Placeholder secret, accepted only in development mode
pub const DEV_PLACEHOLDER_SECRET: &str = "dev-secret";

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_TOKEN_TTL_SECS: u64 = 60;
pub const MAX_TOKEN_TTL_SECS: u64 = 3600;
pub const DEFAULT_SOURCE_PATH: &str = "private/media/avatar.jpg";
pub const DEFAULT_CATALOG_PATH: &str = "server/data/projects.json";

/// Deployment mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Secret required; startup fails without one
    #[default]
    Production,
    /// Falls back to a placeholder secret with a loud warning
    Development,
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunMode::Production => write!(f, "production"),
            RunMode::Development => write!(f, "development"),
        }
    }
}

/// Unvalidated configuration as read from file and environment
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawConfig {
    #[serde(default)]
    pub mode: RunMode,
    #[serde(default)]
    pub bind_addr: Option<String>,
    #[serde(default)]
    pub secret: Option<String>,
    #[serde(default)]
    pub token_ttl_secs: Option<u64>,
    #[serde(default)]
    pub source_path: Option<PathBuf>,
    #[serde(default)]
    pub catalog_path: Option<PathBuf>,
    #[serde(default)]
    pub max_concurrent_transforms: Option<usize>,
    #[serde(default)]
    pub logging: Option<LoggingConfig>,
}

/// Validated, immutable process configuration
#[derive(Debug)]
pub struct GateConfig {
    pub mode: RunMode,
    pub bind_addr: SocketAddr,
    /// Shared HMAC secret
    pub secret: SecretString,
    /// Whether `secret` is the development placeholder
    pub using_placeholder_secret: bool,
    pub token_ttl_secs: u64,
    pub source_path: PathBuf,
    pub catalog_path: PathBuf,
    pub max_concurrent_transforms: usize,
    pub logging: LoggingConfig,
}

impl GateConfig {
    /// Load from an explicit file, `AVATAR_GATE_CONFIG`, or `./avatar-gate.toml`
    /// if present, then apply environment overrides and validate.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let raw = Self::read_raw(config_file)?;
        Ok(Self::from_raw(raw)?)
    }

    fn read_raw(config_file: Option<&Path>) -> ConfigResult<RawConfig> {
        let file = config_file
            .map(Path::to_path_buf)
            .or_else(|| std::env::var_os(CONFIG_PATH_ENV_VAR).map(PathBuf::from));

        let builder = match file {
            Some(path) => config::Config::builder().add_source(config::File::from(path)),
            None => config::Config::builder()
                .add_source(config::File::with_name(DEFAULT_CONFIG_FILE).required(false)),
        };

        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("secret", std::env::var(SECRET_ENV_VAR).ok())?
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Validate raw values. Production refuses to run without a real secret.
    pub fn from_raw(raw: RawConfig) -> ConfigResult<Self> {
        let supplied = raw
            .secret
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        let (secret, using_placeholder_secret) = match (raw.mode, supplied) {
            (RunMode::Production, None) => return Err(ConfigError::MissingSecret),
            (RunMode::Production, Some(s)) if s == DEV_PLACEHOLDER_SECRET => {
                return Err(ConfigError::PlaceholderSecret)
            }
            (RunMode::Development, None) => (DEV_PLACEHOLDER_SECRET.to_string(), true),
            (_, Some(s)) => {
                let placeholder = s == DEV_PLACEHOLDER_SECRET;
                (s, placeholder)
            }
        };

        let bind_addr = raw
            .bind_addr
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidBindAddr {
                addr: bind_addr.clone(),
                reason: e.to_string(),
            })?;

        let token_ttl_secs = raw.token_ttl_secs.unwrap_or(DEFAULT_TOKEN_TTL_SECS);
        if token_ttl_secs == 0 || token_ttl_secs > MAX_TOKEN_TTL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "token_ttl_secs",
                reason: format!("must be between 1 and {}", MAX_TOKEN_TTL_SECS),
            });
        }

        let max_concurrent_transforms = raw
            .max_concurrent_transforms
            .unwrap_or_else(default_transform_concurrency);
        if max_concurrent_transforms == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_concurrent_transforms",
                reason: "must be at least 1".to_string(),
            });
        }

        let logging = raw.logging.unwrap_or_else(|| match raw.mode {
            RunMode::Development => LoggingConfig::development(),
            RunMode::Production => LoggingConfig::production(),
        });

        Ok(Self {
            mode: raw.mode,
            bind_addr,
            secret: SecretString::new(secret),
            using_placeholder_secret,
            token_ttl_secs,
            source_path: raw
                .source_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_SOURCE_PATH)),
            catalog_path: raw
                .catalog_path
                .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_PATH)),
            max_concurrent_transforms,
            logging,
        })
    }

    pub fn is_development(&self) -> bool {
        self.mode == RunMode::Development
    }

    /// Length of the secret, for startup diagnostics that must not print it
    pub fn secret_len(&self) -> usize {
        self.secret.expose_secret().len()
    }
}

fn default_transform_concurrency() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
