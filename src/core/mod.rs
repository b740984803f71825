//! avatar-gate core module
//!
//! Configuration and the crate-level error type.

pub mod config;
pub mod error;

pub use self::config::{GateConfig, RawConfig, RunMode};
pub use self::error::{AvatarGateError, ConfigError, Result};
