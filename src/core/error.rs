//! Error types for avatar-gate
//!
//! Each module owns its error enum. Startup (configuration, signer and
//! pipeline setup, serving) reports through the crate-level error below.

use thiserror::Error;

use crate::asset::AssetError;
use crate::token::TokenError;
use crate::transform::TransformError;

/// Result type alias for avatar-gate operations
pub type Result<T> = std::result::Result<T, AvatarGateError>;

/// Main error type for avatar-gate
#[derive(Error, Debug)]
pub enum AvatarGateError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Token error: {0}")]
    Token(#[from] TokenError),

    #[error("Transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("Asset server error: {0}")]
    Asset(#[from] AssetError),
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("AVATAR_TOKEN_SECRET is required in production mode")]
    MissingSecret,

    #[error("AVATAR_TOKEN_SECRET is set to the development placeholder in production mode")]
    PlaceholderSecret,

    #[error("Invalid bind address '{addr}': {reason}")]
    InvalidBindAddr { addr: String, reason: String },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}
