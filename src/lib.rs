//! avatar-gate - signed, expiring avatar links
//!
//! This crate provides:
//! - A token issuer that signs avatar descriptors with HMAC-SHA256
//! - An asset gate that verifies links and serves a freshly encoded JPEG
//! - A cover-fit image pipeline with bounded concurrency
//! - A read-only project catalog served alongside the gate

pub mod asset;
pub mod catalog;
pub mod core;
pub mod logging;
pub mod token;
pub mod transform;

// Re-export commonly used items
pub use asset::{build_router, AssetError, AssetServerState, AvatarGateServer};
pub use catalog::{CatalogError, CatalogStore};
pub use crate::core::config::{GateConfig, RunMode};
pub use crate::core::error::{AvatarGateError, ConfigError, Result};
pub use token::{Clock, SystemClock, TokenError, TokenSigner};
pub use transform::{AvatarPipeline, TransformConfig, TransformError};
