//! Token error types

use thiserror::Error;

/// Errors produced while parsing or verifying a signed descriptor
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Bad token: missing {field}")]
    Malformed { field: &'static str },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Link expired")]
    Expired { exp: i64, now: i64 },

    #[error("Invalid signing key: {reason}")]
    InvalidKey { reason: String },
}
