//! Asset gate error types

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::token::TokenError;
use crate::transform::TransformError;

/// Asset gate error type
#[derive(Error, Debug)]
pub enum AssetError {
    #[error("Bad token: missing {field}")]
    MalformedRequest { field: &'static str },

    #[error("Invalid signature")]
    InvalidSignature,

    #[error("Link expired")]
    Expired,

    #[error("Hotlink blocked: referer '{referer}'")]
    HotlinkBlocked { referer: String },

    #[error("Avatar not found: {path}")]
    NotFound { path: String },

    #[error("Server bind failed: {reason}")]
    BindFailed { reason: String },

    #[error("Internal server error: {reason}")]
    Internal { reason: String },
}

impl AssetError {
    /// Check if this error should result in a 400 Bad Request response
    pub fn is_malformed(&self) -> bool {
        matches!(self, AssetError::MalformedRequest { .. })
    }

    /// Check if this error should result in a 403 Forbidden response
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            AssetError::InvalidSignature | AssetError::Expired | AssetError::HotlinkBlocked { .. }
        )
    }

    /// Check if this error should result in a 404 Not Found response
    pub fn is_not_found(&self) -> bool {
        matches!(self, AssetError::NotFound { .. })
    }

    pub fn status_code(&self) -> StatusCode {
        if self.is_malformed() {
            StatusCode::BAD_REQUEST
        } else if self.is_forbidden() {
            StatusCode::FORBIDDEN
        } else if self.is_not_found() {
            StatusCode::NOT_FOUND
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    /// Body sent to the client. Never echoes request data, paths or
    /// internal failure details.
    pub fn public_message(&self) -> &'static str {
        match self {
            AssetError::MalformedRequest { .. } => "Bad token",
            AssetError::InvalidSignature => "Invalid signature",
            AssetError::Expired => "Link expired",
            AssetError::HotlinkBlocked { .. } => "Hotlink blocked",
            AssetError::NotFound { .. } => "Avatar not found",
            _ => "Internal server error",
        }
    }
}

impl From<TokenError> for AssetError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed { field } => AssetError::MalformedRequest { field },
            TokenError::InvalidSignature => AssetError::InvalidSignature,
            TokenError::Expired { .. } => AssetError::Expired,
            TokenError::InvalidKey { reason } => AssetError::Internal { reason },
        }
    }
}

impl From<TransformError> for AssetError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::SourceMissing { path } => AssetError::NotFound { path },
            other => AssetError::Internal {
                reason: other.to_string(),
            },
        }
    }
}

impl IntoResponse for AssetError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            tracing::error!(error = %self, "Avatar request failed");
        } else if status == StatusCode::NOT_FOUND {
            tracing::error!(error = %self, "Avatar source missing");
        } else {
            tracing::warn!(error = %self, status = status.as_u16(), "Avatar request rejected");
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.public_message(),
        )
            .into_response()
    }
}
