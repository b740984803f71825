//! Signed Avatar Gate
//!
//! HTTP surface for the avatar capability links: an issuer that mints
//! short-lived signed URLs and a gate that validates them and streams the
//! transformed image.
//!
//! Security features:
//! - HMAC-SHA256 signed descriptors, compared in constant time
//! - Expiry enforced on every request
//! - Referer/Host anti-hotlink check
//! - No-store caching headers on every issuer and gate response
//! - Cross-Origin-Resource-Policy on served images

mod error;
mod routes;
mod server;

pub use error::AssetError;
pub use routes::{
    check_referer, issue_token, no_cache_middleware, serve_avatar, EPOCH_EXPIRES,
    NO_CACHE_CONTROL,
};
pub use server::{build_router, AssetServerState, AvatarGateServer, AVATAR_ROUTE, TOKEN_ROUTE};
