//! Signed avatar tokens
//!
//! A token is a capability: an expiry plus clamped output dimensions,
//! signed with HMAC-SHA256 under a shared secret. Nothing is stored
//! server-side; validity is decided entirely from the URL.
//!
//! Security properties:
//! - The signature covers the clamped, canonical values
//! - Signatures are compared in constant time
//! - Links expire `ttl` seconds after issuance and are replayable until then

mod clock;
mod descriptor;
mod error;
mod signer;
#[cfg(test)]
mod tests;

pub use clock::{Clock, ManualClock, SystemClock};
pub use descriptor::{
    Descriptor, DimensionHints, Dimensions, DEFAULT_QUALITY, DEFAULT_SIDE, MAX_QUALITY,
    MAX_SIDE, MIN_QUALITY, MIN_SIDE,
};
pub use error::TokenError;
pub use signer::{IssuedToken, SignedToken, TokenQuery, TokenSigner};
