//! HMAC-SHA256 signing of descriptors
//!
//! The issuer turns hints into a [`SignedToken`]; the gate rebuilds a
//! [`SignedToken`] from the presented query and calls
//! [`SignedToken::verify`], which checks the signature first and the
//! expiry second.

use std::fmt;

use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;

use super::descriptor::{first_value, Descriptor, DimensionHints, Dimensions};
use super::error::TokenError;

type HmacSha256 = Hmac<Sha256>;

/// Signs and verifies descriptors with the process-wide shared secret
#[derive(Clone)]
pub struct TokenSigner {
    /// Keyed MAC state, cloned for every signature
    mac: HmacSha256,
    ttl_secs: i64,
}

impl fmt::Debug for TokenSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSigner")
            .field("mac", &"[REDACTED]")
            .field("ttl_secs", &self.ttl_secs)
            .finish()
    }
}

impl TokenSigner {
    /// Create a signer keyed with `secret`, issuing links valid for `ttl_secs`
    pub fn new(secret: &SecretString, ttl_secs: u64) -> Result<Self, TokenError> {
        let mac = HmacSha256::new_from_slice(secret.expose_secret().as_bytes())
            .map_err(|e| TokenError::InvalidKey { reason: e.to_string() })?;
        let ttl_secs = i64::try_from(ttl_secs).map_err(|_| TokenError::InvalidKey {
            reason: format!("ttl of {} seconds is out of range", ttl_secs),
        })?;

        Ok(Self { mac, ttl_secs })
    }

    pub fn ttl_secs(&self) -> i64 {
        self.ttl_secs
    }

    /// Lowercase hex HMAC-SHA256 of `payload`
    pub fn sign(&self, payload: &str) -> String {
        let mut mac = self.mac.clone();
        mac.update(payload.as_bytes());
        hex::encode(mac.finalize().into_bytes())
    }

    /// Constant-time check of a presented signature against `payload`
    pub fn verify_signature(&self, payload: &str, presented: &str) -> bool {
        let expected = self.sign(payload);
        expected.as_bytes().ct_eq(presented.as_bytes()).into()
    }

    /// Mint a token for the given hints. Issuance never fails: bad hints are
    /// clamped or defaulted.
    pub fn issue(&self, hints: &DimensionHints, now: i64) -> SignedToken {
        let descriptor = Descriptor::new(
            now.saturating_add(self.ttl_secs),
            Dimensions::from_hints(hints),
        );
        let sig = self.sign(&descriptor.canonical_payload());

        SignedToken { descriptor, sig }
    }
}

/// Descriptor fields as presented to the gate
#[derive(Debug, Clone, Default)]
pub struct TokenQuery {
    pub exp: Option<String>,
    pub w: Option<String>,
    pub h: Option<String>,
    pub q: Option<String>,
    pub sig: Option<String>,
}

impl TokenQuery {
    /// Fields from decoded query pairs, first occurrence of each key
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            exp: first_value(pairs, "exp"),
            w: first_value(pairs, "w"),
            h: first_value(pairs, "h"),
            q: first_value(pairs, "q"),
            sig: first_value(pairs, "sig"),
        }
    }
}

/// A descriptor together with its signature. Holding one proves nothing
/// until [`SignedToken::verify`] succeeds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedToken {
    descriptor: Descriptor,
    sig: String,
}

impl SignedToken {
    /// Rebuild a token from query values, clamping dimensions exactly as the
    /// issuer does.
    ///
    /// Missing or empty `exp`/`sig` is [`TokenError::Malformed`]. An `exp`
    /// that is not written exactly as the issuer writes it (plain decimal,
    /// no sign or leading zeros) never matches a signature and is reported
    /// as [`TokenError::InvalidSignature`].
    pub fn from_query(query: &TokenQuery) -> Result<Self, TokenError> {
        let exp = present(query.exp.as_deref()).ok_or(TokenError::Malformed { field: "exp" })?;
        let sig = present(query.sig.as_deref()).ok_or(TokenError::Malformed { field: "sig" })?;

        let exp = exp
            .parse::<i64>()
            .ok()
            .filter(|parsed| parsed.to_string() == exp)
            .ok_or(TokenError::InvalidSignature)?;

        let hints = DimensionHints {
            w: query.w.clone(),
            h: query.h.clone(),
            q: query.q.clone(),
        };

        Ok(Self {
            descriptor: Descriptor::new(exp, Dimensions::from_hints(&hints)),
            sig: sig.to_string(),
        })
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn signature(&self) -> &str {
        &self.sig
    }

    /// Check signature, then expiry, returning the trusted claims
    pub fn verify(&self, signer: &TokenSigner, now: i64) -> Result<Descriptor, TokenError> {
        if !signer.verify_signature(&self.descriptor.canonical_payload(), &self.sig) {
            return Err(TokenError::InvalidSignature);
        }

        if self.descriptor.is_expired_at(now) {
            return Err(TokenError::Expired {
                exp: self.descriptor.exp,
                now,
            });
        }

        Ok(self.descriptor)
    }

    /// Relative gate URL carrying all descriptor fields and the signature
    pub fn gate_url(&self, gate_path: &str) -> String {
        format!(
            "{}?{}&sig={}",
            gate_path,
            self.descriptor.canonical_payload(),
            self.sig
        )
    }

    /// Response body for the issuer endpoint
    pub fn to_issued(&self, gate_path: &str) -> IssuedToken {
        let dims = self.descriptor.dimensions;
        IssuedToken {
            url: self.gate_url(gate_path),
            exp: self.descriptor.exp,
            w: dims.width,
            h: dims.height,
            q: dims.quality,
            sig: self.sig.clone(),
        }
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// JSON body returned by the issuer endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuedToken {
    pub url: String,
    pub exp: i64,
    pub w: u32,
    pub h: u32,
    pub q: u8,
    pub sig: String,
}
