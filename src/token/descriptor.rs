//! Descriptor: the expiring, size-bound claims carried in an avatar URL
//!
//! Issuer and gate both build the signed payload through
//! [`Descriptor::canonical_payload`] from values clamped by
//! [`Dimensions::from_hints`], so the two sides always agree on what was
//! signed.

use serde::{Deserialize, Serialize};

/// Smallest allowed output side in pixels
pub const MIN_SIDE: u32 = 1;
/// Largest allowed output side in pixels
pub const MAX_SIDE: u32 = 1024;
/// Output side used when the caller gives no usable value
pub const DEFAULT_SIDE: u32 = 320;

/// Lowest allowed JPEG quality
pub const MIN_QUALITY: u8 = 40;
/// Highest allowed JPEG quality
pub const MAX_QUALITY: u8 = 95;
/// Quality used when the caller gives no usable value
pub const DEFAULT_QUALITY: u8 = 72;

/// Untrusted size/quality hints as they arrive in a query string
///
/// Values are kept as strings so malformed numbers reach the clamping
/// logic instead of failing extraction.
#[derive(Debug, Clone, Default)]
pub struct DimensionHints {
    pub w: Option<String>,
    pub h: Option<String>,
    pub q: Option<String>,
}

impl DimensionHints {
    pub fn new(w: Option<&str>, h: Option<&str>, q: Option<&str>) -> Self {
        Self {
            w: w.map(str::to_string),
            h: h.map(str::to_string),
            q: q.map(str::to_string),
        }
    }

    /// Hints from decoded query pairs; only the first `w`, `h` and `q` count
    pub fn from_pairs(pairs: &[(String, String)]) -> Self {
        Self {
            w: first_value(pairs, "w"),
            h: first_value(pairs, "h"),
            q: first_value(pairs, "q"),
        }
    }
}

/// First value of `key` among decoded query pairs. A repeated key is not an
/// error; later occurrences are ignored.
pub fn first_value(pairs: &[(String, String)], key: &str) -> Option<String> {
    pairs
        .iter()
        .find(|(name, _)| name == key)
        .map(|(_, value)| value.clone())
}

/// Clamped output parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
    pub quality: u8,
}

impl Default for Dimensions {
    fn default() -> Self {
        Self {
            width: DEFAULT_SIDE,
            height: DEFAULT_SIDE,
            quality: DEFAULT_QUALITY,
        }
    }
}

impl Dimensions {
    /// Build dimensions from already-numeric values, clamping each one
    pub fn new(width: u32, height: u32, quality: u8) -> Self {
        Self {
            width: width.clamp(MIN_SIDE, MAX_SIDE),
            height: height.clamp(MIN_SIDE, MAX_SIDE),
            quality: quality.clamp(MIN_QUALITY, MAX_QUALITY),
        }
    }

    /// Clamp raw hints; absent or unparseable values fall back to defaults
    pub fn from_hints(hints: &DimensionHints) -> Self {
        Self {
            width: clamp_param(hints.w.as_deref(), MIN_SIDE, MAX_SIDE, DEFAULT_SIDE),
            height: clamp_param(hints.h.as_deref(), MIN_SIDE, MAX_SIDE, DEFAULT_SIDE),
            quality: clamp_param(
                hints.q.as_deref(),
                MIN_QUALITY as u32,
                MAX_QUALITY as u32,
                DEFAULT_QUALITY as u32,
            ) as u8,
        }
    }
}

/// Parse a numeric query value, truncate fractions and clamp into range.
///
/// Non-finite or non-numeric input yields `default`.
fn clamp_param(raw: Option<&str>, min: u32, max: u32, default: u32) -> u32 {
    let parsed = raw
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<f64>().ok())
        .filter(|v| v.is_finite());

    match parsed {
        Some(v) => v.trunc().clamp(min as f64, max as f64) as u32,
        None => default,
    }
}

/// Claims covered by the signature
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptor {
    /// Expiry, unix seconds
    pub exp: i64,
    pub dimensions: Dimensions,
}

impl Descriptor {
    pub fn new(exp: i64, dimensions: Dimensions) -> Self {
        Self { exp, dimensions }
    }

    /// The exact string that gets signed. Field order is part of the
    /// contract between issuer and gate.
    pub fn canonical_payload(&self) -> String {
        format!(
            "exp={}&w={}&h={}&q={}",
            self.exp, self.dimensions.width, self.dimensions.height, self.dimensions.quality
        )
    }

    /// A link stays valid up to and including its `exp` second
    pub fn is_expired_at(&self, now: i64) -> bool {
        now > self.exp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_absent() {
        let dims = Dimensions::from_hints(&DimensionHints::default());
        assert_eq!(dims, Dimensions::new(320, 320, 72));
    }

    #[test]
    fn test_clamps_out_of_range() {
        let dims = Dimensions::from_hints(&DimensionHints::new(Some("9999"), Some("0"), Some("100")));
        assert_eq!(dims.width, 1024);
        assert_eq!(dims.height, 1);
        assert_eq!(dims.quality, 95);

        let dims = Dimensions::from_hints(&DimensionHints::new(Some("-5"), Some("1e6"), Some("3")));
        assert_eq!(dims.width, 1);
        assert_eq!(dims.height, 1024);
        assert_eq!(dims.quality, 40);
    }

    #[test]
    fn test_malformed_values_default() {
        let dims = Dimensions::from_hints(&DimensionHints::new(Some("abc"), Some(""), Some("NaN")));
        assert_eq!(dims, Dimensions::default());
    }

    #[test]
    fn test_fractions_truncate() {
        let dims = Dimensions::from_hints(&DimensionHints::new(Some("99.9"), Some(" 64 "), Some("80.5")));
        assert_eq!(dims, Dimensions::new(99, 64, 80));
    }

    #[test]
    fn test_repeated_keys_take_first_value() {
        let pairs = vec![
            ("w".to_string(), "100".to_string()),
            ("w".to_string(), "200".to_string()),
            ("q".to_string(), "90".to_string()),
            ("x".to_string(), "1".to_string()),
        ];
        let hints = DimensionHints::from_pairs(&pairs);

        assert_eq!(hints.w.as_deref(), Some("100"));
        assert_eq!(hints.h, None);
        assert_eq!(Dimensions::from_hints(&hints), Dimensions::new(100, 320, 90));
    }

    #[test]
    fn test_canonical_payload_order() {
        let descriptor = Descriptor::new(1_700_000_060, Dimensions::new(128, 256, 90));
        assert_eq!(
            descriptor.canonical_payload(),
            "exp=1700000060&w=128&h=256&q=90"
        );
    }

    #[test]
    fn test_expiry_boundary() {
        let descriptor = Descriptor::new(100, Dimensions::default());
        assert!(!descriptor.is_expired_at(99));
        assert!(!descriptor.is_expired_at(100));
        assert!(descriptor.is_expired_at(101));
    }
}
