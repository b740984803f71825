//! Property tests for token issuance and verification

use super::*;
use proptest::prelude::*;
use secrecy::SecretString;

const NOW: i64 = 1_700_000_000;

fn signer() -> TokenSigner {
    TokenSigner::new(&SecretString::new("property-test-secret".to_string()), 60).unwrap()
}

fn query_from(token: &SignedToken) -> TokenQuery {
    let dims = token.descriptor().dimensions;
    TokenQuery {
        exp: Some(token.descriptor().exp.to_string()),
        w: Some(dims.width.to_string()),
        h: Some(dims.height.to_string()),
        q: Some(dims.quality.to_string()),
        sig: Some(token.signature().to_string()),
    }
}

fn hints(w: i64, h: i64, q: i64) -> DimensionHints {
    DimensionHints {
        w: Some(w.to_string()),
        h: Some(h.to_string()),
        q: Some(q.to_string()),
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    #[test]
    fn prop_clamped_dimensions_stay_in_bounds(
        w in prop::num::i64::ANY,
        h in prop::num::i64::ANY,
        q in prop::num::i64::ANY,
    ) {
        let dims = Dimensions::from_hints(&hints(w, h, q));

        prop_assert!((MIN_SIDE..=MAX_SIDE).contains(&dims.width));
        prop_assert!((MIN_SIDE..=MAX_SIDE).contains(&dims.height));
        prop_assert!((MIN_QUALITY..=MAX_QUALITY).contains(&dims.quality));
    }

    #[test]
    fn prop_in_range_values_are_kept(
        w in MIN_SIDE..=MAX_SIDE,
        h in MIN_SIDE..=MAX_SIDE,
        q in MIN_QUALITY..=MAX_QUALITY,
    ) {
        let dims = Dimensions::from_hints(&hints(w as i64, h as i64, q as i64));
        prop_assert_eq!(dims, Dimensions { width: w, height: h, quality: q });
    }

    #[test]
    fn prop_issued_token_verifies_until_expiry(
        w in MIN_SIDE..=MAX_SIDE,
        h in MIN_SIDE..=MAX_SIDE,
        q in MIN_QUALITY..=MAX_QUALITY,
        elapsed in 0i64..=60,
    ) {
        let signer = signer();
        let token = signer.issue(&hints(w as i64, h as i64, q as i64), NOW);
        let presented = SignedToken::from_query(&query_from(&token)).unwrap();

        prop_assert!(presented.verify(&signer, NOW + elapsed).is_ok());
        prop_assert_eq!(
            presented.verify(&signer, NOW + 61),
            Err(TokenError::Expired { exp: NOW + 60, now: NOW + 61 })
        );
    }

    #[test]
    fn prop_any_signature_char_flip_is_rejected(
        index in 0usize..64,
        replacement in prop::sample::select(b"0123456789abcdefABCDEF".to_vec()),
    ) {
        let signer = signer();
        let token = signer.issue(&DimensionHints::default(), NOW);

        let mut sig = token.signature().as_bytes().to_vec();
        prop_assume!(sig[index] != replacement);
        sig[index] = replacement;

        let mut query = query_from(&token);
        query.sig = Some(String::from_utf8(sig).unwrap());

        let presented = SignedToken::from_query(&query).unwrap();
        prop_assert_eq!(presented.verify(&signer, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn prop_field_tamper_is_rejected(
        field in 0usize..4,
        delta in 1i64..=20,
    ) {
        let signer = signer();
        // Mid-range values so a small delta always changes the clamped value
        let token = signer.issue(&hints(500, 500, 60), NOW);
        let mut query = query_from(&token);

        match field {
            0 => query.exp = Some((NOW + 60 + delta).to_string()),
            1 => query.w = Some((500 + delta).to_string()),
            2 => query.h = Some((500 - delta).to_string()),
            _ => query.q = Some((60 + delta).to_string()),
        }

        let presented = SignedToken::from_query(&query).unwrap();
        prop_assert_eq!(presented.verify(&signer, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn prop_oversized_request_signs_clamped_value(w in 1025i64..100_000) {
        let signer = signer();
        let token = signer.issue(&hints(w, 320, 72), NOW);
        prop_assert_eq!(token.descriptor().dimensions.width, MAX_SIDE);

        // The signature matches the clamped payload, not the raw request
        let clamped = Descriptor::new(NOW + 60, Dimensions::new(MAX_SIDE, 320, 72));
        prop_assert!(signer.verify_signature(&clamped.canonical_payload(), token.signature()));

        let raw_payload = format!("exp={}&w={}&h=320&q=72", NOW + 60, w);
        prop_assert!(!signer.verify_signature(&raw_payload, token.signature()));
    }
}
