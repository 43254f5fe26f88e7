//! Domain Services
//!
//! Pure domain logic: PoW hashing, canonical payload serialization, and
//! request signatures. Everything here is deterministic given its inputs;
//! time enters only through the explicit minute parameter.

use std::collections::BTreeMap;

use chrono::Utc;
use sha2::{Digest, Sha256};

/// Compute the PoW attempt hash: SHA-256 over the puzzle data followed by
/// the decimal nonce, as lowercase hex
///
/// The nonce is hashed as its decimal string form, matching the client's
/// `data + nonce.toString()` loop.
pub fn pow_hash_hex(puzzle_data: &str, nonce: u64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(puzzle_data.as_bytes());
    hasher.update(nonce.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify that an attempt hash meets the target prefix
pub fn meets_target(hash_hex: &str, target: &str) -> bool {
    hash_hex.starts_with(target)
}

/// Search for a nonce whose hash meets the target
///
/// This is the client's work loop; the server only uses it in tests and
/// never during verification.
pub fn find_nonce(puzzle_data: &str, target: &str, limit: u64) -> Option<u64> {
    (0..limit).find(|&nonce| meets_target(&pow_hash_hex(puzzle_data, nonce), target))
}

/// Serialize an encrypted envelope into its canonical signing form
///
/// Compact JSON with keys in lexicographic order. Both sides must produce
/// byte-identical output here or signatures will never match.
pub fn canonical_envelope_json(
    ciphertext_b64: &str,
    client_public_key_b64: &str,
    nonce_b64: &str,
) -> String {
    let fields = BTreeMap::from([
        ("ciphertext", ciphertext_b64),
        ("clientPublicKey", client_public_key_b64),
        ("nonce", nonce_b64),
    ]);
    // BTreeMap iteration order is the key order; a serialization failure is
    // impossible for a string map
    serde_json::to_string(&fields).unwrap_or_default()
}

/// Compute the request signature for a canonical payload
///
/// SHA-256 over canonical JSON, token, and the minute-truncated timestamp,
/// as lowercase hex. This is an unkeyed integrity check: it ties the body
/// to the token and a time window but is not an authentication mechanism,
/// since any party holding the token can recompute it.
pub fn request_signature(canonical_json: &str, token: &str, minute: i64) -> String {
    let mut hasher = Sha256::new();
    hasher.update(canonical_json.as_bytes());
    hasher.update(token.as_bytes());
    hasher.update(minute.to_string().as_bytes());
    hex::encode(hasher.finalize())
}

/// The current minute-truncated unix timestamp
pub fn current_minute() -> i64 {
    Utc::now().timestamp().div_euclid(60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pow_hash_uses_decimal_nonce() {
        // Hash must equal SHA-256 of the concatenated strings
        let mut hasher = Sha256::new();
        hasher.update(b"abc:def:123");
        hasher.update(b"42");
        let expected = hex::encode(hasher.finalize());

        assert_eq!(pow_hash_hex("abc:def:123", 42), expected);
    }

    #[test]
    fn test_meets_target() {
        assert!(meets_target("0000ab", "0000"));
        assert!(meets_target("0000ab", ""));
        assert!(!meets_target("000fab", "0000"));
    }

    #[test]
    fn test_find_nonce_solves_and_verifies() {
        // Single-zero target keeps the search fast (1 in 16 per attempt)
        let nonce = find_nonce("puzzle", "0", 1_000).unwrap();
        assert!(meets_target(&pow_hash_hex("puzzle", nonce), "0"));
        // The search is sequential from zero, so the predecessor of the
        // first hit cannot meet the target.
        if nonce > 0 {
            assert!(!meets_target(&pow_hash_hex("puzzle", nonce - 1), "0"));
        }
    }

    #[test]
    fn test_canonical_key_order() {
        let json = canonical_envelope_json("CT", "PK", "NN");
        assert_eq!(
            json,
            r#"{"ciphertext":"CT","clientPublicKey":"PK","nonce":"NN"}"#
        );
    }

    #[test]
    fn test_signature_depends_on_every_input() {
        let base = request_signature("{}", "token", 100);
        assert_eq!(base, request_signature("{}", "token", 100));
        assert_ne!(base, request_signature("{} ", "token", 100));
        assert_ne!(base, request_signature("{}", "token2", 100));
        assert_ne!(base, request_signature("{}", "token", 101));
    }

    #[test]
    fn test_current_minute_is_truncated() {
        let minute = current_minute();
        let now = Utc::now().timestamp();
        assert!(minute * 60 <= now);
        assert!((now - minute * 60) < 120);
    }
}
