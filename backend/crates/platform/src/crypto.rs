//! Cryptographic Utilities
//!
//! Byte-level helpers shared by every domain: entropy, digests, base64,
//! and timing-safe comparison. Protocol-specific cryptography (key
//! agreement, AEAD) lives with the domain that owns it.

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};

/// Fill a fresh buffer from the OS entropy source
pub fn random_bytes(len: usize) -> Vec<u8> {
    let mut bytes = vec![0u8; len];
    OsRng.fill_bytes(&mut bytes);
    bytes
}

/// SHA-256 digest of `data`
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Standard-alphabet base64, padded (wire fields)
pub fn to_base64(bytes: &[u8]) -> String {
    general_purpose::STANDARD.encode(bytes)
}

/// Decode standard-alphabet base64
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

/// URL-safe base64 without padding (opaque tokens in headers)
///
/// 32 bytes of input encode to exactly 43 characters.
pub fn to_base64url(bytes: &[u8]) -> String {
    general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Timing-safe equality over byte slices
///
/// Length mismatch returns early; for equal lengths the full slice is
/// always scanned so the comparison time does not depend on the first
/// differing position.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    let mut result = 0u8;
    for (x, y) in a.iter().zip(b.iter()) {
        result |= x ^ y;
    }
    result == 0
}
