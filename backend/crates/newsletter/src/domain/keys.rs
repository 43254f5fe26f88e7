//! Server Key Handling
//!
//! X25519 keypair plus HKDF-SHA256 derivation of the symmetric envelope
//! key. The private half never leaves this struct: it is not serialized,
//! not logged, and absent from `Debug` output.

use hkdf::Hkdf;
use sha2::Sha256;
use x25519_dalek::{PublicKey, StaticSecret};
use zeroize::Zeroizing;

use platform::crypto::{from_base64, random_bytes, to_base64};

use crate::error::{NewsletterError, NewsletterResult};

/// HKDF salt, shared with the browser client.
///
/// TODO: switch to a per-deployment random salt served alongside the
/// public key; requires a coordinated client release.
const HKDF_SALT: [u8; 32] = [0u8; 32];

/// HKDF info string, shared with the browser client
const HKDF_INFO: &[u8] = b"newsletter-encryption";

/// Server-side X25519 keypair
pub struct ServerKeypair {
    secret: StaticSecret,
    public: PublicKey,
}

impl ServerKeypair {
    /// Generate a fresh random keypair
    pub fn generate() -> Self {
        let bytes = Zeroizing::new(random_bytes(32));
        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&bytes);
        Self::from_bytes(*seed)
    }

    /// Build a keypair from raw private key bytes
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        let secret = StaticSecret::from(bytes);
        let public = PublicKey::from(&secret);
        Self { secret, public }
    }

    /// Build a keypair from a base64-encoded private key
    ///
    /// Error messages describe the failure shape only; they never carry
    /// key material.
    pub fn from_base64(encoded: &str) -> NewsletterResult<Self> {
        let decoded = Zeroizing::new(from_base64(encoded.trim()).map_err(|_| {
            NewsletterError::Internal("server private key is not valid base64".to_string())
        })?);
        if decoded.len() != 32 {
            return Err(NewsletterError::Internal(
                "server private key must be 32 bytes".to_string(),
            ));
        }
        let mut seed = Zeroizing::new([0u8; 32]);
        seed.copy_from_slice(&decoded);
        Ok(Self::from_bytes(*seed))
    }

    /// Raw public key bytes
    pub fn public_key_bytes(&self) -> [u8; 32] {
        *self.public.as_bytes()
    }

    /// Base64-encoded public key, as served to clients
    pub fn public_key_b64(&self) -> String {
        to_base64(self.public.as_bytes())
    }

    /// Derive the symmetric envelope key for a client public key
    ///
    /// ECDH over X25519, then HKDF-SHA256 with the fixed salt and info
    /// string. Rejects keys of the wrong length and keys that yield a
    /// non-contributory (all-zero) shared secret.
    pub fn derive_shared_key(
        &self,
        client_public: &[u8],
    ) -> NewsletterResult<Zeroizing<[u8; 32]>> {
        let key_bytes: [u8; 32] = client_public
            .try_into()
            .map_err(|_| NewsletterError::InvalidClientKey)?;
        let client_key = PublicKey::from(key_bytes);

        let shared = self.secret.diffie_hellman(&client_key);
        if !shared.was_contributory() {
            return Err(NewsletterError::InvalidClientKey);
        }

        let hk = Hkdf::<Sha256>::new(Some(&HKDF_SALT), shared.as_bytes());
        let mut okm = Zeroizing::new([0u8; 32]);
        hk.expand(HKDF_INFO, okm.as_mut_slice())
            .map_err(|_| NewsletterError::Internal("HKDF expand failed".to_string()))?;
        Ok(okm)
    }
}

impl std::fmt::Debug for ServerKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServerKeypair")
            .field("public", &self.public_key_b64())
            .finish_non_exhaustive()
    }
}
