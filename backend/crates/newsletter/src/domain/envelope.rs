//! Encrypted Envelope
//!
//! The request body carries subscriber details as a ChaCha20-Poly1305
//! envelope: ciphertext, nonce, and the client's ephemeral X25519 public
//! key, all base64. Decryption failures are indistinguishable by design;
//! every path collapses to [`NewsletterError::DecryptFailed`].

use chacha20poly1305::{ChaCha20Poly1305, KeyInit, Nonce, aead::Aead};

use platform::crypto::from_base64;

use crate::error::{NewsletterError, NewsletterResult};

/// ChaCha20-Poly1305 nonce length in bytes
pub const NONCE_LEN: usize = 12;

/// Decoded encrypted payload
#[derive(Debug, Clone)]
pub struct EncryptedEnvelope {
    ciphertext: Vec<u8>,
    nonce: Vec<u8>,
    client_public_key: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Decode the three base64 fields of an encrypted payload
    pub fn decode(
        ciphertext_b64: &str,
        nonce_b64: &str,
        client_public_key_b64: &str,
    ) -> NewsletterResult<Self> {
        let ciphertext = from_base64(ciphertext_b64).map_err(|_| NewsletterError::DecryptFailed)?;
        let nonce = from_base64(nonce_b64).map_err(|_| NewsletterError::DecryptFailed)?;
        let client_public_key =
            from_base64(client_public_key_b64).map_err(|_| NewsletterError::DecryptFailed)?;

        Ok(Self {
            ciphertext,
            nonce,
            client_public_key,
        })
    }

    /// The client's ephemeral public key bytes
    pub fn client_public_key(&self) -> &[u8] {
        &self.client_public_key
    }

    /// Decrypt and authenticate the ciphertext with the derived key
    pub fn open(&self, key: &[u8; 32]) -> NewsletterResult<Vec<u8>> {
        if self.nonce.len() != NONCE_LEN {
            return Err(NewsletterError::DecryptFailed);
        }

        let cipher =
            ChaCha20Poly1305::new_from_slice(key).map_err(|_| NewsletterError::DecryptFailed)?;
        let nonce = Nonce::from_slice(&self.nonce);

        cipher
            .decrypt(nonce, self.ciphertext.as_ref())
            .map_err(|_| NewsletterError::DecryptFailed)
    }
}
