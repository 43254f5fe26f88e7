//! Domain Value Objects
//!
//! Immutable value types for the newsletter domain.

use kernel::error::app_error::{AppError, AppResult};
use platform::crypto::{random_bytes, to_base64url};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{NewsletterError, NewsletterResult};

/// Maximum email length (per RFC 5321)
const EMAIL_MAX_LENGTH: usize = 254;

/// Browser fingerprint - a client-computed 64-character hex digest
///
/// The value is opaque to the server; it only has to be well-formed and
/// stable across the challenge round trip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub const LENGTH: usize = 64;

    /// Validate and wrap a client-presented fingerprint
    pub fn parse(value: &str) -> NewsletterResult<Self> {
        if value.len() != Self::LENGTH || !value.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(NewsletterError::InvalidFingerprint);
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Single-use security token identifying an issued challenge
///
/// 32 random bytes, URL-safe base64 without padding (43 characters).
/// `Display` shows only a prefix so full tokens never reach logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityToken(String);

impl SecurityToken {
    const PREVIEW_LEN: usize = 8;

    /// Mint a fresh random token
    pub fn mint() -> Self {
        Self(to_base64url(&random_bytes(32)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    /// Short prefix for log correlation
    pub fn preview(&self) -> &str {
        self.0.get(..Self::PREVIEW_LEN).unwrap_or(&self.0)
    }
}

impl std::fmt::Display for SecurityToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}...", self.preview())
    }
}

/// Difficulty level for PoW, counted in leading zero hex characters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Difficulty(u8);

impl Difficulty {
    pub const DEFAULT: Difficulty = Difficulty(4);
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 8; // Max practical difficulty (16^8 expected attempts)

    pub fn new(zeros: u8) -> Option<Self> {
        if (Self::MIN..=Self::MAX).contains(&zeros) {
            Some(Self(zeros))
        } else {
            None
        }
    }

    pub fn zeros(&self) -> u8 {
        self.0
    }

    /// The hash prefix a solution must produce
    pub fn target_prefix(&self) -> String {
        "0".repeat(self.0 as usize)
    }
}

impl Default for Difficulty {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl From<Difficulty> for u8 {
    fn from(d: Difficulty) -> Self {
        d.0
    }
}

/// Email address value object
///
/// Basic validation only - deliverability is confirmed via the
/// confirmation email, not at submission time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Email(String);

impl Email {
    /// Create a new email with validation
    pub fn new(email: impl Into<String>) -> AppResult<Self> {
        let email = email.into().trim().to_lowercase();

        if email.is_empty() {
            return Err(AppError::bad_request("Email cannot be empty"));
        }

        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AppError::bad_request(format!(
                "Email must be at most {} characters",
                EMAIL_MAX_LENGTH
            )));
        }

        if !Self::is_valid_format(&email) {
            return Err(AppError::bad_request("Invalid email format"));
        }

        Ok(Self(email))
    }

    /// Basic email format validation
    fn is_valid_format(email: &str) -> bool {
        // Must contain exactly one @
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() != 2 {
            return false;
        }

        let local = parts[0];
        let domain = parts[1];

        // Local part checks
        if local.is_empty() || local.len() > 64 {
            return false;
        }

        // Domain checks
        if domain.is_empty() || !domain.contains('.') {
            return false;
        }

        if !domain
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
        {
            return false;
        }

        // Domain shouldn't start or end with dot or hyphen
        if domain.starts_with('.') || domain.ends_with('.') {
            return false;
        }
        if domain.starts_with('-') || domain.ends_with('-') {
            return false;
        }

        true
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    /// Get the email as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Convert to string for database storage
    pub fn into_db(self) -> String {
        self.0
    }

    /// Get the domain part of the email
    pub fn domain(&self) -> &str {
        self.0.split('@').nth(1).unwrap_or("")
    }
}

impl FromStr for Email {
    type Err = AppError;

    fn from_str(s: &str) -> AppResult<Self> {
        Email::new(s)
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
