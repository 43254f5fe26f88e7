//! Domain Entities
//!
//! Core business entities for the newsletter domain.

use chrono::{DateTime, Duration, Utc};
use std::net::IpAddr;

use crate::domain::value_objects::{Difficulty, Email, Fingerprint, SecurityToken};

/// Challenge entity - a single-use PoW puzzle bound to one client
///
/// The puzzle data embeds the token, the fingerprint, and the issue time,
/// so a solution cannot be transplanted onto another challenge.
#[derive(Debug, Clone)]
pub struct Challenge {
    pub token: SecurityToken,
    pub fingerprint: Fingerprint,
    pub client_ip: Option<IpAddr>,
    pub puzzle_data: String,
    pub target: String,
    pub difficulty: Difficulty,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub consumed: bool,
}

impl Challenge {
    /// Issue a new challenge for a client
    pub fn issue(
        fingerprint: Fingerprint,
        client_ip: Option<IpAddr>,
        difficulty: Difficulty,
        ttl: Duration,
    ) -> Self {
        let token = SecurityToken::mint();
        let issued_at = Utc::now();
        let puzzle_data = format!(
            "{}:{}:{}",
            token.as_str(),
            fingerprint.as_str(),
            issued_at.timestamp()
        );

        Self {
            token,
            fingerprint,
            client_ip,
            puzzle_data,
            target: difficulty.target_prefix(),
            difficulty,
            issued_at,
            expires_at: issued_at + ttl,
            consumed: false,
        }
    }

    /// Check if the challenge has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if the presented fingerprint matches the one the challenge
    /// was issued to
    pub fn matches_fingerprint(&self, presented: &Fingerprint) -> bool {
        self.fingerprint == *presented
    }
}

/// NewSubscriber entity - a validated submission ready for persistence
#[derive(Debug, Clone)]
pub struct NewSubscriber {
    pub email: Email,
    pub name: Option<String>,
    pub source: String,
    pub metadata: Option<serde_json::Value>,
    pub client_ip: Option<IpAddr>,
    pub request_id: Option<String>,
}
