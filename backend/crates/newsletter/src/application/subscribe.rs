//! Subscribe Use Case
//!
//! Runs the verification pipeline over one encrypted submission. The steps
//! are strictly sequential and short-circuit on first failure: rate limit,
//! fingerprint shape, token state, proof-of-work, atomic token consumption,
//! request signature, decryption, then content validation. Consumption is
//! the single point of no return; everything before it leaves the
//! challenge untouched.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use serde_json::Value;

use platform::client::client_identifier;
use platform::crypto::constant_time_eq;
use platform::rate_limit::RateLimitStore;
use platform::sanitize::sanitize_text;

use crate::application::config::NewsletterConfig;
use crate::domain::entities::NewSubscriber;
use crate::domain::envelope::EncryptedEnvelope;
use crate::domain::keys::ServerKeypair;
use crate::domain::repository::{
    ChallengeStore, ConsumeOutcome, SubscriberStore, SubscriptionStatus,
};
use crate::domain::services;
use crate::domain::value_objects::{Email, Fingerprint};
use crate::error::{NewsletterError, NewsletterResult};

/// Rate limit bucket for subscribe attempts
const RATE_LIMIT_ENDPOINT: &str = "newsletter_subscribe";

/// Maximum display name length after sanitization
const NAME_MAX_LENGTH: usize = 100;

/// Source recorded when the client does not state one
const DEFAULT_SOURCE: &str = "website";

/// Values of the four required security headers, plus the optional
/// request id, as collected by the handler
#[derive(Debug, Clone)]
pub struct SecurityHeaders {
    pub token: String,
    pub fingerprint: String,
    pub solution: String,
    pub signature: String,
    pub request_id: Option<String>,
}

/// Input DTO for subscribe
#[derive(Debug, Clone)]
pub struct SubscribeInput {
    pub headers: SecurityHeaders,
    pub ciphertext_b64: String,
    pub nonce_b64: String,
    pub client_public_key_b64: String,
    pub client_ip: Option<IpAddr>,
}

/// Output DTO for subscribe
#[derive(Debug, Clone)]
pub struct SubscribeOutput {
    pub message: String,
    pub status: SubscriptionStatus,
}

/// Plaintext subscriber details recovered from the envelope
#[derive(Debug, Deserialize)]
struct DecryptedSubmission {
    email: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    metadata: Option<Value>,
}

/// Subscribe Use Case
pub struct SubscribeUseCase<C, S, L>
where
    C: ChallengeStore,
    S: SubscriberStore,
    L: RateLimitStore,
{
    challenges: Arc<C>,
    subscribers: Arc<S>,
    rate_limiter: Arc<L>,
    keypair: Arc<ServerKeypair>,
    config: Arc<NewsletterConfig>,
}

impl<C, S, L> SubscribeUseCase<C, S, L>
where
    C: ChallengeStore,
    S: SubscriberStore,
    L: RateLimitStore,
{
    pub fn new(
        challenges: Arc<C>,
        subscribers: Arc<S>,
        rate_limiter: Arc<L>,
        keypair: Arc<ServerKeypair>,
        config: Arc<NewsletterConfig>,
    ) -> Self {
        Self {
            challenges,
            subscribers,
            rate_limiter,
            keypair,
            config,
        }
    }

    pub async fn execute(&self, input: SubscribeInput) -> NewsletterResult<SubscribeOutput> {
        // Check rate limit; keyed by IP with the fingerprint as fallback
        let identifier = client_identifier(input.client_ip, &input.headers.fingerprint);
        match self
            .rate_limiter
            .check_and_increment(
                &identifier,
                RATE_LIMIT_ENDPOINT,
                &self.config.subscribe_rate,
            )
            .await
        {
            Ok(result) if !result.allowed => return Err(NewsletterError::RateLimited),
            Ok(_) => {}
            Err(e) => {
                // Store errors do not block submissions
                tracing::error!(error = %e, "rate limit backend unavailable");
            }
        }

        let fingerprint = Fingerprint::parse(&input.headers.fingerprint)?;
        let token = input.headers.token.as_str();

        // Token gate: read-only checks, nothing is consumed yet
        let challenge = self
            .challenges
            .get(token)
            .await?
            .ok_or(NewsletterError::TokenNotFound)?;

        if challenge.is_expired() {
            if let Err(e) = self.challenges.sweep().await {
                tracing::debug!(error = %e, "sweep after expired lookup failed");
            }
            return Err(NewsletterError::TokenExpired);
        }
        if !challenge.matches_fingerprint(&fingerprint) {
            return Err(NewsletterError::FingerprintMismatch);
        }
        if challenge.consumed {
            return Err(NewsletterError::TokenAlreadyUsed);
        }

        // Proof of work: the nonce travels as a decimal string
        let nonce: u64 = input
            .headers
            .solution
            .trim()
            .parse()
            .map_err(|_| NewsletterError::InvalidSolution)?;
        let attempt = services::pow_hash_hex(&challenge.puzzle_data, nonce);
        if !services::meets_target(&attempt, &challenge.target) {
            return Err(NewsletterError::InvalidSolution);
        }

        // Consume: exactly one request per token gets past this point
        match self.challenges.consume(token).await? {
            ConsumeOutcome::Consumed => {}
            ConsumeOutcome::NotFound => return Err(NewsletterError::TokenNotFound),
            ConsumeOutcome::Expired => return Err(NewsletterError::TokenExpired),
            ConsumeOutcome::AlreadyConsumed => return Err(NewsletterError::TokenAlreadyUsed),
        }

        // Signature binds the envelope to the token and the current minute
        let canonical = services::canonical_envelope_json(
            &input.ciphertext_b64,
            &input.client_public_key_b64,
            &input.nonce_b64,
        );
        let expected =
            services::request_signature(&canonical, token, services::current_minute());
        if !constant_time_eq(expected.as_bytes(), input.headers.signature.as_bytes()) {
            return Err(NewsletterError::InvalidSignature);
        }

        // Decrypt and parse the envelope
        let envelope = EncryptedEnvelope::decode(
            &input.ciphertext_b64,
            &input.nonce_b64,
            &input.client_public_key_b64,
        )?;
        let key = self.keypair.derive_shared_key(envelope.client_public_key())?;
        let plaintext = envelope.open(&key)?;
        let submission: DecryptedSubmission =
            serde_json::from_slice(&plaintext).map_err(|_| NewsletterError::MalformedPayload)?;

        self.validate_submission(&submission)?;

        let email = Email::new(&submission.email)
            .map_err(|e| NewsletterError::Validation(e.message().to_string()))?;
        let name = submission
            .name
            .as_deref()
            .and_then(|n| sanitize_text(n, NAME_MAX_LENGTH));
        let source = submission
            .source
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SOURCE.to_string());

        let subscriber = NewSubscriber {
            email,
            name,
            source,
            metadata: submission.metadata,
            client_ip: input.client_ip,
            request_id: input.headers.request_id,
        };

        let status = self.subscribers.subscribe(&subscriber).await?;

        let (outcome, message) = match &status {
            SubscriptionStatus::Subscribed { .. } => (
                "subscribed",
                "Subscription successful. Please check your email to confirm.",
            ),
            SubscriptionStatus::AlreadySubscribed => {
                ("already_subscribed", "You are already subscribed.")
            }
            SubscriptionStatus::Reactivated => {
                ("reactivated", "Your subscription has been reactivated.")
            }
        };

        tracing::info!(
            email_domain = %subscriber.email.domain(),
            source = %subscriber.source,
            outcome,
            "newsletter subscription accepted"
        );

        Ok(SubscribeOutput {
            message: message.to_string(),
            status,
        })
    }

    /// Content checks over the decrypted submission
    ///
    /// Behavioral signals are enforced only when the client reports them;
    /// their absence is not a failure.
    fn validate_submission(&self, submission: &DecryptedSubmission) -> NewsletterResult<()> {
        let metadata = match &submission.metadata {
            Some(Value::Object(map)) => map,
            _ => return Ok(()),
        };

        // Honeypot: real browsers never populate this field
        if let Some(website) = metadata.get("website").and_then(Value::as_str) {
            if !website.trim().is_empty() {
                tracing::warn!("honeypot field populated, rejecting submission");
                return Err(NewsletterError::Validation("Invalid submission".to_string()));
            }
        }

        if let Some(timestamp_ms) = metadata.get("timestamp").and_then(Value::as_i64) {
            if timestamp_ms != 0 {
                let elapsed_ms = Utc::now().timestamp_millis() - timestamp_ms;
                if elapsed_ms < self.config.min_submit_delay_ms() {
                    tracing::warn!(elapsed_ms, "suspiciously fast submission");
                    return Err(NewsletterError::Validation(
                        "Submission too fast".to_string(),
                    ));
                }
            }
        }

        if let Some(interactions) = metadata.get("interactions").and_then(Value::as_array) {
            if !interactions.is_empty() && interactions.len() < self.config.min_interactions {
                tracing::warn!(
                    interactions = interactions.len(),
                    "suspiciously low interaction count"
                );
                return Err(NewsletterError::Validation(
                    "Insufficient user interaction".to_string(),
                ));
            }
        }

        Ok(())
    }
}
