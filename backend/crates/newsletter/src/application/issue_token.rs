//! Issue Token Use Case
//!
//! Mints a single-use security token with its PoW challenge and registers
//! it in the challenge store.

use std::net::IpAddr;
use std::sync::Arc;

use chrono::{DateTime, Utc};

use platform::client::client_identifier;
use platform::rate_limit::RateLimitStore;

use crate::application::config::NewsletterConfig;
use crate::domain::entities::Challenge;
use crate::domain::repository::ChallengeStore;
use crate::domain::value_objects::Fingerprint;
use crate::error::{NewsletterError, NewsletterResult};

/// Rate limit bucket for challenge issuance
const RATE_LIMIT_ENDPOINT: &str = "secure_token";

/// Output DTO for issue token
#[derive(Debug, Clone)]
pub struct IssueTokenOutput {
    pub token: String,
    pub challenge_data: String,
    pub target: String,
    pub difficulty: u8,
    pub expires_at: DateTime<Utc>,
}

/// Issue Token Use Case
pub struct IssueTokenUseCase<C, L>
where
    C: ChallengeStore,
    L: RateLimitStore,
{
    challenges: Arc<C>,
    rate_limiter: Arc<L>,
    config: Arc<NewsletterConfig>,
}

impl<C, L> IssueTokenUseCase<C, L>
where
    C: ChallengeStore,
    L: RateLimitStore,
{
    pub fn new(challenges: Arc<C>, rate_limiter: Arc<L>, config: Arc<NewsletterConfig>) -> Self {
        Self {
            challenges,
            rate_limiter,
            config,
        }
    }

    pub async fn execute(
        &self,
        fingerprint: &str,
        client_ip: Option<IpAddr>,
    ) -> NewsletterResult<IssueTokenOutput> {
        // Check rate limit; keyed by IP with the fingerprint as fallback
        let identifier = client_identifier(client_ip, fingerprint);
        match self
            .rate_limiter
            .check_and_increment(&identifier, RATE_LIMIT_ENDPOINT, &self.config.token_rate)
            .await
        {
            Ok(result) if !result.allowed => return Err(NewsletterError::RateLimited),
            Ok(_) => {}
            Err(e) => {
                // Store errors do not block issuance
                tracing::error!(error = %e, "rate limit backend unavailable");
            }
        }

        let fingerprint = Fingerprint::parse(fingerprint)?;

        let challenge = Challenge::issue(
            fingerprint,
            client_ip,
            self.config.difficulty,
            self.config.challenge_ttl_chrono(),
        );

        self.challenges.insert(&challenge).await?;

        tracing::info!(
            token = %challenge.token,
            difficulty = challenge.difficulty.zeros(),
            "issued security challenge"
        );

        Ok(IssueTokenOutput {
            token: challenge.token.as_str().to_string(),
            challenge_data: challenge.puzzle_data,
            target: challenge.target,
            difficulty: challenge.difficulty.zeros(),
            expires_at: challenge.expires_at,
        })
    }
}
