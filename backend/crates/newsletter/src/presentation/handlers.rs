//! HTTP Handlers

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;

use platform::client::{extract_client_ip, extract_request_id};
use platform::rate_limit::RateLimitStore;

use crate::application::config::NewsletterConfig;
use crate::application::issue_token::IssueTokenUseCase;
use crate::application::subscribe::{SecurityHeaders, SubscribeInput, SubscribeUseCase};
use crate::domain::keys::ServerKeypair;
use crate::domain::repository::{ChallengeStore, SubscriberStore};
use crate::error::{NewsletterError, NewsletterResult};
use crate::presentation::dto::{
    ChallengeDto, PublicKeyResponse, SecureTokenRequest, SecureTokenResponse, SubscribeRequest,
    SubscribeResponse,
};

/// Shared state for newsletter handlers
pub struct NewsletterState<C, S, L>
where
    C: ChallengeStore + Send + Sync + 'static,
    S: SubscriberStore + Send + Sync + 'static,
    L: RateLimitStore + Send + Sync + 'static,
{
    pub challenges: Arc<C>,
    pub subscribers: Arc<S>,
    pub rate_limiter: Arc<L>,
    pub keypair: Arc<ServerKeypair>,
    pub config: Arc<NewsletterConfig>,
}

// Manual Clone: the stores themselves need not be Clone, only the Arcs are
impl<C, S, L> Clone for NewsletterState<C, S, L>
where
    C: ChallengeStore + Send + Sync + 'static,
    S: SubscriberStore + Send + Sync + 'static,
    L: RateLimitStore + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            challenges: self.challenges.clone(),
            subscribers: self.subscribers.clone(),
            rate_limiter: self.rate_limiter.clone(),
            keypair: self.keypair.clone(),
            config: self.config.clone(),
        }
    }
}

/// GET /public-key
pub async fn public_key<C, S, L>(
    State(state): State<NewsletterState<C, S, L>>,
) -> Json<PublicKeyResponse>
where
    C: ChallengeStore + Send + Sync + 'static,
    S: SubscriberStore + Send + Sync + 'static,
    L: RateLimitStore + Send + Sync + 'static,
{
    Json(PublicKeyResponse {
        public_key: state.keypair.public_key_b64(),
    })
}

/// POST /secure-token
pub async fn issue_token<C, S, L>(
    State(state): State<NewsletterState<C, S, L>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<SecureTokenRequest>,
) -> NewsletterResult<Json<SecureTokenResponse>>
where
    C: ChallengeStore + Send + Sync + 'static,
    S: SubscriberStore + Send + Sync + 'static,
    L: RateLimitStore + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));

    let use_case = IssueTokenUseCase::new(
        state.challenges.clone(),
        state.rate_limiter.clone(),
        state.config.clone(),
    );

    let output = use_case.execute(&req.fingerprint, client_ip).await?;

    Ok(Json(SecureTokenResponse {
        token: output.token,
        challenge: ChallengeDto {
            data: output.challenge_data,
            target: output.target,
            difficulty: output.difficulty,
        },
        expires_at: output.expires_at,
    }))
}

/// POST /newsletter/subscribe
pub async fn subscribe<C, S, L>(
    State(state): State<NewsletterState<C, S, L>>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    Json(req): Json<SubscribeRequest>,
) -> NewsletterResult<Json<SubscribeResponse>>
where
    C: ChallengeStore + Send + Sync + 'static,
    S: SubscriberStore + Send + Sync + 'static,
    L: RateLimitStore + Send + Sync + 'static,
{
    let client_ip = extract_client_ip(&headers, Some(addr.ip()));
    let security = extract_security_headers(&headers)?;

    let use_case = SubscribeUseCase::new(
        state.challenges.clone(),
        state.subscribers.clone(),
        state.rate_limiter.clone(),
        state.keypair.clone(),
        state.config.clone(),
    );

    let input = SubscribeInput {
        headers: security,
        ciphertext_b64: req.encrypted_payload.ciphertext,
        nonce_b64: req.encrypted_payload.nonce,
        client_public_key_b64: req.encrypted_payload.client_public_key,
        client_ip,
    };

    let output = use_case.execute(input).await?;

    Ok(Json(SubscribeResponse {
        success: true,
        message: output.message,
        result: output.status.into(),
    }))
}

/// Collect the four required security headers
///
/// An empty or whitespace-only value counts as missing.
fn extract_security_headers(headers: &HeaderMap) -> NewsletterResult<SecurityHeaders> {
    let token = header_string(headers, "x-security-token");
    let fingerprint = header_string(headers, "x-fingerprint");
    let solution = header_string(headers, "x-challenge-solution");
    let signature = header_string(headers, "x-request-signature");

    match (token, fingerprint, solution, signature) {
        (Some(token), Some(fingerprint), Some(solution), Some(signature)) => Ok(SecurityHeaders {
            token,
            fingerprint,
            solution,
            signature,
            request_id: extract_request_id(headers),
        }),
        _ => Err(NewsletterError::MissingSecurityHeaders),
    }
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
