//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::repository::SubscriptionStatus;

/// Response for GET /public-key
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicKeyResponse {
    pub public_key: String,
}

/// Request for POST /secure-token
#[derive(Debug, Clone, Deserialize)]
pub struct SecureTokenRequest {
    pub fingerprint: String,
}

/// PoW challenge block inside the secure-token response
#[derive(Debug, Clone, Serialize)]
pub struct ChallengeDto {
    pub data: String,
    pub target: String,
    pub difficulty: u8,
}

/// Response for POST /secure-token
#[derive(Debug, Clone, Serialize)]
pub struct SecureTokenResponse {
    pub token: String,
    pub challenge: ChallengeDto,
    pub expires_at: DateTime<Utc>,
}

/// Encrypted payload block inside the subscribe request
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedPayloadDto {
    pub ciphertext: String,
    pub nonce: String,
    pub client_public_key: String,
}

/// Request for POST /newsletter/subscribe
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeRequest {
    pub encrypted_payload: EncryptedPayloadDto,
}

/// Subscription outcome block inside the subscribe response
#[derive(Debug, Clone, Serialize)]
pub struct SubscriptionResultDto {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_confirmation: Option<bool>,
}

impl From<SubscriptionStatus> for SubscriptionResultDto {
    fn from(status: SubscriptionStatus) -> Self {
        match status {
            SubscriptionStatus::Subscribed {
                subscription_id,
                requires_confirmation,
            } => Self {
                status: "subscribed".to_string(),
                subscription_id: Some(subscription_id.to_string()),
                requires_confirmation: Some(requires_confirmation),
            },
            SubscriptionStatus::AlreadySubscribed => Self {
                status: "already_subscribed".to_string(),
                subscription_id: None,
                requires_confirmation: None,
            },
            SubscriptionStatus::Reactivated => Self {
                status: "reactivated".to_string(),
                subscription_id: None,
                requires_confirmation: None,
            },
        }
    }
}

/// Response for POST /newsletter/subscribe
#[derive(Debug, Clone, Serialize)]
pub struct SubscribeResponse {
    pub success: bool,
    pub message: String,
    pub result: SubscriptionResultDto,
}
