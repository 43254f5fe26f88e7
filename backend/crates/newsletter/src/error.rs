//! Newsletter Error Types
//!
//! This module provides newsletter-specific error variants that integrate
//! with the unified `kernel::error::AppError` system.
//!
//! Errors fall into four client-visible categories: validation (specific
//! message), security (one collapsed message for every verification
//! failure), rate limiting, and internal. The variants stay distinct so
//! logs can tell them apart even though clients cannot.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use serde_json::json;
use thiserror::Error;

/// Newsletter-specific result type alias
pub type NewsletterResult<T> = Result<T, NewsletterError>;

/// Newsletter-specific error variants
///
/// These are domain-specific errors that map to appropriate HTTP status codes
/// and can be converted to `AppError` for unified error handling.
#[derive(Debug, Error)]
pub enum NewsletterError {
    /// One or more required security headers are absent or empty
    #[error("Missing required security headers")]
    MissingSecurityHeaders,

    /// Fingerprint is not 64 lowercase/uppercase hex characters
    #[error("Invalid fingerprint format")]
    InvalidFingerprint,

    /// Decrypted submission failed a content check (message is client-safe)
    #[error("{0}")]
    Validation(String),

    /// Request body or decrypted payload did not match the expected shape
    #[error("Invalid request format")]
    MalformedPayload,

    /// No challenge registered under the presented token
    #[error("Security token not found")]
    TokenNotFound,

    /// Challenge TTL exceeded
    #[error("Security token expired")]
    TokenExpired,

    /// Token exists but was issued to a different fingerprint
    #[error("Fingerprint does not match token")]
    FingerprintMismatch,

    /// Token was already consumed by an earlier request
    #[error("Security token already used")]
    TokenAlreadyUsed,

    /// Proof-of-work solution missing, unparseable, or below target
    #[error("Proof-of-work solution rejected")]
    InvalidSolution,

    /// Request signature did not match the recomputed value
    #[error("Request signature mismatch")]
    InvalidSignature,

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Client public key malformed or cryptographically unusable
    #[error("Client public key rejected")]
    InvalidClientKey,

    /// Ciphertext failed authenticated decryption
    #[error("Payload decryption failed")]
    DecryptFailed,

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl NewsletterError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            NewsletterError::MissingSecurityHeaders
            | NewsletterError::InvalidFingerprint
            | NewsletterError::Validation(_)
            | NewsletterError::MalformedPayload => StatusCode::BAD_REQUEST,
            NewsletterError::TokenNotFound
            | NewsletterError::TokenExpired
            | NewsletterError::FingerprintMismatch
            | NewsletterError::TokenAlreadyUsed
            | NewsletterError::InvalidSolution
            | NewsletterError::InvalidSignature => StatusCode::FORBIDDEN,
            NewsletterError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            NewsletterError::InvalidClientKey
            | NewsletterError::DecryptFailed
            | NewsletterError::Database(_)
            | NewsletterError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            NewsletterError::MissingSecurityHeaders
            | NewsletterError::InvalidFingerprint
            | NewsletterError::Validation(_)
            | NewsletterError::MalformedPayload => ErrorKind::BadRequest,
            NewsletterError::TokenNotFound
            | NewsletterError::TokenExpired
            | NewsletterError::FingerprintMismatch
            | NewsletterError::TokenAlreadyUsed
            | NewsletterError::InvalidSolution
            | NewsletterError::InvalidSignature => ErrorKind::Forbidden,
            NewsletterError::RateLimited => ErrorKind::TooManyRequests,
            NewsletterError::InvalidClientKey
            | NewsletterError::DecryptFailed
            | NewsletterError::Database(_)
            | NewsletterError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Whether this is a security verification failure (collapsed for clients)
    pub fn is_security(&self) -> bool {
        matches!(
            self,
            NewsletterError::TokenNotFound
                | NewsletterError::TokenExpired
                | NewsletterError::FingerprintMismatch
                | NewsletterError::TokenAlreadyUsed
                | NewsletterError::InvalidSolution
                | NewsletterError::InvalidSignature
        )
    }

    /// The message clients see
    ///
    /// Security failures all collapse to one generic string so the response
    /// never reveals which check failed. Validation messages pass through
    /// since they describe the client's own (decrypted) input.
    pub fn client_message(&self) -> String {
        match self {
            NewsletterError::MissingSecurityHeaders => {
                "Missing required security headers".to_string()
            }
            NewsletterError::InvalidFingerprint => "Invalid fingerprint format".to_string(),
            NewsletterError::Validation(message) => message.clone(),
            NewsletterError::MalformedPayload => "Invalid request format".to_string(),
            _ if self.is_security() => "Security validation failed".to_string(),
            NewsletterError::RateLimited => {
                "Too many requests. Please try again later.".to_string()
            }
            NewsletterError::InvalidClientKey | NewsletterError::DecryptFailed => {
                "Failed to process encrypted data".to_string()
            }
            _ => "Internal server error".to_string(),
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            NewsletterError::Database(e) => {
                tracing::error!(error = %e, "newsletter database error");
            }
            NewsletterError::Internal(msg) => {
                tracing::error!(message = %msg, "newsletter internal error");
            }
            NewsletterError::InvalidClientKey | NewsletterError::DecryptFailed => {
                tracing::error!(error = %self, "newsletter decryption failure");
            }
            NewsletterError::RateLimited => {
                tracing::warn!("newsletter rate limit exceeded");
            }
            _ if self.is_security() => {
                tracing::warn!(error = %self, "newsletter security check failed");
            }
            _ => {
                tracing::debug!(error = %self, "newsletter request rejected");
            }
        }
    }
}

impl From<NewsletterError> for AppError {
    fn from(err: NewsletterError) -> Self {
        let kind = err.kind();
        let message = err.client_message();
        AppError::new(kind, message)
    }
}

impl IntoResponse for NewsletterError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status_code();
        let body = Json(json!({
            "success": false,
            "message": self.client_message(),
        }));
        (status, body).into_response()
    }
}
