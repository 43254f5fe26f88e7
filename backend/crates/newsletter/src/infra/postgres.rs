//! PostgreSQL Store Implementations
//!
//! Durable subscriber persistence plus fixed-window rate limiting. The
//! challenge registry deliberately stays in memory (`infra::memory`).

use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use kernel::id::SubscriberId;
use platform::rate_limit::{RateLimitConfig, RateLimitResult, RateLimitStore};

use crate::domain::entities::NewSubscriber;
use crate::domain::repository::{SubscriberStore, SubscriptionStatus};
use crate::error::NewsletterResult;

/// Rate limit windows older than this are deleted by cleanup
const STALE_WINDOW_MS: i64 = 7_200_000; // two subscribe windows

/// PostgreSQL-backed newsletter store
#[derive(Clone)]
pub struct PgNewsletterStore {
    pool: PgPool,
}

impl PgNewsletterStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Delete rate limit windows old enough to be irrelevant
    pub async fn cleanup_stale(&self) -> NewsletterResult<u64> {
        let cutoff_ms = Utc::now().timestamp_millis() - STALE_WINDOW_MS;

        let rate_limits_deleted =
            sqlx::query("DELETE FROM newsletter_rate_limits WHERE window_start_ms < $1")
                .bind(cutoff_ms)
                .execute(&self.pool)
                .await?
                .rows_affected();

        tracing::info!(
            rate_limits = rate_limits_deleted,
            "cleaned up stale newsletter data"
        );

        Ok(rate_limits_deleted)
    }
}

impl SubscriberStore for PgNewsletterStore {
    async fn subscribe(&self, subscriber: &NewSubscriber) -> NewsletterResult<SubscriptionStatus> {
        let existing = sqlx::query_scalar::<_, String>(
            "SELECT status FROM newsletter_subscribers WHERE email = $1",
        )
        .bind(subscriber.email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        if let Some(status) = existing {
            if status == "active" {
                tracing::info!(
                    email_domain = %subscriber.email.domain(),
                    "subscription already active"
                );
                return Ok(SubscriptionStatus::AlreadySubscribed);
            }

            sqlx::query(
                r#"
                UPDATE newsletter_subscribers
                SET status = 'active', updated_at = NOW()
                WHERE email = $1
                "#,
            )
            .bind(subscriber.email.as_str())
            .execute(&self.pool)
            .await?;

            tracing::info!(
                email_domain = %subscriber.email.domain(),
                "subscription reactivated"
            );
            return Ok(SubscriptionStatus::Reactivated);
        }

        let subscription_id = SubscriberId::new();
        let inserted = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO newsletter_subscribers (
                id, email, name, source, status, metadata, client_ip, request_id
            ) VALUES ($1, $2, $3, $4, 'pending', $5, $6::inet, $7)
            ON CONFLICT (email) DO NOTHING
            RETURNING id
            "#,
        )
        .bind(subscription_id.as_uuid())
        .bind(subscriber.email.as_str())
        .bind(subscriber.name.as_deref())
        .bind(&subscriber.source)
        .bind(subscriber.metadata.as_ref().map(sqlx::types::Json))
        .bind(subscriber.client_ip.map(|ip| ip.to_string()))
        .bind(subscriber.request_id.as_deref())
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(_) => {
                // Double opt-in: delivery is handled by the mail worker
                tracing::info!(
                    subscription_id = %subscription_id,
                    email_domain = %subscriber.email.domain(),
                    "subscription created, confirmation email queued"
                );
                Ok(SubscriptionStatus::Subscribed {
                    subscription_id,
                    requires_confirmation: true,
                })
            }
            // Lost an insert race to a concurrent request for the same email
            None => Ok(SubscriptionStatus::AlreadySubscribed),
        }
    }
}

impl RateLimitStore for PgNewsletterStore {
    async fn check_and_increment(
        &self,
        identifier: &str,
        endpoint: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = config.window_ms().max(1);
        let window_start = (now_ms / window_ms) * window_ms;

        let (count,): (i32,) = sqlx::query_as(
            r#"
            INSERT INTO newsletter_rate_limits (identifier, endpoint, window_start_ms, request_count)
            VALUES ($1, $2, $3, 1)
            ON CONFLICT (identifier, endpoint, window_start_ms)
            DO UPDATE SET request_count = newsletter_rate_limits.request_count + 1
            RETURNING request_count
            "#,
        )
        .bind(identifier)
        .bind(endpoint)
        .bind(window_start)
        .fetch_one(&self.pool)
        .await?;

        let count = count as u32;
        let allowed = count <= config.max_requests;

        if !allowed {
            tracing::warn!(
                endpoint,
                count,
                max = config.max_requests,
                "rate limit exceeded"
            );
        }

        Ok(RateLimitResult {
            allowed,
            remaining: config.max_requests.saturating_sub(count),
            reset_at_ms: window_start + window_ms,
        })
    }
}
