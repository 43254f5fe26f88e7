//! In-Memory Store Implementations
//!
//! The challenge registry is always memory-backed: challenges live for
//! minutes and are worthless after a restart, so durability buys nothing.
//! The subscriber store here backs development and tests; production uses
//! the PostgreSQL implementation.

use std::collections::HashMap;
use std::sync::RwLock;

use kernel::id::SubscriberId;

use crate::domain::entities::{Challenge, NewSubscriber};
use crate::domain::repository::{
    ChallengeStore, ConsumeOutcome, SubscriberStore, SubscriptionStatus,
};
use crate::error::{NewsletterError, NewsletterResult};

/// In-memory challenge registry keyed by token
#[derive(Debug, Default)]
pub struct MemoryChallengeStore {
    challenges: RwLock<HashMap<String, Challenge>>,
}

impl MemoryChallengeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_error() -> NewsletterError {
        NewsletterError::Internal("challenge store lock poisoned".to_string())
    }
}

impl ChallengeStore for MemoryChallengeStore {
    async fn insert(&self, challenge: &Challenge) -> NewsletterResult<()> {
        let mut challenges = self.challenges.write().map_err(|_| Self::lock_error())?;
        challenges.insert(challenge.token.as_str().to_string(), challenge.clone());
        Ok(())
    }

    async fn get(&self, token: &str) -> NewsletterResult<Option<Challenge>> {
        let challenges = self.challenges.read().map_err(|_| Self::lock_error())?;
        Ok(challenges.get(token).cloned())
    }

    async fn consume(&self, token: &str) -> NewsletterResult<ConsumeOutcome> {
        let mut challenges = self.challenges.write().map_err(|_| Self::lock_error())?;

        let Some(challenge) = challenges.get_mut(token) else {
            return Ok(ConsumeOutcome::NotFound);
        };

        // Expiry is re-checked under the write lock; nothing expired may
        // cross the point of no return
        if challenge.is_expired() {
            challenges.remove(token);
            return Ok(ConsumeOutcome::Expired);
        }
        if challenge.consumed {
            return Ok(ConsumeOutcome::AlreadyConsumed);
        }

        challenge.consumed = true;
        Ok(ConsumeOutcome::Consumed)
    }

    async fn sweep(&self) -> NewsletterResult<usize> {
        let mut challenges = self.challenges.write().map_err(|_| Self::lock_error())?;
        let before = challenges.len();
        challenges.retain(|_, challenge| !challenge.is_expired());
        let removed = before - challenges.len();

        if removed > 0 {
            tracing::info!(removed, "cleaned up expired challenges");
        }
        Ok(removed)
    }
}

/// In-memory subscriber record
#[derive(Debug, Clone)]
struct SubscriberRecord {
    id: SubscriberId,
    status: String,
}

/// In-memory subscriber store keyed by email
#[derive(Debug, Default)]
pub struct MemorySubscriberStore {
    subscribers: RwLock<HashMap<String, SubscriberRecord>>,
}

impl MemorySubscriberStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_error() -> NewsletterError {
        NewsletterError::Internal("subscriber store lock poisoned".to_string())
    }
}

impl SubscriberStore for MemorySubscriberStore {
    async fn subscribe(&self, subscriber: &NewSubscriber) -> NewsletterResult<SubscriptionStatus> {
        let mut subscribers = self.subscribers.write().map_err(|_| Self::lock_error())?;

        if let Some(record) = subscribers.get_mut(subscriber.email.as_str()) {
            if record.status == "active" {
                return Ok(SubscriptionStatus::AlreadySubscribed);
            }
            record.status = "active".to_string();
            tracing::debug!(subscription_id = %record.id, "subscription reactivated");
            return Ok(SubscriptionStatus::Reactivated);
        }

        let id = SubscriberId::new();
        subscribers.insert(
            subscriber.email.as_str().to_string(),
            SubscriberRecord {
                id,
                status: "pending".to_string(),
            },
        );

        Ok(SubscriptionStatus::Subscribed {
            subscription_id: id,
            requires_confirmation: true,
        })
    }
}
