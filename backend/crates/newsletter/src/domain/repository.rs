//! Repository Traits
//!
//! Interfaces for challenge and subscriber persistence. Implementations
//! live in the infrastructure layer; rate limiting reuses the
//! `platform::rate_limit` trait.

use kernel::id::SubscriberId;

use crate::domain::entities::{Challenge, NewSubscriber};
use crate::error::NewsletterResult;

/// Result of an atomic challenge consumption
///
/// Exactly one caller can ever observe `Consumed` for a given token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// This call flipped the challenge to consumed
    Consumed,
    /// No challenge registered under the token
    NotFound,
    /// Challenge existed but its TTL had passed
    Expired,
    /// An earlier call already consumed the challenge
    AlreadyConsumed,
}

/// Challenge store trait
#[trait_variant::make(ChallengeStore: Send)]
pub trait LocalChallengeStore {
    /// Register a freshly issued challenge
    async fn insert(&self, challenge: &Challenge) -> NewsletterResult<()>;

    /// Fetch a challenge without consuming it
    ///
    /// Returns expired challenges as-is; callers decide whether to sweep.
    async fn get(&self, token: &str) -> NewsletterResult<Option<Challenge>>;

    /// Consume a challenge atomically
    async fn consume(&self, token: &str) -> NewsletterResult<ConsumeOutcome>;

    /// Remove expired challenges, returning how many were dropped
    async fn sweep(&self) -> NewsletterResult<usize>;
}

/// Outcome of a subscription attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    /// New subscriber row created
    Subscribed {
        subscription_id: SubscriberId,
        requires_confirmation: bool,
    },
    /// An active subscription already exists for this email
    AlreadySubscribed,
    /// A lapsed subscription was switched back to active
    Reactivated,
}

/// Subscriber store trait
#[trait_variant::make(SubscriberStore: Send)]
pub trait LocalSubscriberStore {
    /// Persist a validated submission
    async fn subscribe(&self, subscriber: &NewSubscriber) -> NewsletterResult<SubscriptionStatus>;
}
