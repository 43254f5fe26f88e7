//! Newsletter Router

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use platform::rate_limit::{MemoryRateLimiter, RateLimitStore};

use crate::application::config::NewsletterConfig;
use crate::domain::keys::ServerKeypair;
use crate::domain::repository::{ChallengeStore, SubscriberStore};
use crate::infra::memory::{MemoryChallengeStore, MemorySubscriberStore};
use crate::infra::postgres::PgNewsletterStore;
use crate::presentation::handlers::{self, NewsletterState};

/// Create the newsletter router with PostgreSQL persistence
///
/// The challenge store is shared with the caller so the hosting app can
/// drive the periodic sweep.
pub fn newsletter_router(
    challenges: Arc<MemoryChallengeStore>,
    store: PgNewsletterStore,
    keypair: Arc<ServerKeypair>,
    config: Arc<NewsletterConfig>,
) -> Router {
    let store = Arc::new(store);
    newsletter_router_generic(challenges, store.clone(), store, keypair, config)
}

/// Create a fully in-memory newsletter router (development, tests)
pub fn newsletter_router_memory(
    challenges: Arc<MemoryChallengeStore>,
    keypair: Arc<ServerKeypair>,
    config: Arc<NewsletterConfig>,
) -> Router {
    newsletter_router_generic(
        challenges,
        Arc::new(MemorySubscriberStore::new()),
        Arc::new(MemoryRateLimiter::new()),
        keypair,
        config,
    )
}

/// Create a newsletter router over any store implementations
pub fn newsletter_router_generic<C, S, L>(
    challenges: Arc<C>,
    subscribers: Arc<S>,
    rate_limiter: Arc<L>,
    keypair: Arc<ServerKeypair>,
    config: Arc<NewsletterConfig>,
) -> Router
where
    C: ChallengeStore + Send + Sync + 'static,
    S: SubscriberStore + Send + Sync + 'static,
    L: RateLimitStore + Send + Sync + 'static,
{
    let state = NewsletterState {
        challenges,
        subscribers,
        rate_limiter,
        keypair,
        config,
    };

    Router::new()
        .route("/public-key", get(handlers::public_key::<C, S, L>))
        .route("/secure-token", post(handlers::issue_token::<C, S, L>))
        .route(
            "/newsletter/subscribe",
            post(handlers::subscribe::<C, S, L>),
        )
        .with_state(state)
}
