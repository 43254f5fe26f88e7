//! Newsletter Backend Module
//!
//! Anti-automation protection for the newsletter sign-up endpoint.
//!
//! Clean Architecture structure:
//! - `domain/` - Business logic, entities, repository traits
//! - `application/` - Use cases
//! - `infra/` - Store implementations
//! - `presentation/` - HTTP handlers
//!
//! ## Security Model
//! - Backend is the sole authority for challenge generation, difficulty, TTL, and verification
//! - Challenge tokens are single-use; consumption is atomic (no double-spend)
//! - Subscriber details travel inside an ECDH-encrypted envelope, never in plaintext
//! - All security verification failures collapse to one undifferentiated rejection

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::NewsletterConfig;
pub use domain::keys::ServerKeypair;
pub use error::{NewsletterError, NewsletterResult};
pub use infra::memory::MemoryChallengeStore;
pub use infra::postgres::PgNewsletterStore;
pub use presentation::router::newsletter_router;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, ResultExt},
    kind::ErrorKind,
};
