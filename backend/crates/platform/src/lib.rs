//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256, Base64, constant-time compare)
//! - Client identification (IP extraction, request ids)
//! - Free-text sanitization
//! - Rate limiting infrastructure

pub mod client;
pub mod crypto;
pub mod rate_limit;
pub mod sanitize;
