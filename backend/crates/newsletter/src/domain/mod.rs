//! Domain Layer - Business logic and entities
//!
//! This layer contains:
//! - Domain entities (Challenge, NewSubscriber)
//! - Domain value objects (Fingerprint, SecurityToken, Difficulty, Email)
//! - Domain services (PoW hashing, canonical serialization, signatures)
//! - Key handling (X25519 keypair, HKDF key derivation)
//! - Encrypted envelope (ChaCha20-Poly1305)
//! - Repository traits (interfaces)

pub mod entities;
pub mod envelope;
pub mod keys;
pub mod repository;
pub mod services;
pub mod value_objects;
