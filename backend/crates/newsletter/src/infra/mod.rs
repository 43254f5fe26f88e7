//! Infrastructure Layer - Store Implementations
//!
//! - `memory` - in-process challenge registry and subscriber store
//! - `postgres` - durable subscriber persistence and rate limiting

pub mod memory;
pub mod postgres;
