//! Domain entities for the secret storage service.

pub mod secret;

pub use secret::{ttl, Secret, TTL_SECONDS};
