//! # Cachette
//!
//! Cachette (French: "hiding place") is a short-lived secret-storage
//! service: clients submit an opaque text body plus key/value metadata,
//! receive a generated identifier, and can later retrieve or delete the
//! secret by that identifier. Every secret carries a fixed 3-hour TTL;
//! expired secrets are invisible to readers and are physically removed by a
//! background sweep.
//!
//! ## Architecture
//!
//! ```text
//! HTTP adapter → Secret Service → Repository → storage medium
//!                      ↑
//!              Pruning Scheduler (periodic ping + prune)
//! ```
//!
//! The repository contract ([`storage::SecretRepository`]) has four
//! interchangeable backends: an in-process map, PostgreSQL, Redis (native
//! key expiry) and SQLite (document rows). Expired-means-absent behavior is
//! identical regardless of backend.

pub mod api;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod services;
pub mod storage;

pub use config::Settings;
pub use errors::{CachetteError, Result};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
