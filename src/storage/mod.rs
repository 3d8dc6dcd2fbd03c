//! # Storage Layer
//!
//! The repository contract every storage backend satisfies, plus the
//! concrete backends: in-process memory, PostgreSQL (relational), Redis
//! (key-value with native expiry) and SQLite (document rows).

pub mod memory;
pub mod postgres;
pub mod redis;
pub mod sqlite;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{BackendKind, DatabaseConfig};
use crate::domain::Secret;
use crate::errors::Result;

pub use memory::MemoryRepository;
pub use postgres::PostgresRepository;
pub use redis::RedisRepository;
pub use sqlite::SqliteRepository;

/// The storage contract for [`Secret`] persistence.
///
/// Any backend satisfying this trait is substitutable without changing the
/// service layer. All operations are safe under concurrent invocation.
#[async_trait]
pub trait SecretRepository: Send + Sync {
    /// Establish the backend connection and allocate internal storage.
    /// Must be called exactly once before any other operation; fails with
    /// [`crate::errors::CachetteError::Connection`] if the backend is
    /// unreachable or misconfigured.
    async fn init(&self) -> Result<()>;

    /// Verify the backend is currently reachable. Side-effect free.
    async fn ping(&self) -> Result<()>;

    /// Release backend resources. Callers invoke this at most once during
    /// shutdown; operations after `close` fail with a closed-repository
    /// error.
    async fn close(&self) -> Result<()>;

    /// Allocate a fresh 128-bit random identifier, stamp `created_at = now`,
    /// compute `expire_at` and persist atomically. The returned secret never
    /// has an empty id, and concurrent calls each receive a distinct id.
    async fn create(&self, body: String, meta: HashMap<String, String>) -> Result<Secret>;

    /// Return the secret if present and not expired; absent and expired
    /// records are indistinguishable to the caller.
    ///
    /// `created_at` read back is not guaranteed bit-exact across backends:
    /// the Redis backend reconstructs it from the remaining TTL at second
    /// granularity. Only `expire_at`/expiry status is load-bearing.
    async fn find_by_id(&self, id: &str) -> Result<Secret>;

    /// Remove the secret. Deleting an already-expired-but-not-yet-pruned
    /// record may succeed; a key that is entirely absent is a
    /// [`crate::errors::CachetteError::NotFound`].
    async fn delete_by_id(&self, id: &str) -> Result<()>;

    /// Delete every secret whose `expire_at` has passed as of the call time.
    /// Idempotent; succeeds even when nothing is pruned; never removes an
    /// unexpired secret.
    async fn prune(&self) -> Result<()>;
}

/// Construct the repository selected by the configuration.
///
/// The returned repository is not yet initialized; callers run
/// [`SecretRepository::init`] once before use. Unknown backend kinds never
/// reach this point: they are rejected while parsing the configuration.
pub fn create_repository(config: &DatabaseConfig) -> Arc<dyn SecretRepository> {
    match config.backend {
        BackendKind::Memory => Arc::new(MemoryRepository::new()),
        BackendKind::Postgres => Arc::new(PostgresRepository::new(config.url.clone())),
        BackendKind::Redis => Arc::new(RedisRepository::new(config.url.clone())),
        BackendKind::Sqlite => Arc::new(SqliteRepository::new(config.url.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_selects_backend() {
        let config = DatabaseConfig { backend: BackendKind::Memory, url: String::new() };
        // smoke check: the factory hands back a usable trait object
        let repo = create_repository(&config);
        let _: &dyn SecretRepository = repo.as_ref();
    }
}
