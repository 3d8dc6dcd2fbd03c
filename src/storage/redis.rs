//! Redis key-value backend.
//!
//! Each secret is a Redis hash (metadata fields plus the payload under the
//! reserved `body` field) written with a pipelined HSET + EXPIRE, so the
//! backend evicts expired keys natively and `prune` has nothing to do.
//!
//! The backend does not store `created_at` directly: reads reconstruct it
//! from the remaining TTL (`expire_at - TTL`) at second granularity. Only
//! expiry status is load-bearing, so this approximation is acceptable.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ttl, Secret, TTL_SECONDS};
use crate::errors::{CachetteError, Result};
use crate::storage::SecretRepository;

/// Hash field holding the secret payload, alongside the metadata fields.
const BODY_FIELD: &str = "body";

/// Secret repository backed by Redis hashes with native key expiry.
pub struct RedisRepository {
    url: String,
    conn: RwLock<Option<ConnectionManager>>,
}

impl RedisRepository {
    pub fn new(url: String) -> Self {
        Self { url, conn: RwLock::new(None) }
    }

    async fn conn(&self) -> Result<ConnectionManager> {
        self.conn.read().await.as_ref().cloned().ok_or(CachetteError::Closed)
    }
}

impl std::fmt::Debug for RedisRepository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisRepository").field("url", &self.url).finish()
    }
}

#[async_trait]
impl SecretRepository for RedisRepository {
    async fn init(&self) -> Result<()> {
        let client = redis::Client::open(self.url.as_str()).map_err(|e| {
            CachetteError::connection_with_source(
                format!("invalid Redis connection string '{}'", self.url),
                Box::new(e),
            )
        })?;
        let manager = client.get_connection_manager().await.map_err(|e| {
            tracing::error!(error = %e, "failed to connect to Redis");
            CachetteError::connection_with_source("failed to connect to Redis", Box::new(e))
        })?;

        let mut guard = self.conn.write().await;
        *guard = Some(manager);
        drop(guard);

        self.ping().await
    }

    async fn ping(&self) -> Result<()> {
        let mut conn = self.conn().await?;
        let _pong: String = redis::cmd("PING").query_async(&mut conn).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.conn.write().await;
        *guard = None;
        Ok(())
    }

    async fn create(&self, body: String, meta: HashMap<String, String>) -> Result<Secret> {
        let mut conn = self.conn().await?;
        let secret = Secret::new(Uuid::new_v4().to_string(), body, meta, Utc::now());

        let mut pipe = redis::pipe();
        pipe.atomic();
        for (key, value) in &secret.meta {
            pipe.hset(&secret.id, key, value);
        }
        pipe.hset(&secret.id, BODY_FIELD, &secret.body);
        pipe.expire(&secret.id, TTL_SECONDS);
        let _: () = pipe.query_async(&mut conn).await.map_err(|e| {
            tracing::error!(error = %e, secret_id = %secret.id, "failed to store secret");
            CachetteError::from(e)
        })?;

        Ok(secret)
    }

    async fn find_by_id(&self, id: &str) -> Result<Secret> {
        let mut conn = self.conn().await?;
        let mut raw: HashMap<String, String> = conn.hgetall(id).await?;
        if raw.is_empty() {
            return Err(CachetteError::not_found(id));
        }
        let body = raw.remove(BODY_FIELD).unwrap_or_default();

        let remaining: i64 = conn.ttl(id).await?;
        if remaining < 0 {
            // evicted between HGETALL and TTL
            return Err(CachetteError::not_found(id));
        }

        // created_at reconstructed from the remaining TTL, second granularity
        let expire_at = Utc::now() + Duration::seconds(remaining);
        let created_at = expire_at - ttl();
        Ok(Secret::new(id.to_string(), body, raw, created_at))
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let mut conn = self.conn().await?;
        let removed: i64 = conn.del(id).await?;
        if removed == 0 {
            return Err(CachetteError::not_found(id));
        }
        Ok(())
    }

    /// Redis evicts expired keys natively; nothing to sweep.
    async fn prune(&self) -> Result<()> {
        Ok(())
    }
}

// Requires a running Redis pointed at by CACHETTE_TEST_REDIS_URL.
// Run with: cargo test --features redis_tests
#[cfg(all(test, feature = "redis_tests"))]
mod tests {
    use super::*;

    fn test_url() -> String {
        std::env::var("CACHETTE_TEST_REDIS_URL")
            .unwrap_or_else(|_| "redis://127.0.0.1:6379/0".to_string())
    }

    async fn repo() -> RedisRepository {
        let repo = RedisRepository::new(test_url());
        repo.init().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_lifecycle() {
        let repo = repo().await;
        repo.ping().await.unwrap();

        let mut meta = HashMap::new();
        meta.insert("a".to_string(), "b".to_string());
        let created = repo.create("hello".to_string(), meta).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.expire_at - created.created_at, ttl());

        let found = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(found.body, "hello");
        assert_eq!(found.meta.get("a").map(String::as_str), Some("b"));
        // reconstructed timestamps are only second-accurate
        let drift = (found.expire_at - created.expire_at).num_seconds().abs();
        assert!(drift <= 2, "expire_at drifted by {}s", drift);

        repo.delete_by_id(&created.id).await.unwrap();
        assert!(repo.find_by_id(&created.id).await.unwrap_err().is_not_found());
        assert!(repo.delete_by_id(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_prune_is_a_no_op() {
        let repo = repo().await;
        let created = repo.create("still here".to_string(), HashMap::new()).await.unwrap();
        repo.prune().await.unwrap();
        assert!(repo.find_by_id(&created.id).await.is_ok());
        repo.delete_by_id(&created.id).await.unwrap();
    }
}
