//! SQLite document backend.
//!
//! Each secret is one row holding a single JSON document (`{body, meta}`)
//! plus its creation time as a unix-millisecond column used for pruning.
//! Expiry is filtered at read time, like the relational backend.

use std::collections::HashMap;
use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{FromRow, SqlitePool};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::{ttl, Secret};
use crate::errors::{CachetteError, Result};
use crate::storage::SecretRepository;

const SCHEMA: &str = "CREATE TABLE IF NOT EXISTS secrets (
    id TEXT PRIMARY KEY,
    document TEXT NOT NULL,
    created_at INTEGER NOT NULL
)";

/// The JSON document persisted per secret.
#[derive(Debug, Serialize, Deserialize)]
struct SecretDocument {
    body: String,
    meta: HashMap<String, String>,
}

#[derive(Debug, FromRow)]
struct DocumentRow {
    id: String,
    document: String,
    created_at: i64,
}

impl DocumentRow {
    fn into_secret(self) -> Result<Secret> {
        let doc: SecretDocument = serde_json::from_str(&self.document).map_err(|e| {
            CachetteError::internal(format!("corrupt secret document '{}': {}", self.id, e))
        })?;
        let created_at = DateTime::<Utc>::from_timestamp_millis(self.created_at)
            .ok_or_else(|| {
                CachetteError::internal(format!("invalid created_at for secret '{}'", self.id))
            })?;
        Ok(Secret::new(self.id, doc.body, doc.meta, created_at))
    }
}

/// Secret repository storing JSON documents in a SQLite table.
#[derive(Debug)]
pub struct SqliteRepository {
    url: String,
    pool: RwLock<Option<SqlitePool>>,
}

impl SqliteRepository {
    pub fn new(url: String) -> Self {
        Self { url, pool: RwLock::new(None) }
    }

    async fn pool(&self) -> Result<SqlitePool> {
        self.pool.read().await.as_ref().cloned().ok_or(CachetteError::Closed)
    }
}

#[async_trait]
impl SecretRepository for SqliteRepository {
    async fn init(&self) -> Result<()> {
        let options = SqliteConnectOptions::from_str(&self.url)
            .map_err(|e| {
                CachetteError::connection_with_source(
                    format!("invalid SQLite connection string '{}'", self.url),
                    Box::new(e),
                )
            })?
            .create_if_missing(true);

        // in-memory databases exist per connection, so keep the pool at one
        let max_connections = if self.url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to open SQLite database");
                CachetteError::connection_with_source("failed to open SQLite database", Box::new(e))
            })?;

        sqlx::query(SCHEMA).execute(&pool).await.map_err(|e| {
            CachetteError::connection_with_source("failed to apply secrets schema", Box::new(e))
        })?;

        let mut guard = self.pool.write().await;
        *guard = Some(pool);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        let pool = self.pool().await?;
        sqlx::query("SELECT 1").execute(&pool).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.pool.write().await;
        if let Some(pool) = guard.take() {
            pool.close().await;
        }
        Ok(())
    }

    async fn create(&self, body: String, meta: HashMap<String, String>) -> Result<Secret> {
        let pool = self.pool().await?;
        let secret = Secret::new(Uuid::new_v4().to_string(), body, meta, Utc::now());
        let document = SecretDocument { body: secret.body.clone(), meta: secret.meta.clone() };
        let encoded = serde_json::to_string(&document)
            .map_err(|e| CachetteError::internal(format!("failed to encode secret: {}", e)))?;

        sqlx::query("INSERT INTO secrets (id, document, created_at) VALUES (?, ?, ?)")
            .bind(&secret.id)
            .bind(&encoded)
            .bind(secret.created_at.timestamp_millis())
            .execute(&pool)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, secret_id = %secret.id, "failed to insert secret");
                CachetteError::from(e)
            })?;

        Ok(secret)
    }

    async fn find_by_id(&self, id: &str) -> Result<Secret> {
        let pool = self.pool().await?;
        let row = sqlx::query_as::<_, DocumentRow>(
            "SELECT id, document, created_at FROM secrets WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&pool)
        .await?;

        match row {
            Some(row) => {
                let secret = row.into_secret()?;
                if secret.expired() {
                    return Err(CachetteError::not_found(id));
                }
                Ok(secret)
            }
            None => Err(CachetteError::not_found(id)),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let pool = self.pool().await?;
        let result = sqlx::query("DELETE FROM secrets WHERE id = ?").bind(id).execute(&pool).await?;
        if result.rows_affected() == 0 {
            return Err(CachetteError::not_found(id));
        }
        Ok(())
    }

    async fn prune(&self) -> Result<()> {
        let pool = self.pool().await?;
        let cutoff = (Utc::now() - ttl()).timestamp_millis();
        let result =
            sqlx::query("DELETE FROM secrets WHERE created_at < ?").bind(cutoff).execute(&pool).await?;
        tracing::debug!(pruned = result.rows_affected(), "pruned expired secrets");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn repo() -> SqliteRepository {
        let repo = SqliteRepository::new("sqlite::memory:".to_string());
        repo.init().await.unwrap();
        repo
    }

    #[tokio::test]
    async fn test_create_then_find() {
        let repo = repo().await;
        let mut meta = HashMap::new();
        meta.insert("a".to_string(), "b".to_string());

        let created = repo.create("hello".to_string(), meta).await.unwrap();
        assert!(!created.id.is_empty());
        assert_eq!(created.expire_at - created.created_at, ttl());

        let found = repo.find_by_id(&created.id).await.unwrap();
        assert_eq!(found.id, created.id);
        assert_eq!(found.body, "hello");
        assert_eq!(found.meta.get("a").map(String::as_str), Some("b"));
        // created_at is persisted at millisecond granularity
        assert_eq!(found.created_at.timestamp_millis(), created.created_at.timestamp_millis());
    }

    #[tokio::test]
    async fn test_find_unknown_id() {
        let repo = repo().await;
        assert!(repo.find_by_id("no-such-id").await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_delete() {
        let repo = repo().await;
        let created = repo.create("gone soon".to_string(), HashMap::new()).await.unwrap();
        repo.delete_by_id(&created.id).await.unwrap();
        assert!(repo.find_by_id(&created.id).await.unwrap_err().is_not_found());
        assert!(repo.delete_by_id(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_expired_row_invisible_and_pruned() {
        let repo = repo().await;
        let created = repo.create("stale".to_string(), HashMap::new()).await.unwrap();
        let fresh = repo.create("fresh".to_string(), HashMap::new()).await.unwrap();

        // backdate the row past the TTL, below the public API
        let pool = repo.pool().await.unwrap();
        let backdated = (Utc::now() - ttl() - chrono::Duration::minutes(1)).timestamp_millis();
        sqlx::query("UPDATE secrets SET created_at = ? WHERE id = ?")
            .bind(backdated)
            .bind(&created.id)
            .execute(&pool)
            .await
            .unwrap();

        assert!(repo.find_by_id(&created.id).await.unwrap_err().is_not_found());

        repo.prune().await.unwrap();
        let remaining: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM secrets WHERE id = ?")
            .bind(&created.id)
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(remaining, 0);
        assert!(repo.find_by_id(&fresh.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_operations_after_close() {
        let repo = repo().await;
        repo.close().await.unwrap();
        assert!(matches!(repo.ping().await.unwrap_err(), CachetteError::Closed));
        assert!(matches!(repo.find_by_id("x").await.unwrap_err(), CachetteError::Closed));
    }
}
