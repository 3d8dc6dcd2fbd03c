//! Business-logic façade over a [`SecretRepository`].
//!
//! Every method forwards to the repository inside a tracing span and
//! propagates the repository's result unchanged: the NotFound/Connection
//! taxonomy is never re-mapped here, only annotated with trace events.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::instrument;

use crate::domain::Secret;
use crate::errors::Result;
use crate::storage::SecretRepository;

/// Single entry point for secret business operations.
pub struct SecretService {
    repo: Arc<dyn SecretRepository>,
    ready: AtomicBool,
}

impl SecretService {
    pub fn new(repo: Arc<dyn SecretRepository>) -> Self {
        Self { repo, ready: AtomicBool::new(false) }
    }

    /// Liveness flag toggled by startup/watchdog collaborators. Does not
    /// gate any operation at this layer.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Relaxed)
    }

    pub fn set_ready(&self, ready: bool) {
        self.ready.store(ready, Ordering::Relaxed);
    }

    /// Verify the repository (and everything the service depends on) is
    /// reachable.
    #[instrument(skip(self), name = "service_ping")]
    pub async fn ping(&self) -> Result<()> {
        match self.repo.ping().await {
            Ok(()) => {
                tracing::debug!("repository is online");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "repository ping failed");
                Err(err)
            }
        }
    }

    /// Create a new secret.
    #[instrument(skip(self, body, meta), name = "service_create")]
    pub async fn create(&self, body: String, meta: HashMap<String, String>) -> Result<Secret> {
        match self.repo.create(body, meta).await {
            Ok(secret) => {
                tracing::debug!(secret_id = %secret.id, "secret created");
                Ok(secret)
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to create secret");
                Err(err)
            }
        }
    }

    /// Find a secret by identifier; absent and expired records both surface
    /// as NotFound.
    #[instrument(skip(self), name = "service_find_by_id")]
    pub async fn find_by_id(&self, id: &str) -> Result<Secret> {
        match self.repo.find_by_id(id).await {
            Ok(secret) => {
                tracing::debug!(secret_id = %secret.id, "secret found");
                Ok(secret)
            }
            Err(err) => {
                if err.is_not_found() {
                    tracing::debug!(secret_id = %id, "secret not found");
                } else {
                    tracing::error!(error = %err, secret_id = %id, "failed to find secret");
                }
                Err(err)
            }
        }
    }

    /// Delete a secret by identifier.
    #[instrument(skip(self), name = "service_delete_by_id")]
    pub async fn delete_by_id(&self, id: &str) -> Result<()> {
        match self.repo.delete_by_id(id).await {
            Ok(()) => {
                tracing::debug!(secret_id = %id, "secret deleted");
                Ok(())
            }
            Err(err) => {
                if err.is_not_found() {
                    tracing::debug!(secret_id = %id, "secret not found");
                } else {
                    tracing::error!(error = %err, secret_id = %id, "failed to delete secret");
                }
                Err(err)
            }
        }
    }

    /// Bulk-remove all expired secrets.
    #[instrument(skip(self), name = "service_prune")]
    pub async fn prune(&self) -> Result<()> {
        match self.repo.prune().await {
            Ok(()) => {
                tracing::debug!("expired secrets pruned");
                Ok(())
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to prune expired secrets");
                Err(err)
            }
        }
    }

    /// Release the underlying repository. Call at most once during shutdown.
    #[instrument(skip(self), name = "service_close")]
    pub async fn close(&self) -> Result<()> {
        self.repo.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRepository;

    async fn service() -> SecretService {
        let repo = Arc::new(MemoryRepository::new());
        repo.init().await.unwrap();
        SecretService::new(repo)
    }

    #[tokio::test]
    async fn test_errors_propagate_unchanged() {
        let service = service().await;
        let err = service.find_by_id("missing").await.unwrap_err();
        assert!(err.is_not_found());

        let err = service.delete_by_id("missing").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_round_trip_through_service() {
        let service = service().await;
        let mut meta = HashMap::new();
        meta.insert("a".to_string(), "b".to_string());

        let created = service.create("hello".to_string(), meta).await.unwrap();
        let found = service.find_by_id(&created.id).await.unwrap();
        assert_eq!(found, created);

        service.delete_by_id(&created.id).await.unwrap();
        assert!(service.find_by_id(&created.id).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_ready_flag_gates_nothing() {
        let service = service().await;
        assert!(!service.is_ready());
        // operations work regardless of the flag
        service.ping().await.unwrap();
        service.set_ready(true);
        assert!(service.is_ready());
        service.set_ready(false);
        assert!(!service.is_ready());
    }
}
