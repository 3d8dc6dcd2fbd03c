//! In-process map backend.
//!
//! A single read-write lock guards the whole map: reads take the read lock,
//! writes and prune take the write lock. `close` drops the map under the
//! write lock; any operation after that observes `None` and fails with a
//! closed-repository error instead of panicking.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::Secret;
use crate::errors::{CachetteError, Result};
use crate::storage::SecretRepository;

/// Secret repository storing everything in process memory. Contents are lost
/// on restart.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    data: RwLock<Option<HashMap<String, Secret>>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inject a secret as-is, bypassing the creation clock. Test hook for
    /// backdated records.
    #[cfg(test)]
    async fn insert_raw(&self, secret: Secret) -> Result<()> {
        let mut guard = self.data.write().await;
        let data = guard.as_mut().ok_or(CachetteError::Closed)?;
        data.insert(secret.id.clone(), secret);
        Ok(())
    }

    /// Direct map lookup ignoring expiry, for verifying physical removal.
    #[cfg(test)]
    async fn contains_raw(&self, id: &str) -> bool {
        self.data.read().await.as_ref().map(|data| data.contains_key(id)).unwrap_or(false)
    }
}

#[async_trait]
impl SecretRepository for MemoryRepository {
    async fn init(&self) -> Result<()> {
        let mut guard = self.data.write().await;
        *guard = Some(HashMap::new());
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        match self.data.read().await.as_ref() {
            Some(_) => Ok(()),
            None => Err(CachetteError::Closed),
        }
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.data.write().await;
        *guard = None;
        Ok(())
    }

    async fn create(&self, body: String, meta: HashMap<String, String>) -> Result<Secret> {
        let mut guard = self.data.write().await;
        let data = guard.as_mut().ok_or(CachetteError::Closed)?;
        let secret = Secret::new(Uuid::new_v4().to_string(), body, meta, Utc::now());
        data.insert(secret.id.clone(), secret.clone());
        Ok(secret)
    }

    async fn find_by_id(&self, id: &str) -> Result<Secret> {
        let guard = self.data.read().await;
        let data = guard.as_ref().ok_or(CachetteError::Closed)?;
        match data.get(id) {
            Some(secret) if !secret.expired() => Ok(secret.clone()),
            _ => Err(CachetteError::not_found(id)),
        }
    }

    async fn delete_by_id(&self, id: &str) -> Result<()> {
        let mut guard = self.data.write().await;
        let data = guard.as_mut().ok_or(CachetteError::Closed)?;
        match data.remove(id) {
            Some(_) => Ok(()),
            None => Err(CachetteError::not_found(id)),
        }
    }

    async fn prune(&self) -> Result<()> {
        let now = Utc::now();
        let mut guard = self.data.write().await;
        let data = guard.as_mut().ok_or(CachetteError::Closed)?;
        data.retain(|_, secret| !secret.is_expired_at(now));
        Ok(())
    }
}
