//! Background pruning scheduler.
//!
//! On each tick the scheduler pings the service first; transient backend
//! unavailability skips that cycle's prune instead of failing the loop. The
//! only exit is cooperative cancellation, checked between cycles, so an
//! in-flight prune always runs to completion.

use std::sync::Arc;
use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::services::SecretService;

/// Deadline for each ping/prune call inside a cycle.
const SWEEP_TIMEOUT: Duration = Duration::from_secs(5);

/// Periodic timer invoking prune (guarded by ping) on a fixed interval.
pub struct PruneScheduler {
    service: Arc<SecretService>,
    interval: Duration,
}

impl PruneScheduler {
    pub fn new(service: Arc<SecretService>, interval: Duration) -> Self {
        Self { service, interval }
    }

    /// Run until the token is canceled.
    pub async fn run(self, cancel: CancellationToken) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // consume the immediate first tick so the first sweep happens one
        // full interval after startup
        ticker.tick().await;

        tracing::debug!(interval_seconds = self.interval.as_secs(), "prune scheduler started");
        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!("prune scheduler stopped");
                    return;
                }
                _ = ticker.tick() => {
                    self.sweep().await;
                }
            }
        }
    }

    async fn sweep(&self) {
        match tokio::time::timeout(SWEEP_TIMEOUT, self.service.ping()).await {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                tracing::warn!(error = %err, "service ping failed, skipping prune cycle");
                return;
            }
            Err(_) => {
                tracing::warn!("service ping timed out, skipping prune cycle");
                return;
            }
        }

        match tokio::time::timeout(SWEEP_TIMEOUT, self.service.prune()).await {
            Ok(Ok(())) => tracing::debug!("expired secrets pruned"),
            Ok(Err(err)) => tracing::error!(error = %err, "prune failed"),
            Err(_) => tracing::error!("prune timed out"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::domain::Secret;
    use crate::errors::{CachetteError, Result};
    use crate::storage::SecretRepository;

    #[derive(Default)]
    struct StubRepository {
        ping_ok: AtomicBool,
        pings: AtomicUsize,
        prunes: AtomicUsize,
    }

    #[async_trait]
    impl SecretRepository for StubRepository {
        async fn init(&self) -> Result<()> {
            Ok(())
        }

        async fn ping(&self) -> Result<()> {
            self.pings.fetch_add(1, Ordering::SeqCst);
            if self.ping_ok.load(Ordering::SeqCst) {
                Ok(())
            } else {
                Err(CachetteError::connection("stub backend offline"))
            }
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }

        async fn create(&self, _body: String, _meta: HashMap<String, String>) -> Result<Secret> {
            unimplemented!("not exercised by the scheduler")
        }

        async fn find_by_id(&self, id: &str) -> Result<Secret> {
            Err(CachetteError::not_found(id))
        }

        async fn delete_by_id(&self, id: &str) -> Result<()> {
            Err(CachetteError::not_found(id))
        }

        async fn prune(&self) -> Result<()> {
            self.prunes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn scheduler(repo: Arc<StubRepository>, interval: Duration) -> PruneScheduler {
        PruneScheduler::new(Arc::new(SecretService::new(repo)), interval)
    }

    #[tokio::test]
    async fn test_prunes_while_backend_healthy() {
        let repo = Arc::new(StubRepository::default());
        repo.ping_ok.store(true, Ordering::SeqCst);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(scheduler(repo.clone(), Duration::from_millis(10)).run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        task.await.unwrap();

        assert!(repo.pings.load(Ordering::SeqCst) >= 1);
        assert!(repo.prunes.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_failed_ping_skips_prune() {
        let repo = Arc::new(StubRepository::default());
        repo.ping_ok.store(false, Ordering::SeqCst);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(scheduler(repo.clone(), Duration::from_millis(10)).run(cancel.clone()));

        tokio::time::sleep(Duration::from_millis(100)).await;
        cancel.cancel();
        task.await.unwrap();

        assert!(repo.pings.load(Ordering::SeqCst) >= 1);
        assert_eq!(repo.prunes.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_cancellation_stops_the_loop() {
        let repo = Arc::new(StubRepository::default());
        repo.ping_ok.store(true, Ordering::SeqCst);

        let cancel = CancellationToken::new();
        let task = tokio::spawn(scheduler(repo.clone(), Duration::from_secs(3600)).run(cancel.clone()));

        cancel.cancel();
        // joins promptly even though the next tick is an hour away
        tokio::time::timeout(Duration::from_secs(1), task).await.unwrap().unwrap();
    }
}
