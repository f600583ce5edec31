//! Background reclamation of expired guard entries.
//!
//! The guard evaluates expiry lazily on every scan, so the sweeper never
//! affects admission semantics; it only keeps the per-identity map from
//! growing with abandoned cooldowns over a long election day.

use crate::service::ElectionService;
use crate::shutdown::ShutdownHandle;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{debug, info};
use veilvote_types::VeilvoteResult;

pub struct CooldownSweeper {
    service: Arc<ElectionService>,
}

impl CooldownSweeper {
    pub fn new(service: Arc<ElectionService>) -> Self {
        Self { service }
    }

    pub async fn run(&self, mut shutdown: ShutdownHandle) -> VeilvoteResult<()> {
        let mut ticker = interval(Duration::from_millis(self.service.sweep_interval_ms()));
        info!("Cooldown sweeper running");

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let purged = self.service.purge_expired().await;
                    if purged > 0 {
                        debug!("Sweeper reclaimed {} guard entries", purged);
                    }
                }
                _ = shutdown.wait() => {
                    info!("Cooldown sweeper shutting down");
                    break;
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::config::GuardConfig;
    use crate::shutdown::shutdown_channel;
    use veilvote_types::DEFAULT_COOLDOWN_MS;

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_reclaims_expired_entries() {
        let clock = Arc::new(ManualClock::new(1_000));
        let service = Arc::new(
            ElectionService::with_clock(GuardConfig::default(), clock.clone()).unwrap(),
        );

        service.process_scan("42").await.unwrap();
        assert_eq!(service.guard_entries().await, 1);

        let (shutdown_tx, handle) = shutdown_channel();
        let sweeper = CooldownSweeper::new(service.clone());
        let task = tokio::spawn(async move { sweeper.run(handle).await });

        // Session still live: sweeping must not touch it.
        tokio::time::advance(Duration::from_millis(15_000)).await;
        tokio::task::yield_now().await;
        assert_eq!(service.guard_entries().await, 1);

        // Lapse the session, then let the next tick fire.
        clock.advance(DEFAULT_COOLDOWN_MS + 1);
        tokio::time::advance(Duration::from_millis(15_000)).await;
        tokio::task::yield_now().await;
        assert_eq!(service.guard_entries().await, 0);

        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown() {
        let service = Arc::new(ElectionService::new(GuardConfig::default()).unwrap());
        let (shutdown_tx, handle) = shutdown_channel();
        let sweeper = CooldownSweeper::new(service);

        let task = tokio::spawn(async move { sweeper.run(handle).await });
        shutdown_tx.send(true).unwrap();
        task.await.unwrap().unwrap();
    }
}
