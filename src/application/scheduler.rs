//! Monitor Scheduler
//!
//! Long-lived background loop that runs one monitoring cycle per interval.
//! A cycle that fails at the listing level (store unavailable) is retried
//! after a shorter backoff instead of the steady-state period; nothing a
//! cycle does can terminate the loop. Graceful shutdown is signalled through
//! a watch channel and takes effect once the in-flight cycle finishes.
//!
//! A single scheduler instance is assumed: running several against one store
//! would duplicate fetches.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info};

use crate::application::services::monitor::MonitorService;
use crate::config::MonitorConfig;

pub struct Scheduler {
    monitor: Arc<MonitorService>,
    cycle_interval: Duration,
    error_backoff: Duration,
}

impl Scheduler {
    pub fn new(monitor: Arc<MonitorService>, config: &MonitorConfig) -> Self {
        Scheduler {
            monitor,
            cycle_interval: config.cycle_interval(),
            error_backoff: config.error_backoff(),
        }
    }

    /// Run cycles until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Monitor scheduler started (cycle every {:?}, backoff {:?})",
            self.cycle_interval, self.error_backoff
        );

        loop {
            let cycle_ok = match self.monitor.clone().monitor_all_active().await {
                Ok(_report) => true,
                Err(e) => {
                    error!("Monitor cycle failed: {}", e);
                    false
                }
            };

            let delay = self.next_delay(cycle_ok);
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = shutdown.changed() => {
                    info!("Monitor scheduler shutting down");
                    return;
                }
            }
        }
    }

    /// Steady-state interval after a clean cycle, shorter backoff after a
    /// cycle-level failure.
    fn next_delay(&self, cycle_ok: bool) -> Duration {
        if cycle_ok {
            self.cycle_interval
        } else {
            self.error_backoff
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::errors::FetchError;
    use crate::infrastructure::fetcher::PageFetcher;
    use crate::persistence::init_database;
    use async_trait::async_trait;

    struct UnreachableFetcher;

    #[async_trait]
    impl PageFetcher for UnreachableFetcher {
        async fn fetch(&self, _url: &str) -> Result<String, FetchError> {
            Err(FetchError::Connect("connection refused".to_string()))
        }
    }

    async fn test_scheduler() -> Scheduler {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let config = MonitorConfig::default();
        let monitor = Arc::new(MonitorService::new(
            pool,
            Arc::new(UnreachableFetcher),
            &config,
        ));
        Scheduler::new(monitor, &config)
    }

    #[tokio::test]
    async fn test_backoff_is_shorter_than_cycle_interval() {
        let scheduler = test_scheduler().await;
        assert_eq!(scheduler.next_delay(true), Duration::from_secs(3600));
        assert_eq!(scheduler.next_delay(false), Duration::from_secs(300));
        assert!(scheduler.next_delay(false) < scheduler.next_delay(true));
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown_signal() {
        let scheduler = test_scheduler().await;
        let (tx, rx) = watch::channel(false);

        let handle = tokio::spawn(async move { scheduler.run(rx).await });

        // Signal shutdown while the scheduler sleeps between cycles
        tokio::time::sleep(Duration::from_millis(50)).await;
        tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("scheduler did not stop after shutdown signal")
            .unwrap();
    }
}
