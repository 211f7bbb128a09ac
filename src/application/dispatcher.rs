//! Alert Dispatcher
//!
//! Polls for alerts the monitor has persisted but nobody has delivered yet,
//! hands each to the configured notifier, and marks it sent only when
//! delivery succeeds. Failed deliveries stay unsent and are retried on the
//! next pass.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::infrastructure::notifier::Notifier;
use crate::persistence::repository::AlertRepository;
use crate::persistence::{DatabaseError, DbPool};

/// Upper bound on alerts handled per pass.
const DISPATCH_BATCH_SIZE: i64 = 50;

pub struct AlertDispatcher {
    alerts: AlertRepository,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
}

impl AlertDispatcher {
    pub fn new(pool: DbPool, notifier: Arc<dyn Notifier>, config: &MonitorConfig) -> Self {
        AlertDispatcher {
            alerts: AlertRepository::new(pool),
            notifier,
            poll_interval: config.dispatch_interval(),
        }
    }

    /// Poll until shutdown is signalled.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        info!(
            "Alert dispatcher started (polling every {:?})",
            self.poll_interval
        );

        loop {
            match self.dispatch_pending().await {
                Ok(0) => {}
                Ok(delivered) => info!("Delivered {} alerts", delivered),
                Err(e) => error!("Alert dispatch pass failed: {}", e),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = shutdown.changed() => {
                    info!("Alert dispatcher shutting down");
                    return;
                }
            }
        }
    }

    /// Deliver pending alerts, returning how many went out.
    pub async fn dispatch_pending(&self) -> Result<usize, DatabaseError> {
        let pending = self.alerts.unsent(DISPATCH_BATCH_SIZE).await?;
        let mut delivered = 0;

        for alert in pending {
            match self.notifier.notify(&alert).await {
                Ok(()) => {
                    self.alerts.mark_sent(alert.id).await?;
                    delivered += 1;
                }
                Err(e) => {
                    warn!("Failed to deliver alert {}: {}", alert.id, e);
                }
            }
        }

        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::alert::AlertKind;
    use crate::domain::errors::NotifyError;
    use crate::persistence::init_database;
    use crate::persistence::models::{AlertRecord, CreateAlert, CreateItem};
    use crate::persistence::repository::ItemRepository;
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct RecordingNotifier {
        delivered: Mutex<Vec<String>>,
        fail: bool,
    }

    impl RecordingNotifier {
        fn new(fail: bool) -> Self {
            RecordingNotifier {
                delivered: Mutex::new(Vec::new()),
                fail,
            }
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn notify(&self, alert: &AlertRecord) -> Result<(), NotifyError> {
            if self.fail {
                return Err(NotifyError::Delivery("smtp unavailable".to_string()));
            }
            self.delivered.lock().unwrap().push(alert.message.clone());
            Ok(())
        }
    }

    async fn seeded_pool() -> DbPool {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let items = ItemRepository::new(pool.clone());
        items
            .create(CreateItem {
                id: "item-1".to_string(),
                name: "Mechanical Keyboard".to_string(),
                url: "https://shop.example.com/p/keyboard".to_string(),
                target_price: 100.0,
                owner: "user-1".to_string(),
            })
            .await
            .unwrap();

        let alerts = AlertRepository::new(pool.clone());
        alerts
            .create(CreateAlert {
                item_id: "item-1".to_string(),
                kind: AlertKind::TargetReached,
                message: "Target price reached! Mechanical Keyboard is now $95.00".to_string(),
            })
            .await
            .unwrap();

        pool
    }

    #[tokio::test]
    async fn test_dispatch_marks_delivered_alerts_sent() {
        let pool = seeded_pool().await;
        let notifier = Arc::new(RecordingNotifier::new(false));
        let dispatcher =
            AlertDispatcher::new(pool.clone(), notifier.clone(), &MonitorConfig::default());

        let delivered = dispatcher.dispatch_pending().await.unwrap();
        assert_eq!(delivered, 1);
        assert_eq!(notifier.delivered.lock().unwrap().len(), 1);

        // Nothing left for the next pass
        assert_eq!(dispatcher.dispatch_pending().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_failed_delivery_stays_unsent() {
        let pool = seeded_pool().await;
        let dispatcher = AlertDispatcher::new(
            pool.clone(),
            Arc::new(RecordingNotifier::new(true)),
            &MonitorConfig::default(),
        );

        let delivered = dispatcher.dispatch_pending().await.unwrap();
        assert_eq!(delivered, 0);

        let alerts = AlertRepository::new(pool);
        assert_eq!(alerts.unsent(10).await.unwrap().len(), 1);
    }
}
