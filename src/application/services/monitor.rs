//! Monitor Service
//!
//! The fetch worker and batch fan-out at the heart of the monitoring core:
//! retrieve a tracked item's page, extract a price, persist the observation,
//! and evaluate alerts. Network and extraction failures become a failed
//! outcome for that item; only store failures propagate to the caller.

use std::sync::Arc;

use futures_util::future;
use serde::Serialize;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::MonitorConfig;
use crate::domain::entities::alert::AlertKind;
use crate::domain::entities::tracked_item::TrackedItem;
use crate::domain::errors::MonitorError;
use crate::domain::services::evaluator::AlertEvaluator;
use crate::domain::services::extractor::PriceExtractor;
use crate::infrastructure::fetcher::PageFetcher;
use crate::persistence::models::{CreateAlert, ItemRecord};
use crate::persistence::repository::{AlertRepository, ItemRepository};
use crate::persistence::DbPool;

/// Source tag recorded with every price sample.
const SAMPLE_SOURCE: &str = "web_scraper";

/// Result of checking a single tracked item.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum FetchOutcome {
    Checked {
        price: f64,
        alert: Option<AlertKind>,
    },
    Failed {
        reason: String,
    },
}

/// Summary of one pass over all active items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BatchReport {
    pub succeeded: usize,
    pub failed: usize,
    pub alerts_raised: usize,
}

/// Context object owning the store, fetcher, and evaluation components.
///
/// Constructed once at startup and shared via `Arc`; there are no
/// process-wide singletons.
pub struct MonitorService {
    items: ItemRepository,
    alerts: AlertRepository,
    fetcher: Arc<dyn PageFetcher>,
    extractor: PriceExtractor,
    evaluator: AlertEvaluator,
    max_concurrent_fetches: usize,
}

impl MonitorService {
    pub fn new(pool: DbPool, fetcher: Arc<dyn PageFetcher>, config: &MonitorConfig) -> Self {
        let evaluator = match AlertEvaluator::new(config.price_drop_threshold) {
            Ok(evaluator) => evaluator,
            Err(e) => {
                warn!("{}, using default threshold", e);
                AlertEvaluator::default()
            }
        };

        MonitorService {
            items: ItemRepository::new(pool.clone()),
            alerts: AlertRepository::new(pool),
            fetcher,
            extractor: PriceExtractor::default(),
            evaluator,
            max_concurrent_fetches: config.max_concurrent_fetches,
        }
    }

    /// Check a single item on demand (the manual "scrape now" trigger).
    pub async fn monitor_one(&self, item_id: &str) -> Result<FetchOutcome, MonitorError> {
        let record = self
            .items
            .get(item_id)
            .await?
            .ok_or_else(|| MonitorError::ItemNotFound(item_id.to_string()))?;

        if !record.is_active {
            return Err(MonitorError::ItemInactive(item_id.to_string()));
        }

        self.check_item(&record).await
    }

    /// Check every active item, fanning out fetches with bounded concurrency.
    ///
    /// Per-item failures are isolated: a batch never aborts because one item
    /// failed, and zero active items is an empty report, not an error.
    pub async fn monitor_all_active(self: Arc<Self>) -> Result<BatchReport, MonitorError> {
        let records = self.items.list_active().await?;
        if records.is_empty() {
            return Ok(BatchReport::default());
        }

        info!("Checking {} active items", records.len());
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_fetches));

        let mut handles = Vec::with_capacity(records.len());
        for record in records {
            let permit = semaphore.clone().acquire_owned();
            let service = Arc::clone(&self);

            handles.push(tokio::spawn(async move {
                let _permit = match permit.await {
                    Ok(permit) => permit,
                    Err(_) => {
                        return FetchOutcome::Failed {
                            reason: "concurrency limiter closed".to_string(),
                        }
                    }
                };

                match service.check_item(&record).await {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        // Store failure on one item; the rest of the batch continues
                        error!("Store failure while checking {}: {}", record.id, e);
                        FetchOutcome::Failed {
                            reason: e.to_string(),
                        }
                    }
                }
            }));
        }

        let mut report = BatchReport::default();
        for result in future::join_all(handles).await {
            match result {
                Ok(FetchOutcome::Checked { alert, .. }) => {
                    report.succeeded += 1;
                    if alert.is_some() {
                        report.alerts_raised += 1;
                    }
                }
                Ok(FetchOutcome::Failed { .. }) => report.failed += 1,
                Err(e) => {
                    error!("Fetch task panicked: {}", e);
                    report.failed += 1;
                }
            }
        }

        info!(
            "Cycle report: {} succeeded, {} failed, {} alerts raised",
            report.succeeded, report.failed, report.alerts_raised
        );
        Ok(report)
    }

    /// Fetch, extract, persist, and evaluate one item.
    async fn check_item(&self, record: &ItemRecord) -> Result<FetchOutcome, MonitorError> {
        let item = TrackedItem::try_from(record).map_err(MonitorError::InvalidItem)?;

        let body = match self.fetcher.fetch(&item.url).await {
            Ok(body) => body,
            Err(e) => {
                warn!("Fetch failed for {} ({}): {}", item.name, item.url, e);
                return Ok(FetchOutcome::Failed {
                    reason: e.to_string(),
                });
            }
        };

        let price = match self.extractor.extract(&body) {
            Some(price) => price,
            None => {
                // Current price stays untouched when extraction fails
                warn!("No price found for {} ({})", item.name, item.url);
                return Ok(FetchOutcome::Failed {
                    reason: "no price found".to_string(),
                });
            }
        };

        let alert = self
            .evaluator
            .evaluate(item.current_price, price, item.target_price);

        self.items
            .record_observation(&item.id, price.value(), SAMPLE_SOURCE)
            .await?;

        if let Some(kind) = alert {
            let message = kind.message_for(&item.name, price);
            info!("Alert for {}: {}", item.id, message);
            self.alerts
                .create(CreateAlert {
                    item_id: item.id.clone(),
                    kind,
                    message,
                })
                .await?;
        }

        Ok(FetchOutcome::Checked {
            price: price.value(),
            alert,
        })
    }
}
