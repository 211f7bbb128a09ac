//! Notifier
//!
//! Delivery capability for alert events. The monitoring core only persists
//! alerts; the dispatcher hands them to a `Notifier`, and transport details
//! (email, Slack, webhooks) live behind this trait.

use async_trait::async_trait;
use tracing::info;

use crate::domain::errors::NotifyError;
use crate::persistence::models::AlertRecord;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, alert: &AlertRecord) -> Result<(), NotifyError>;
}

/// Notifier that writes alerts to the log instead of an external channel.
/// Useful as a default and in development.
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, alert: &AlertRecord) -> Result<(), NotifyError> {
        info!("[{}] {}", alert.kind, alert.message);
        Ok(())
    }
}
