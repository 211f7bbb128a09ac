use thiserror::Error;

use crate::persistence::DatabaseError;

/// Network-level failure while fetching a tracked page.
///
/// These are recovered locally by the fetch worker and recorded as a failed
/// outcome; they never terminate the scheduler loop.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("unexpected HTTP status: {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Failure while delivering a notification for an alert.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Errors surfaced by the monitoring entry points.
///
/// Store errors propagate to the cycle level where the scheduler applies its
/// backoff; everything else is a per-call condition.
#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("item not found: {0}")]
    ItemNotFound(String),

    #[error("item is not active: {0}")]
    ItemInactive(String),

    #[error("invalid item state: {0}")]
    InvalidItem(String),

    #[error("store error: {0}")]
    Store(#[from] DatabaseError),
}
