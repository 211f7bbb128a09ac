//! Database Models
//!
//! Persistent data structures for tracked items, price samples, and alerts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::domain::entities::alert::AlertKind;
use crate::domain::entities::tracked_item::TrackedItem;

/// Tracked item record in database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ItemRecord {
    pub id: String,
    pub name: String,
    pub url: String,
    pub target_price: f64,
    pub current_price: Option<f64>,
    pub is_active: bool,
    pub owner: String,
    pub created_at: DateTime<Utc>,
    pub last_checked: Option<DateTime<Utc>>,
}

impl TryFrom<&ItemRecord> for TrackedItem {
    type Error = String;

    fn try_from(record: &ItemRecord) -> Result<Self, Self::Error> {
        TrackedItem::new(
            record.id.clone(),
            record.name.clone(),
            record.url.clone(),
            record.target_price,
            record.current_price,
            record.is_active,
        )
    }
}

/// Price sample record in database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct PriceSampleRecord {
    pub id: i64,
    pub item_id: String,
    pub price: f64,
    pub source: String,
    pub sampled_at: DateTime<Utc>,
}

/// Alert record in database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AlertRecord {
    pub id: i64,
    pub item_id: String,
    pub kind: String, // "target_reached" or "price_drop"
    pub message: String,
    pub is_sent: bool,
    pub created_at: DateTime<Utc>,
}

/// Create item input
#[derive(Debug, Clone)]
pub struct CreateItem {
    pub id: String,
    pub name: String,
    pub url: String,
    pub target_price: f64,
    pub owner: String,
}

/// Create alert input
#[derive(Debug, Clone)]
pub struct CreateAlert {
    pub item_id: String,
    pub kind: AlertKind,
    pub message: String,
}
