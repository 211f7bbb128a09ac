use serde::{Deserialize, Serialize};

use crate::domain::value_objects::price::Price;

/// Kind of notification-worthy event produced by alert evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    TargetReached,
    PriceDrop,
}

impl AlertKind {
    /// Stable tag stored in the alerts table.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertKind::TargetReached => "target_reached",
            AlertKind::PriceDrop => "price_drop",
        }
    }

    /// Human-readable alert message naming the item and the new price.
    pub fn message_for(&self, item_name: &str, price: Price) -> String {
        match self {
            AlertKind::TargetReached => {
                format!("Target price reached! {} is now ${}", item_name, price)
            }
            AlertKind::PriceDrop => {
                format!("Significant price drop! {} dropped to ${}", item_name, price)
            }
        }
    }
}
