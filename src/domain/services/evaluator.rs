use crate::domain::entities::alert::AlertKind;
use crate::domain::value_objects::price::Price;

/// Decides whether a newly observed price warrants an alert.
///
/// Rules are checked in order and the first match wins, so a single
/// evaluation never produces more than one alert:
/// 1. new price at or below the target → `TargetReached`
/// 2. new price strictly below `old * (1 - threshold)` → `PriceDrop`
/// 3. otherwise none
#[derive(Debug, Clone)]
pub struct AlertEvaluator {
    price_drop_threshold: f64,
}

impl Default for AlertEvaluator {
    fn default() -> Self {
        AlertEvaluator {
            price_drop_threshold: 0.10,
        }
    }
}

impl AlertEvaluator {
    pub fn new(price_drop_threshold: f64) -> Result<Self, String> {
        if !(price_drop_threshold > 0.0 && price_drop_threshold < 1.0) {
            return Err(format!(
                "Price drop threshold must be in (0, 1), got {}",
                price_drop_threshold
            ));
        }
        Ok(AlertEvaluator {
            price_drop_threshold,
        })
    }

    pub fn evaluate(
        &self,
        old_price: Option<Price>,
        new_price: Price,
        target_price: Price,
    ) -> Option<AlertKind> {
        if new_price.value() <= target_price.value() {
            return Some(AlertKind::TargetReached);
        }

        if let Some(old) = old_price {
            if new_price.value() < old.value() * (1.0 - self.price_drop_threshold) {
                return Some(AlertKind::PriceDrop);
            }
        }

        None
    }
}
