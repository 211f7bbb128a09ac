use url::Url;

use crate::domain::value_objects::price::Price;

/// A product being monitored at an external URL.
///
/// The target price must be strictly positive; the current price is absent
/// until the first successful fetch. Price and last-checked fields are
/// mutated only by the fetch worker; URL, target, and active flag belong to
/// the external CRUD collaborator.
#[derive(Debug, Clone)]
pub struct TrackedItem {
    pub id: String,
    pub name: String,
    pub url: String,
    pub target_price: Price,
    pub current_price: Option<Price>,
    pub is_active: bool,
}

impl TrackedItem {
    pub fn new(
        id: String,
        name: String,
        url: String,
        target_price: f64,
        current_price: Option<f64>,
        is_active: bool,
    ) -> Result<Self, String> {
        if target_price <= 0.0 {
            return Err("Target price must be positive".to_string());
        }
        Url::parse(&url).map_err(|e| format!("Invalid item URL '{}': {}", url, e))?;

        let target_price = Price::new(target_price)?;
        let current_price = match current_price {
            Some(value) => Some(Price::new(value)?),
            None => None,
        };

        Ok(TrackedItem {
            id,
            name,
            url,
            target_price,
            current_price,
            is_active,
        })
    }
}
