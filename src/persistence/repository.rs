//! Database Repository
//!
//! Data access layer for tracked items, price samples, and alerts.

use super::models::*;
use super::{DatabaseError, DbPool};
use chrono::{DateTime, Utc};
use tracing::{debug, error};

/// Tracked item repository
///
/// Price and last-checked fields are written only through
/// [`ItemRepository::record_observation`]; the remaining mutators exist for
/// the external CRUD collaborator.
pub struct ItemRepository {
    pool: DbPool,
}

impl ItemRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new tracked item
    pub async fn create(&self, item: CreateItem) -> Result<ItemRecord, DatabaseError> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, ItemRecord>(
            r#"
            INSERT INTO items (id, name, url, target_price, is_active, owner, created_at)
            VALUES (?1, ?2, ?3, ?4, 1, ?5, ?6)
            RETURNING *
            "#,
        )
        .bind(&item.id)
        .bind(&item.name)
        .bind(&item.url)
        .bind(item.target_price)
        .bind(&item.owner)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create item: {}", e);
            DatabaseError::QueryError(format!("Failed to create item: {}", e))
        })?;

        debug!("Created item: {} ({})", record.id, record.name);
        Ok(record)
    }

    /// Get item by ID
    pub async fn get(&self, id: &str) -> Result<Option<ItemRecord>, DatabaseError> {
        let record = sqlx::query_as::<_, ItemRecord>("SELECT * FROM items WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to get item {}: {}", id, e);
                DatabaseError::QueryError(format!("Failed to get item: {}", e))
            })?;

        Ok(record)
    }

    /// Get all items with monitoring enabled
    pub async fn list_active(&self) -> Result<Vec<ItemRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, ItemRecord>(
            "SELECT * FROM items WHERE is_active = 1 ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to list active items: {}", e);
            DatabaseError::QueryError(format!("Failed to list active items: {}", e))
        })?;

        Ok(records)
    }

    /// Persist one price observation: insert the sample and update the item's
    /// current price and last-checked timestamp in a single transaction, so a
    /// concurrent reader never sees one without the other.
    pub async fn record_observation(
        &self,
        id: &str,
        price: f64,
        source: &str,
    ) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO price_samples (item_id, price, source, sampled_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(id)
        .bind(price)
        .bind(source)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            error!("Failed to insert price sample for {}: {}", id, e);
            DatabaseError::QueryError(format!("Failed to insert price sample: {}", e))
        })?;

        let rows_affected =
            sqlx::query("UPDATE items SET current_price = ?1, last_checked = ?2 WHERE id = ?3")
                .bind(price)
                .bind(now)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    error!("Failed to update price for item {}: {}", id, e);
                    DatabaseError::QueryError(format!("Failed to update item price: {}", e))
                })?
                .rows_affected();

        // Dropping the transaction on the error path rolls the sample back
        if rows_affected == 0 {
            return Err(DatabaseError::QueryError(format!("Item not found: {}", id)));
        }

        tx.commit().await?;

        debug!("Recorded observation for {}: {}", id, price);
        Ok(())
    }

    /// Enable or disable monitoring for an item
    pub async fn set_active(&self, id: &str, active: bool) -> Result<(), DatabaseError> {
        let rows_affected = sqlx::query("UPDATE items SET is_active = ?1 WHERE id = ?2")
            .bind(active)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to update active flag for {}: {}", id, e);
                DatabaseError::QueryError(format!("Failed to update active flag: {}", e))
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(DatabaseError::QueryError(format!("Item not found: {}", id)));
        }

        Ok(())
    }

    /// Change an item's target price
    pub async fn update_target(&self, id: &str, target_price: f64) -> Result<(), DatabaseError> {
        let rows_affected = sqlx::query("UPDATE items SET target_price = ?1 WHERE id = ?2")
            .bind(target_price)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to update target for {}: {}", id, e);
                DatabaseError::QueryError(format!("Failed to update target price: {}", e))
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(DatabaseError::QueryError(format!("Item not found: {}", id)));
        }

        Ok(())
    }

    /// Delete an item
    pub async fn delete(&self, id: &str) -> Result<(), DatabaseError> {
        sqlx::query("DELETE FROM items WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to delete item {}: {}", id, e);
                DatabaseError::QueryError(format!("Failed to delete item: {}", e))
            })?;

        Ok(())
    }
}

/// Price sample repository (read paths; inserts go through
/// [`ItemRepository::record_observation`])
pub struct PriceSampleRepository {
    pool: DbPool,
}

impl PriceSampleRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Get samples for an item since a given time, newest first
    pub async fn history_since(
        &self,
        item_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<PriceSampleRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, PriceSampleRecord>(
            r#"
            SELECT * FROM price_samples
            WHERE item_id = ?1 AND sampled_at >= ?2
            ORDER BY sampled_at DESC
            "#,
        )
        .bind(item_id)
        .bind(since)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get price history for {}: {}", item_id, e);
            DatabaseError::QueryError(format!("Failed to get price history: {}", e))
        })?;

        Ok(records)
    }

    /// Get the most recent samples for an item
    pub async fn recent(
        &self,
        item_id: &str,
        limit: i64,
    ) -> Result<Vec<PriceSampleRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, PriceSampleRecord>(
            "SELECT * FROM price_samples WHERE item_id = ?1 ORDER BY sampled_at DESC, id DESC LIMIT ?2",
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get recent samples for {}: {}", item_id, e);
            DatabaseError::QueryError(format!("Failed to get recent samples: {}", e))
        })?;

        Ok(records)
    }
}

/// Alert repository
pub struct AlertRepository {
    pool: DbPool,
}

impl AlertRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Create a new alert
    pub async fn create(&self, alert: CreateAlert) -> Result<AlertRecord, DatabaseError> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, AlertRecord>(
            r#"
            INSERT INTO alerts (item_id, kind, message, is_sent, created_at)
            VALUES (?1, ?2, ?3, 0, ?4)
            RETURNING *
            "#,
        )
        .bind(&alert.item_id)
        .bind(alert.kind.as_str())
        .bind(&alert.message)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to create alert: {}", e);
            DatabaseError::QueryError(format!("Failed to create alert: {}", e))
        })?;

        debug!("Created {} alert for {}", record.kind, record.item_id);
        Ok(record)
    }

    /// Get alerts not yet delivered, oldest first
    pub async fn unsent(&self, limit: i64) -> Result<Vec<AlertRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, AlertRecord>(
            "SELECT * FROM alerts WHERE is_sent = 0 ORDER BY created_at ASC, id ASC LIMIT ?1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get unsent alerts: {}", e);
            DatabaseError::QueryError(format!("Failed to get unsent alerts: {}", e))
        })?;

        Ok(records)
    }

    /// Mark an alert as delivered
    pub async fn mark_sent(&self, id: i64) -> Result<(), DatabaseError> {
        let rows_affected = sqlx::query("UPDATE alerts SET is_sent = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("Failed to mark alert {} sent: {}", id, e);
                DatabaseError::QueryError(format!("Failed to mark alert sent: {}", e))
            })?
            .rows_affected();

        if rows_affected == 0 {
            return Err(DatabaseError::QueryError(format!("Alert not found: {}", id)));
        }

        Ok(())
    }

    /// Get the most recent alerts for an item
    pub async fn recent_for_item(
        &self,
        item_id: &str,
        limit: i64,
    ) -> Result<Vec<AlertRecord>, DatabaseError> {
        let records = sqlx::query_as::<_, AlertRecord>(
            "SELECT * FROM alerts WHERE item_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2",
        )
        .bind(item_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            error!("Failed to get alerts for {}: {}", item_id, e);
            DatabaseError::QueryError(format!("Failed to get alerts: {}", e))
        })?;

        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::alert::AlertKind;
    use crate::persistence::init_database;

    fn keyboard_item() -> CreateItem {
        CreateItem {
            id: "item-1".to_string(),
            name: "Mechanical Keyboard".to_string(),
            url: "https://shop.example.com/p/keyboard".to_string(),
            target_price: 100.0,
            owner: "user-1".to_string(),
        }
    }

    #[tokio::test]
    async fn test_item_crud() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let repo = ItemRepository::new(pool);

        let created = repo.create(keyboard_item()).await.unwrap();
        assert_eq!(created.name, "Mechanical Keyboard");
        assert!(created.is_active);
        assert!(created.current_price.is_none());
        assert!(created.last_checked.is_none());

        let fetched = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.id, created.id);

        repo.update_target(&created.id, 80.0).await.unwrap();
        let fetched = repo.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.target_price, 80.0);

        repo.set_active(&created.id, false).await.unwrap();
        assert!(repo.list_active().await.unwrap().is_empty());

        repo.delete(&created.id).await.unwrap();
        assert!(repo.get(&created.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_record_observation_updates_item_and_history_together() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let items = ItemRepository::new(pool.clone());
        let samples = PriceSampleRepository::new(pool);

        let created = items.create(keyboard_item()).await.unwrap();
        items
            .record_observation(&created.id, 119.99, "web_scraper")
            .await
            .unwrap();

        let fetched = items.get(&created.id).await.unwrap().unwrap();
        assert_eq!(fetched.current_price, Some(119.99));
        assert!(fetched.last_checked.is_some());

        let history = samples.recent(&created.id, 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].price, 119.99);
        assert_eq!(history[0].source, "web_scraper");
    }

    #[tokio::test]
    async fn test_record_observation_unknown_item_leaves_no_sample() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let items = ItemRepository::new(pool.clone());
        let samples = PriceSampleRepository::new(pool);

        let result = items.record_observation("ghost", 10.0, "web_scraper").await;
        assert!(result.is_err());

        // The transaction rolled back: no orphaned sample row
        let history = samples.recent("ghost", 10).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_history_since_filters_by_time() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let items = ItemRepository::new(pool.clone());
        let samples = PriceSampleRepository::new(pool);

        let created = items.create(keyboard_item()).await.unwrap();
        items
            .record_observation(&created.id, 110.0, "web_scraper")
            .await
            .unwrap();
        items
            .record_observation(&created.id, 105.0, "web_scraper")
            .await
            .unwrap();

        let since = Utc::now() - chrono::Duration::days(30);
        let history = samples.history_since(&created.id, since).await.unwrap();
        assert_eq!(history.len(), 2);

        let future = Utc::now() + chrono::Duration::days(1);
        let history = samples.history_since(&created.id, future).await.unwrap();
        assert!(history.is_empty());
    }

    #[tokio::test]
    async fn test_alert_flow() {
        let pool = init_database("sqlite::memory:").await.unwrap();
        let items = ItemRepository::new(pool.clone());
        let alerts = AlertRepository::new(pool);

        let created = items.create(keyboard_item()).await.unwrap();
        let alert = alerts
            .create(CreateAlert {
                item_id: created.id.clone(),
                kind: AlertKind::TargetReached,
                message: "Target price reached! Mechanical Keyboard is now $95.00".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(alert.kind, "target_reached");
        assert!(!alert.is_sent);

        let pending = alerts.unsent(10).await.unwrap();
        assert_eq!(pending.len(), 1);

        alerts.mark_sent(alert.id).await.unwrap();
        assert!(alerts.unsent(10).await.unwrap().is_empty());

        let recent = alerts.recent_for_item(&created.id, 10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert!(recent[0].is_sent);
    }
}
