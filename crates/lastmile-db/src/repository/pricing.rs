//! # Pricing Slab Repository
//!
//! Storage for distance-bracket pricing rules. Fees are stored as
//! INTEGER minor units (paise) and decoded straight into `Money`.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use lastmile_core::types::PricingSlab;
use lastmile_core::Money;

use crate::error::{DbError, DbResult};

#[derive(Debug, sqlx::FromRow)]
struct PricingSlabRow {
    id: String,
    warehouse_id: String,
    name: String,
    min_km: f64,
    max_km: f64,
    flat_fee: Money,
    per_km_fee: Money,
    currency: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<PricingSlabRow> for PricingSlab {
    fn from(row: PricingSlabRow) -> Self {
        PricingSlab {
            id: row.id,
            warehouse_id: row.warehouse_id,
            name: row.name,
            min_km: row.min_km,
            max_km: row.max_km,
            flat_fee: row.flat_fee,
            per_km_fee: row.per_km_fee,
            currency: row.currency,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for pricing slab operations.
#[derive(Debug, Clone)]
pub struct PricingRepository {
    pool: SqlitePool,
}

impl PricingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        PricingRepository { pool }
    }

    /// Fetches a slab by ID (active or not).
    pub async fn get(&self, id: &str) -> DbResult<PricingSlab> {
        let row = sqlx::query_as::<_, PricingSlabRow>(
            "SELECT id, warehouse_id, name, min_km, max_km, flat_fee, per_km_fee,
                    currency, is_active, created_at, updated_at
             FROM pricing_slabs WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("PricingSlab", id))?;

        Ok(row.into())
    }

    /// Lists slabs for a warehouse, nearest bracket first.
    pub async fn list_by_warehouse(
        &self,
        warehouse_id: &str,
        active_only: bool,
    ) -> DbResult<Vec<PricingSlab>> {
        let rows = if active_only {
            sqlx::query_as::<_, PricingSlabRow>(
                "SELECT id, warehouse_id, name, min_km, max_km, flat_fee, per_km_fee,
                        currency, is_active, created_at, updated_at
                 FROM pricing_slabs WHERE warehouse_id = ? AND is_active = 1
                 ORDER BY min_km ASC, id ASC",
            )
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, PricingSlabRow>(
                "SELECT id, warehouse_id, name, min_km, max_km, flat_fee, per_km_fee,
                        currency, is_active, created_at, updated_at
                 FROM pricing_slabs WHERE warehouse_id = ?
                 ORDER BY min_km ASC, id ASC",
            )
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?
        };

        debug!(
            warehouse_id,
            count = rows.len(),
            active_only,
            "Listed pricing slabs"
        );

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Inserts a new slab.
    pub async fn insert(&self, conn: &mut SqliteConnection, slab: &PricingSlab) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO pricing_slabs
                 (id, warehouse_id, name, min_km, max_km, flat_fee, per_km_fee,
                  currency, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&slab.id)
        .bind(&slab.warehouse_id)
        .bind(&slab.name)
        .bind(slab.min_km)
        .bind(slab.max_km)
        .bind(slab.flat_fee)
        .bind(slab.per_km_fee)
        .bind(&slab.currency)
        .bind(slab.is_active)
        .bind(slab.created_at)
        .bind(slab.updated_at)
        .execute(conn)
        .await?;

        debug!(slab_id = %slab.id, warehouse_id = %slab.warehouse_id, "Inserted pricing slab");

        Ok(())
    }

    /// Updates a slab's mutable fields.
    pub async fn update(&self, conn: &mut SqliteConnection, slab: &PricingSlab) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE pricing_slabs
             SET name = ?, min_km = ?, max_km = ?, flat_fee = ?, per_km_fee = ?,
                 currency = ?, is_active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&slab.name)
        .bind(slab.min_km)
        .bind(slab.max_km)
        .bind(slab.flat_fee)
        .bind(slab.per_km_fee)
        .bind(&slab.currency)
        .bind(slab.is_active)
        .bind(slab.updated_at)
        .bind(&slab.id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PricingSlab", &slab.id));
        }

        debug!(slab_id = %slab.id, "Updated pricing slab");

        Ok(())
    }

    /// Soft-deletes a slab.
    pub async fn set_active(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE pricing_slabs SET is_active = ?, updated_at = ? WHERE id = ?")
                .bind(active)
                .bind(updated_at)
                .bind(id)
                .execute(conn)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PricingSlab", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use lastmile_core::types::Warehouse;
    use lastmile_core::DEFAULT_CURRENCY;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_warehouse(db: &Database, id: &str) {
        let wh = Warehouse {
            id: id.to_string(),
            name: "Test Hub".to_string(),
            lat: 28.6139,
            lng: 77.2090,
            is_active: true,
            created_at: Utc::now(),
        };
        let mut conn = db.pool().acquire().await.unwrap();
        db.warehouses().insert(&mut conn, &wh).await.unwrap();
    }

    fn sample_slab(id: &str, warehouse_id: &str, min_km: f64, max_km: f64) -> PricingSlab {
        let now = Utc::now();
        PricingSlab {
            id: id.to_string(),
            warehouse_id: warehouse_id.to_string(),
            name: format!("{min_km}-{max_km} km"),
            min_km,
            max_km,
            flat_fee: Money::from_major(30),
            per_km_fee: Money::from_major(8),
            currency: DEFAULT_CURRENCY.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_money_columns_round_trip() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;
        let repo = db.pricing();

        let mut slab = sample_slab("s-1", "wh-1", 0.0, 5.0);
        slab.flat_fee = Money::from_minor(3050); // 30.50
        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert(&mut conn, &slab).await.unwrap();
        drop(conn);

        let fetched = repo.get("s-1").await.unwrap();
        assert_eq!(fetched.flat_fee, Money::from_minor(3050));
        assert_eq!(fetched.per_km_fee, Money::from_major(8));
        assert_eq!(fetched.currency, "INR");
    }

    #[tokio::test]
    async fn test_list_ordered_by_min_km() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;
        let repo = db.pricing();

        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert(&mut conn, &sample_slab("s-far", "wh-1", 10.0, 25.0))
            .await
            .unwrap();
        repo.insert(&mut conn, &sample_slab("s-near", "wh-1", 0.0, 5.0))
            .await
            .unwrap();
        repo.insert(&mut conn, &sample_slab("s-mid", "wh-1", 5.0, 10.0))
            .await
            .unwrap();
        drop(conn);

        let slabs = repo.list_by_warehouse("wh-1", true).await.unwrap();
        let ids: Vec<&str> = slabs.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["s-near", "s-mid", "s-far"]);
    }

    #[tokio::test]
    async fn test_set_active_soft_deletes() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;
        let repo = db.pricing();

        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert(&mut conn, &sample_slab("s-1", "wh-1", 0.0, 5.0))
            .await
            .unwrap();
        repo.set_active(&mut conn, "s-1", false, Utc::now())
            .await
            .unwrap();
        drop(conn);

        let active = repo.list_by_warehouse("wh-1", true).await.unwrap();
        assert!(active.is_empty());

        // Row still exists for history
        let fetched = repo.get("s-1").await.unwrap();
        assert!(!fetched.is_active);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;

        let slab = sample_slab("ghost", "wh-1", 0.0, 5.0);
        let mut conn = db.pool().acquire().await.unwrap();
        let err = db.pricing().update(&mut conn, &slab).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
