//! # Warehouse Repository
//!
//! CRUD operations for dispatch warehouses. Warehouses are the origin
//! points for every quote; zones and pricing slabs hang off them.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use lastmile_core::types::Warehouse;

use crate::error::{DbError, DbResult};

/// Database row for a warehouse.
#[derive(Debug, sqlx::FromRow)]
struct WarehouseRow {
    id: String,
    name: String,
    lat: f64,
    lng: f64,
    is_active: bool,
    created_at: DateTime<Utc>,
}

impl From<WarehouseRow> for Warehouse {
    fn from(row: WarehouseRow) -> Self {
        Warehouse {
            id: row.id,
            name: row.name,
            lat: row.lat,
            lng: row.lng,
            is_active: row.is_active,
            created_at: row.created_at,
        }
    }
}

/// Repository for warehouse operations.
#[derive(Debug, Clone)]
pub struct WarehouseRepository {
    pool: SqlitePool,
}

impl WarehouseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        WarehouseRepository { pool }
    }

    /// Fetches a warehouse by ID.
    pub async fn get(&self, id: &str) -> DbResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, lat, lng, is_active, created_at
             FROM warehouses WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Warehouse", id))?;

        Ok(row.into())
    }

    /// Fetches an active warehouse by ID.
    ///
    /// Quote requests go through this: a disabled warehouse must not
    /// serve quotes even when its zones are still in the database.
    pub async fn get_active(&self, id: &str) -> DbResult<Warehouse> {
        let row = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, lat, lng, is_active, created_at
             FROM warehouses WHERE id = ? AND is_active = 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Warehouse", id))?;

        Ok(row.into())
    }

    /// Lists all warehouses, name ascending.
    pub async fn list(&self) -> DbResult<Vec<Warehouse>> {
        let rows = sqlx::query_as::<_, WarehouseRow>(
            "SELECT id, name, lat, lng, is_active, created_at
             FROM warehouses ORDER BY name ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        debug!(count = rows.len(), "Listed warehouses");

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Inserts a new warehouse.
    pub async fn insert(&self, conn: &mut SqliteConnection, warehouse: &Warehouse) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO warehouses (id, name, lat, lng, is_active, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&warehouse.id)
        .bind(&warehouse.name)
        .bind(warehouse.lat)
        .bind(warehouse.lng)
        .bind(warehouse.is_active)
        .bind(warehouse.created_at)
        .execute(conn)
        .await?;

        debug!(warehouse_id = %warehouse.id, "Inserted warehouse");

        Ok(())
    }

    /// Sets a warehouse's active flag.
    pub async fn set_active(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        active: bool,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE warehouses SET is_active = ? WHERE id = ?")
            .bind(active)
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Warehouse", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
