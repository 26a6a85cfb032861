//! # Zone Repository
//!
//! Storage for delivery zones. The polygon ring is stored as a JSON
//! array of `{lat, lng}` objects in a TEXT column; rings are always
//! closed (first point repeated last) before they reach this layer.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use lastmile_core::geo::Point;
use lastmile_core::types::Zone;

use crate::error::{DbError, DbResult};

/// Database row for a zone. The ring column holds JSON text.
#[derive(Debug, sqlx::FromRow)]
struct ZoneRow {
    id: String,
    warehouse_id: String,
    name: String,
    color: String,
    ring: String,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ZoneRow> for Zone {
    type Error = DbError;

    fn try_from(row: ZoneRow) -> Result<Self, Self::Error> {
        let ring: Vec<Point> = serde_json::from_str(&row.ring)?;
        Ok(Zone {
            id: row.id,
            warehouse_id: row.warehouse_id,
            name: row.name,
            color: row.color,
            ring,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for zone operations.
#[derive(Debug, Clone)]
pub struct ZoneRepository {
    pool: SqlitePool,
}

impl ZoneRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ZoneRepository { pool }
    }

    /// Fetches a zone by ID (active or not).
    pub async fn get(&self, id: &str) -> DbResult<Zone> {
        let row = sqlx::query_as::<_, ZoneRow>(
            "SELECT id, warehouse_id, name, color, ring, is_active, created_at, updated_at
             FROM zones WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Zone", id))?;

        row.try_into()
    }

    /// Lists zones for a warehouse, id ascending (the matcher's tie-break order).
    ///
    /// ## Arguments
    /// * `active_only` - When true, soft-deleted zones are excluded.
    ///   Quote evaluation always passes true; admin listings pass false
    ///   to show disabled zones too.
    pub async fn list_by_warehouse(
        &self,
        warehouse_id: &str,
        active_only: bool,
    ) -> DbResult<Vec<Zone>> {
        let rows = if active_only {
            sqlx::query_as::<_, ZoneRow>(
                "SELECT id, warehouse_id, name, color, ring, is_active, created_at, updated_at
                 FROM zones WHERE warehouse_id = ? AND is_active = 1
                 ORDER BY id ASC",
            )
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?
        } else {
            sqlx::query_as::<_, ZoneRow>(
                "SELECT id, warehouse_id, name, color, ring, is_active, created_at, updated_at
                 FROM zones WHERE warehouse_id = ?
                 ORDER BY id ASC",
            )
            .bind(warehouse_id)
            .fetch_all(&self.pool)
            .await?
        };

        debug!(
            warehouse_id,
            count = rows.len(),
            active_only,
            "Listed zones"
        );

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Inserts a new zone.
    pub async fn insert(&self, conn: &mut SqliteConnection, zone: &Zone) -> DbResult<()> {
        let ring_json = serde_json::to_string(&zone.ring)?;

        sqlx::query(
            "INSERT INTO zones (id, warehouse_id, name, color, ring, is_active, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&zone.id)
        .bind(&zone.warehouse_id)
        .bind(&zone.name)
        .bind(&zone.color)
        .bind(ring_json)
        .bind(zone.is_active)
        .bind(zone.created_at)
        .bind(zone.updated_at)
        .execute(conn)
        .await?;

        debug!(zone_id = %zone.id, warehouse_id = %zone.warehouse_id, "Inserted zone");

        Ok(())
    }

    /// Updates a zone's mutable fields (name, color, ring, active flag).
    ///
    /// The caller is responsible for bumping `updated_at` before the
    /// write; timestamps are not generated in SQL so the row matches
    /// the version snapshot taken in the same transaction.
    pub async fn update(&self, conn: &mut SqliteConnection, zone: &Zone) -> DbResult<()> {
        let ring_json = serde_json::to_string(&zone.ring)?;

        let result = sqlx::query(
            "UPDATE zones
             SET name = ?, color = ?, ring = ?, is_active = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&zone.name)
        .bind(&zone.color)
        .bind(ring_json)
        .bind(zone.is_active)
        .bind(zone.updated_at)
        .bind(&zone.id)
        .execute(conn)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Zone", &zone.id));
        }

        debug!(zone_id = %zone.id, "Updated zone");

        Ok(())
    }

    /// Soft-deletes a zone. The row stays for version history.
    pub async fn set_active(
        &self,
        conn: &mut SqliteConnection,
        id: &str,
        active: bool,
        updated_at: DateTime<Utc>,
    ) -> DbResult<()> {
        let result = sqlx::query("UPDATE zones SET is_active = ?, updated_at = ? WHERE id = ?")
            .bind(active)
            .bind(updated_at)
            .bind(id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Zone", id));
        }

        Ok(())
    }

    /// Deactivates every zone for a warehouse. Returns the number of
    /// zones affected. Used by GeoJSON import with overwrite.
    pub async fn deactivate_all(
        &self,
        conn: &mut SqliteConnection,
        warehouse_id: &str,
        updated_at: DateTime<Utc>,
    ) -> DbResult<u64> {
        let result = sqlx::query(
            "UPDATE zones SET is_active = 0, updated_at = ?
             WHERE warehouse_id = ? AND is_active = 1",
        )
        .bind(updated_at)
        .bind(warehouse_id)
        .execute(conn)
        .await?;

        debug!(
            warehouse_id,
            count = result.rows_affected(),
            "Deactivated all zones"
        );

        Ok(result.rows_affected())
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

    fn rectangle_ring() -> Vec<Point> {
        vec![
            Point::new(28.50, 77.10),
            Point::new(28.50, 77.30),
            Point::new(28.70, 77.30),
            Point::new(28.70, 77.10),
            Point::new(28.50, 77.10),
        ]
    }

    fn sample_zone(id: &str, warehouse_id: &str) -> Zone {
        let now = Utc::now();
        Zone {
            id: id.to_string(),
            warehouse_id: warehouse_id.to_string(),
            name: "Central Zone".to_string(),
            color: "#3B82F6".to_string(),
            ring: rectangle_ring(),
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_ring_round_trips_through_json_column() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;
        let repo = db.zones();

        let zone = sample_zone("z-1", "wh-1");
        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert(&mut conn, &zone).await.unwrap();
        drop(conn);

        let fetched = repo.get("z-1").await.unwrap();
        assert_eq!(fetched.ring, zone.ring);
        assert_eq!(fetched.ring.len(), 5);
    }

    #[tokio::test]
    async fn test_insert_requires_existing_warehouse() {
        let db = test_db().await;
        let repo = db.zones();

        let zone = sample_zone("z-1", "no-such-warehouse");
        let mut conn = db.pool().acquire().await.unwrap();
        let err = repo.insert(&mut conn, &zone).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_active_only_listing_skips_disabled() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;
        let repo = db.zones();

        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert(&mut conn, &sample_zone("z-1", "wh-1"))
            .await
            .unwrap();
        repo.insert(&mut conn, &sample_zone("z-2", "wh-1"))
            .await
            .unwrap();
        repo.set_active(&mut conn, "z-1", false, Utc::now())
            .await
            .unwrap();
        drop(conn);

        let active = repo.list_by_warehouse("wh-1", true).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "z-2");

        let all = repo.list_by_warehouse("wh-1", false).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_deactivate_all_reports_count() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;
        let repo = db.zones();

        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert(&mut conn, &sample_zone("z-1", "wh-1"))
            .await
            .unwrap();
        repo.insert(&mut conn, &sample_zone("z-2", "wh-1"))
            .await
            .unwrap();

        let count = repo
            .deactivate_all(&mut conn, "wh-1", Utc::now())
            .await
            .unwrap();
        assert_eq!(count, 2);

        // Second call finds nothing active
        let count = repo
            .deactivate_all(&mut conn, "wh-1", Utc::now())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_update_rewrites_ring() {
        let db = test_db().await;
        seed_warehouse(&db, "wh-1").await;
        let repo = db.zones();

        let mut zone = sample_zone("z-1", "wh-1");
        let mut conn = db.pool().acquire().await.unwrap();
        repo.insert(&mut conn, &zone).await.unwrap();

        zone.name = "Renamed Zone".to_string();
        zone.ring = vec![
            Point::new(28.40, 77.00),
            Point::new(28.40, 77.40),
            Point::new(28.80, 77.40),
            Point::new(28.40, 77.00),
        ];
        zone.updated_at = Utc::now();
        repo.update(&mut conn, &zone).await.unwrap();
        drop(conn);

        let fetched = repo.get("z-1").await.unwrap();
        assert_eq!(fetched.name, "Renamed Zone");
        assert_eq!(fetched.ring.len(), 4);
    }
}
