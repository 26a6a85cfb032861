//! # Versioning and Audit Ledger
//!
//! Append-only history for zones and pricing slabs, plus the shared
//! audit log.
//!
//! ## Version Numbering
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              Per-Entity Version Counter                                 │
//! │                                                                         │
//! │  zone A: CREATE ► v1    UPDATE ► v2    DISABLE ► v3                    │
//! │  zone B:                CREATE ► v1    UPDATE  ► v2                    │
//! │                                                                         │
//! │  Counters are independent per entity. The next version is always       │
//! │  max(version) + 1 for THAT entity, computed inside the mutation's      │
//! │  transaction. UNIQUE(entity, version) catches any write that slips     │
//! │  past the service-level mutation lock.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Version rows snapshot the entity AFTER the mutation. Audit rows
//! carry opaque before/after JSON and never participate in version
//! numbering.

use chrono::{DateTime, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;

use lastmile_core::types::{AuditRecord, ChangeAction, EntityKind, PricingVersion, ZoneVersion};

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct ZoneVersionRow {
    id: String,
    zone_id: String,
    version: i64,
    action: ChangeAction,
    actor: String,
    snapshot: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ZoneVersionRow> for ZoneVersion {
    type Error = crate::error::DbError;

    fn try_from(row: ZoneVersionRow) -> Result<Self, Self::Error> {
        Ok(ZoneVersion {
            id: row.id,
            zone_id: row.zone_id,
            version: row.version,
            action: row.action,
            actor: row.actor,
            snapshot: serde_json::from_str(&row.snapshot)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PricingVersionRow {
    id: String,
    pricing_id: String,
    version: i64,
    action: ChangeAction,
    actor: String,
    snapshot: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<PricingVersionRow> for PricingVersion {
    type Error = crate::error::DbError;

    fn try_from(row: PricingVersionRow) -> Result<Self, Self::Error> {
        Ok(PricingVersion {
            id: row.id,
            pricing_id: row.pricing_id,
            version: row.version,
            action: row.action,
            actor: row.actor,
            snapshot: serde_json::from_str(&row.snapshot)?,
            created_at: row.created_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct AuditRow {
    id: String,
    actor: String,
    action: ChangeAction,
    entity_kind: EntityKind,
    entity_id: Option<String>,
    before_snapshot: Option<String>,
    after_snapshot: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<AuditRow> for AuditRecord {
    type Error = crate::error::DbError;

    fn try_from(row: AuditRow) -> Result<Self, Self::Error> {
        let before = row
            .before_snapshot
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;
        let after = row
            .after_snapshot
            .as_deref()
            .map(serde_json::from_str)
            .transpose()?;

        Ok(AuditRecord {
            id: row.id,
            actor: row.actor,
            action: row.action,
            entity_kind: row.entity_kind,
            entity_id: row.entity_id,
            before,
            after,
            created_at: row.created_at,
        })
    }
}

/// Repository for version history and audit entries.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    pool: SqlitePool,
}

impl LedgerRepository {
    pub fn new(pool: SqlitePool) -> Self {
        LedgerRepository { pool }
    }

    // ===== Zone versions =====

    /// Highest recorded version for a zone, 0 if none.
    ///
    /// Runs on the mutation's connection so the read and the insert it
    /// feeds happen in the same transaction.
    pub async fn max_zone_version(
        &self,
        conn: &mut SqliteConnection,
        zone_id: &str,
    ) -> DbResult<i64> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM zone_versions WHERE zone_id = ?")
                .bind(zone_id)
                .fetch_one(conn)
                .await?;

        Ok(max.unwrap_or(0))
    }

    /// Appends a zone version row.
    pub async fn record_zone_version(
        &self,
        conn: &mut SqliteConnection,
        version: &ZoneVersion,
    ) -> DbResult<()> {
        let snapshot_json = serde_json::to_string(&version.snapshot)?;

        sqlx::query(
            "INSERT INTO zone_versions (id, zone_id, version, action, actor, snapshot, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&version.id)
        .bind(&version.zone_id)
        .bind(version.version)
        .bind(version.action)
        .bind(&version.actor)
        .bind(snapshot_json)
        .bind(version.created_at)
        .execute(conn)
        .await?;

        debug!(
            zone_id = %version.zone_id,
            version = version.version,
            action = ?version.action,
            "Recorded zone version"
        );

        Ok(())
    }

    /// Full version history for a zone, newest first.
    pub async fn zone_versions(&self, zone_id: &str) -> DbResult<Vec<ZoneVersion>> {
        let rows = sqlx::query_as::<_, ZoneVersionRow>(
            "SELECT id, zone_id, version, action, actor, snapshot, created_at
             FROM zone_versions WHERE zone_id = ?
             ORDER BY version DESC",
        )
        .bind(zone_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    // ===== Pricing versions =====

    /// Highest recorded version for a pricing slab, 0 if none.
    pub async fn max_pricing_version(
        &self,
        conn: &mut SqliteConnection,
        pricing_id: &str,
    ) -> DbResult<i64> {
        let max: Option<i64> =
            sqlx::query_scalar("SELECT MAX(version) FROM pricing_versions WHERE pricing_id = ?")
                .bind(pricing_id)
                .fetch_one(conn)
                .await?;

        Ok(max.unwrap_or(0))
    }

    /// Appends a pricing version row.
    pub async fn record_pricing_version(
        &self,
        conn: &mut SqliteConnection,
        version: &PricingVersion,
    ) -> DbResult<()> {
        let snapshot_json = serde_json::to_string(&version.snapshot)?;

        sqlx::query(
            "INSERT INTO pricing_versions (id, pricing_id, version, action, actor, snapshot, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&version.id)
        .bind(&version.pricing_id)
        .bind(version.version)
        .bind(version.action)
        .bind(&version.actor)
        .bind(snapshot_json)
        .bind(version.created_at)
        .execute(conn)
        .await?;

        debug!(
            pricing_id = %version.pricing_id,
            version = version.version,
            action = ?version.action,
            "Recorded pricing version"
        );

        Ok(())
    }

    /// Full version history for a pricing slab, newest first.
    pub async fn pricing_versions(&self, pricing_id: &str) -> DbResult<Vec<PricingVersion>> {
        let rows = sqlx::query_as::<_, PricingVersionRow>(
            "SELECT id, pricing_id, version, action, actor, snapshot, created_at
             FROM pricing_versions WHERE pricing_id = ?
             ORDER BY version DESC",
        )
        .bind(pricing_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    // ===== Audit log =====

    /// Appends an audit row. `entity_id` is NULL for bulk operations
    /// (GeoJSON import/export) that touch many entities at once.
    pub async fn record_audit(
        &self,
        conn: &mut SqliteConnection,
        record: &AuditRecord,
    ) -> DbResult<()> {
        let before_json = record
            .before
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;
        let after_json = record
            .after
            .as_ref()
            .map(serde_json::to_string)
            .transpose()?;

        sqlx::query(
            "INSERT INTO audit_log
                 (id, actor, action, entity_kind, entity_id, before_snapshot, after_snapshot, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.id)
        .bind(&record.actor)
        .bind(record.action)
        .bind(record.entity_kind)
        .bind(&record.entity_id)
        .bind(before_json)
        .bind(after_json)
        .bind(record.created_at)
        .execute(conn)
        .await?;

        debug!(
            actor = %record.actor,
            action = ?record.action,
            entity_kind = ?record.entity_kind,
            "Recorded audit entry"
        );

        Ok(())
    }

    /// Most recent audit entries, newest first.
    pub async fn recent_audit(&self, limit: i64) -> DbResult<Vec<AuditRecord>> {
        let rows = sqlx::query_as::<_, AuditRow>(
            "SELECT id, actor, action, entity_kind, entity_id,
                    before_snapshot, after_snapshot, created_at
             FROM audit_log
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DbError;
    use crate::pool::{Database, DbConfig};
    use serde_json::json;
    use uuid::Uuid;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn zone_version(zone_id: &str, version: i64, action: ChangeAction) -> ZoneVersion {
        ZoneVersion {
            id: Uuid::new_v4().to_string(),
            zone_id: zone_id.to_string(),
            version,
            action,
            actor: "tester".to_string(),
            snapshot: json!({"name": "Central Zone", "is_active": true}),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_version_counters_are_per_entity() {
        let db = test_db().await;
        let ledger = db.ledger();
        let mut conn = db.pool().acquire().await.unwrap();

        assert_eq!(ledger.max_zone_version(&mut conn, "z-a").await.unwrap(), 0);

        ledger
            .record_zone_version(&mut conn, &zone_version("z-a", 1, ChangeAction::Create))
            .await
            .unwrap();
        ledger
            .record_zone_version(&mut conn, &zone_version("z-a", 2, ChangeAction::Update))
            .await
            .unwrap();
        ledger
            .record_zone_version(&mut conn, &zone_version("z-b", 1, ChangeAction::Create))
            .await
            .unwrap();

        assert_eq!(ledger.max_zone_version(&mut conn, "z-a").await.unwrap(), 2);
        assert_eq!(ledger.max_zone_version(&mut conn, "z-b").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_version_rejected() {
        let db = test_db().await;
        let ledger = db.ledger();
        let mut conn = db.pool().acquire().await.unwrap();

        ledger
            .record_zone_version(&mut conn, &zone_version("z-a", 1, ChangeAction::Create))
            .await
            .unwrap();

        let err = ledger
            .record_zone_version(&mut conn, &zone_version("z-a", 1, ChangeAction::Update))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_history_listed_newest_first() {
        let db = test_db().await;
        let ledger = db.ledger();
        let mut conn = db.pool().acquire().await.unwrap();

        for (v, action) in [
            (1, ChangeAction::Create),
            (2, ChangeAction::Update),
            (3, ChangeAction::Disable),
        ] {
            ledger
                .record_zone_version(&mut conn, &zone_version("z-a", v, action))
                .await
                .unwrap();
        }
        drop(conn);

        let history = ledger.zone_versions("z-a").await.unwrap();
        let versions: Vec<i64> = history.iter().map(|v| v.version).collect();
        assert_eq!(versions, vec![3, 2, 1]);
        assert_eq!(history[0].action, ChangeAction::Disable);
    }

    #[tokio::test]
    async fn test_audit_allows_null_entity_id() {
        let db = test_db().await;
        let ledger = db.ledger();
        let mut conn = db.pool().acquire().await.unwrap();

        let record = AuditRecord {
            id: Uuid::new_v4().to_string(),
            actor: "importer".to_string(),
            action: ChangeAction::Import,
            entity_kind: EntityKind::Zone,
            entity_id: None,
            before: Some(json!({"warehouse_id": "wh-1", "active_before": 2})),
            after: Some(json!({"warehouse_id": "wh-1", "overwrite": true, "imported": 3})),
            created_at: Utc::now(),
        };
        ledger.record_audit(&mut conn, &record).await.unwrap();
        drop(conn);

        let recent = ledger.recent_audit(10).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].entity_id, None);
        assert_eq!(recent[0].action, ChangeAction::Import);
        assert_eq!(recent[0].after.as_ref().unwrap()["imported"], json!(3));
    }

    #[tokio::test]
    async fn test_pricing_versions_independent_of_zone_versions() {
        let db = test_db().await;
        let ledger = db.ledger();
        let mut conn = db.pool().acquire().await.unwrap();

        ledger
            .record_zone_version(&mut conn, &zone_version("shared-id", 1, ChangeAction::Create))
            .await
            .unwrap();

        // A pricing slab with the same raw id keeps its own counter
        assert_eq!(
            ledger
                .max_pricing_version(&mut conn, "shared-id")
                .await
                .unwrap(),
            0
        );

        let pv = PricingVersion {
            id: Uuid::new_v4().to_string(),
            pricing_id: "shared-id".to_string(),
            version: 1,
            action: ChangeAction::Create,
            actor: "tester".to_string(),
            snapshot: json!({"name": "0-5 km"}),
            created_at: Utc::now(),
        };
        ledger.record_pricing_version(&mut conn, &pv).await.unwrap();

        assert_eq!(
            ledger
                .max_pricing_version(&mut conn, "shared-id")
                .await
                .unwrap(),
            1
        );
        assert_eq!(
            ledger.max_zone_version(&mut conn, "shared-id").await.unwrap(),
            1
        );
    }
}
