//! # Zone Admin Service
//!
//! Zone lifecycle: create, update (re-activates), disable (soft
//! delete), GeoJSON export/import, version history.
//!
//! ## Mutation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Every zone mutation                                     │
//! │                                                                         │
//! │  validate input ──► reject BEFORE any write                            │
//! │       │                                                                 │
//! │  acquire write lock (serializes version numbering)                     │
//! │       │                                                                 │
//! │  BEGIN ── entity write ── version row ── audit row ── COMMIT           │
//! │       │        any failure rolls back all three                        │
//! │       ▼                                                                 │
//! │  clear quote cache                                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use lastmile_core::geo::Point;
use lastmile_core::geojson::{feature_from_zone, ring_from_lnglat, Feature, FeatureCollection};
use lastmile_core::types::{AuditRecord, ChangeAction, EntityKind, Zone, ZoneVersion};
use lastmile_core::validation::{validate_name, validate_ring};
use lastmile_core::ValidationError;
use lastmile_db::Database;

use crate::cache::QuoteCache;
use crate::error::ServiceResult;

/// Fallback name stem for imported features without a `name` property.
const IMPORT_NAME_STEM: &str = "Imported Zone";

/// Fallback color for imported features without a `color` property.
const IMPORT_DEFAULT_COLOR: &str = "#7C3AED";

// =============================================================================
// Inputs
// =============================================================================

/// Input for creating a zone. The ring may arrive open; it is closed
/// before validation.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateZone {
    pub warehouse_id: String,
    pub name: String,
    pub color: String,
    pub ring: Vec<Point>,
}

/// Input for updating a zone. All fields are replaced; a disabled zone
/// is re-activated by the update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateZone {
    pub name: String,
    pub color: String,
    pub ring: Vec<Point>,
}

/// Outcome of a GeoJSON import.
#[derive(Debug, Clone, Serialize)]
pub struct ImportSummary {
    /// Zones created from valid Polygon features.
    pub imported: usize,
    /// Features skipped (non-polygon, bad arity, too few points).
    pub skipped: usize,
    /// Previously active zones disabled by the overwrite flag.
    pub deactivated: u64,
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates zone mutations, versioning and the audit trail.
#[derive(Clone)]
pub struct ZoneService {
    db: Database,
    cache: Arc<QuoteCache>,
    /// Serializes mutations so per-entity version numbers stay gapless.
    write_lock: Arc<Mutex<()>>,
}

impl ZoneService {
    pub fn new(db: Database, cache: Arc<QuoteCache>) -> Self {
        ZoneService {
            db,
            cache,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // ===== Reads =====

    pub async fn get(&self, id: &str) -> ServiceResult<Zone> {
        Ok(self.db.zones().get(id).await?)
    }

    pub async fn list(&self, warehouse_id: &str, active_only: bool) -> ServiceResult<Vec<Zone>> {
        Ok(self
            .db
            .zones()
            .list_by_warehouse(warehouse_id, active_only)
            .await?)
    }

    /// Version history for a zone, newest first.
    pub async fn versions(&self, zone_id: &str) -> ServiceResult<Vec<ZoneVersion>> {
        Ok(self.db.ledger().zone_versions(zone_id).await?)
    }

    // ===== Mutations =====

    /// Creates a zone. Records version 1 and a `CREATE` audit entry.
    pub async fn create(&self, input: CreateZone, actor: &str) -> ServiceResult<Zone> {
        validate_name(&input.name)?;
        let ring = close_ring(input.ring);
        validate_ring(&ring)?;

        // Reject unknown warehouses before taking the lock
        self.db.warehouses().get(&input.warehouse_id).await?;

        let _guard = self.write_lock.lock().await;

        let now = Utc::now();
        let zone = Zone {
            id: Uuid::new_v4().to_string(),
            warehouse_id: input.warehouse_id,
            name: input.name,
            color: input.color,
            ring,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let snapshot = serde_json::to_value(&zone)?;

        let mut tx = self.db.pool().begin().await?;
        self.db.zones().insert(&mut tx, &zone).await?;
        self.append_ledger(
            &mut tx,
            &zone,
            ChangeAction::Create,
            actor,
            None,
            snapshot,
        )
        .await?;
        tx.commit().await?;

        self.cache.clear();
        info!(zone_id = %zone.id, actor, "Created zone");

        Ok(zone)
    }

    /// Replaces a zone's name, color and ring, re-activating it if it
    /// was disabled. Bumps the version and audits before/after.
    pub async fn update(&self, id: &str, input: UpdateZone, actor: &str) -> ServiceResult<Zone> {
        validate_name(&input.name)?;
        let ring = close_ring(input.ring);
        validate_ring(&ring)?;

        let _guard = self.write_lock.lock().await;

        let before = self.db.zones().get(id).await?;
        let before_snapshot = serde_json::to_value(&before)?;

        let zone = Zone {
            name: input.name,
            color: input.color,
            ring,
            is_active: true,
            updated_at: Utc::now(),
            ..before
        };
        let snapshot = serde_json::to_value(&zone)?;

        let mut tx = self.db.pool().begin().await?;
        self.db.zones().update(&mut tx, &zone).await?;
        self.append_ledger(
            &mut tx,
            &zone,
            ChangeAction::Update,
            actor,
            Some(before_snapshot),
            snapshot,
        )
        .await?;
        tx.commit().await?;

        self.cache.clear();
        info!(zone_id = %zone.id, actor, "Updated zone");

        Ok(zone)
    }

    /// Soft-deletes a zone. The row and its history stay; matching
    /// stops seeing it.
    pub async fn disable(&self, id: &str, actor: &str) -> ServiceResult<Zone> {
        let _guard = self.write_lock.lock().await;

        let before = self.db.zones().get(id).await?;
        let before_snapshot = serde_json::to_value(&before)?;

        let zone = Zone {
            is_active: false,
            updated_at: Utc::now(),
            ..before
        };
        let snapshot = serde_json::to_value(&zone)?;

        let mut tx = self.db.pool().begin().await?;
        self.db
            .zones()
            .set_active(&mut tx, id, false, zone.updated_at)
            .await?;
        self.append_ledger(
            &mut tx,
            &zone,
            ChangeAction::Disable,
            actor,
            Some(before_snapshot),
            snapshot,
        )
        .await?;
        tx.commit().await?;

        self.cache.clear();
        info!(zone_id = %zone.id, actor, "Disabled zone");

        Ok(zone)
    }

    // ===== GeoJSON =====

    /// Exports a warehouse's active zones as a FeatureCollection.
    ///
    /// Read-only apart from the bulk `EXPORT` audit entry; versions are
    /// untouched and the cache stays warm.
    pub async fn export_geojson(
        &self,
        warehouse_id: &str,
        actor: &str,
    ) -> ServiceResult<FeatureCollection> {
        self.db.warehouses().get(warehouse_id).await?;

        let zones = self.db.zones().list_by_warehouse(warehouse_id, true).await?;
        let features: Vec<Feature> = zones.iter().map(feature_from_zone).collect();
        let count = features.len();

        let mut tx = self.db.pool().begin().await?;
        self.db
            .ledger()
            .record_audit(
                &mut tx,
                &AuditRecord {
                    id: Uuid::new_v4().to_string(),
                    actor: actor.to_string(),
                    action: ChangeAction::Export,
                    entity_kind: EntityKind::Zone,
                    entity_id: None,
                    before: None,
                    after: Some(json!({ "warehouse_id": warehouse_id, "count": count })),
                    created_at: Utc::now(),
                },
            )
            .await?;
        tx.commit().await?;

        info!(warehouse_id, count, actor, "Exported zones as GeoJSON");

        Ok(FeatureCollection {
            kind: "FeatureCollection".to_string(),
            features,
        })
    }

    /// Imports zones from a FeatureCollection.
    ///
    /// Each valid Polygon feature becomes a NEW zone (import never
    /// updates in place). With `overwrite`, all currently active zones
    /// are disabled first. Invalid features are skipped, not fatal; the
    /// whole import is one transaction with one bulk audit entry.
    pub async fn import_geojson(
        &self,
        warehouse_id: &str,
        collection: &FeatureCollection,
        overwrite: bool,
        actor: &str,
    ) -> ServiceResult<ImportSummary> {
        if !collection.is_valid() {
            return Err(ValidationError::InvalidFormat {
                field: "type".to_string(),
                reason: "expected a FeatureCollection".to_string(),
            }
            .into());
        }

        self.db.warehouses().get(warehouse_id).await?;

        let _guard = self.write_lock.lock().await;

        let active_before = self
            .db
            .zones()
            .list_by_warehouse(warehouse_id, true)
            .await?
            .len();

        let now = Utc::now();
        let mut tx = self.db.pool().begin().await?;

        let deactivated = if overwrite {
            self.db
                .zones()
                .deactivate_all(&mut tx, warehouse_id, now)
                .await?
        } else {
            0
        };

        let mut imported = 0usize;
        let mut skipped = 0usize;

        for feature in &collection.features {
            if feature.geometry.kind != "Polygon" || feature.geometry.coordinates.is_empty() {
                skipped += 1;
                continue;
            }

            // Outer ring only; holes are not supported
            let ring = match ring_from_lnglat(&feature.geometry.coordinates[0]) {
                Ok(ring) => ring,
                Err(_) => {
                    skipped += 1;
                    continue;
                }
            };

            let name = feature
                .properties
                .get("name")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| format!("{} {}", IMPORT_NAME_STEM, imported + 1));
            let color = feature
                .properties
                .get("color")
                .and_then(|v| v.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| IMPORT_DEFAULT_COLOR.to_string());

            let zone = Zone {
                id: Uuid::new_v4().to_string(),
                warehouse_id: warehouse_id.to_string(),
                name,
                color,
                ring,
                is_active: true,
                created_at: now,
                updated_at: now,
            };
            let snapshot = serde_json::to_value(&zone)?;

            self.db.zones().insert(&mut tx, &zone).await?;

            let version = self.db.ledger().max_zone_version(&mut tx, &zone.id).await? + 1;
            self.db
                .ledger()
                .record_zone_version(
                    &mut tx,
                    &ZoneVersion {
                        id: Uuid::new_v4().to_string(),
                        zone_id: zone.id.clone(),
                        version,
                        action: ChangeAction::Import,
                        actor: actor.to_string(),
                        snapshot,
                        created_at: now,
                    },
                )
                .await?;

            imported += 1;
        }

        // One bulk audit row for the whole import
        self.db
            .ledger()
            .record_audit(
                &mut tx,
                &AuditRecord {
                    id: Uuid::new_v4().to_string(),
                    actor: actor.to_string(),
                    action: ChangeAction::Import,
                    entity_kind: EntityKind::Zone,
                    entity_id: None,
                    before: Some(json!({
                        "warehouse_id": warehouse_id,
                        "active_before": active_before,
                    })),
                    after: Some(json!({
                        "warehouse_id": warehouse_id,
                        "overwrite": overwrite,
                        "imported": imported,
                    })),
                    created_at: now,
                },
            )
            .await?;
        tx.commit().await?;

        self.cache.clear();
        info!(
            warehouse_id,
            imported, skipped, deactivated, actor, "Imported zones from GeoJSON"
        );

        Ok(ImportSummary {
            imported,
            skipped,
            deactivated,
        })
    }

    // ===== Internals =====

    /// Appends the version + audit rows that accompany a single-zone
    /// mutation inside its transaction.
    async fn append_ledger(
        &self,
        tx: &mut sqlx::SqliteConnection,
        zone: &Zone,
        action: ChangeAction,
        actor: &str,
        before: Option<serde_json::Value>,
        snapshot: serde_json::Value,
    ) -> ServiceResult<()> {
        let ledger = self.db.ledger();
        let version = ledger.max_zone_version(tx, &zone.id).await? + 1;
        let now = Utc::now();

        ledger
            .record_zone_version(
                tx,
                &ZoneVersion {
                    id: Uuid::new_v4().to_string(),
                    zone_id: zone.id.clone(),
                    version,
                    action,
                    actor: actor.to_string(),
                    snapshot: snapshot.clone(),
                    created_at: now,
                },
            )
            .await?;

        ledger
            .record_audit(
                tx,
                &AuditRecord {
                    id: Uuid::new_v4().to_string(),
                    actor: actor.to_string(),
                    action,
                    entity_kind: EntityKind::Zone,
                    entity_id: Some(zone.id.clone()),
                    before,
                    after: Some(snapshot),
                    created_at: now,
                },
            )
            .await?;

        Ok(())
    }
}

/// Closes an open ring by repeating the first vertex. Leaves closed
/// rings (and rings too short to close) alone for validation to judge.
fn close_ring(mut ring: Vec<Point>) -> Vec<Point> {
    if let (Some(&first), Some(&last)) = (ring.first(), ring.last()) {
        if first != last {
            ring.push(first);
        }
    }
    ring
}

// =============================================================================
// Unit Tests
// =============================================================================
