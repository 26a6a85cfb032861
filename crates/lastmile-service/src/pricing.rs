//! # Pricing Admin Service
//!
//! Pricing slab lifecycle: create, update (re-activates), disable,
//! version history. Mutations follow the same
//! validate / lock / transaction / cache-clear shape as zones.

use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use tokio::sync::Mutex;
use tracing::info;
use uuid::Uuid;

use lastmile_core::types::{AuditRecord, ChangeAction, EntityKind, PricingSlab, PricingVersion};
use lastmile_core::validation::{validate_bracket, validate_fees, validate_name};
use lastmile_core::{Money, DEFAULT_CURRENCY};
use lastmile_db::Database;

use crate::cache::QuoteCache;
use crate::error::ServiceResult;

// =============================================================================
// Inputs
// =============================================================================

/// Input for creating a pricing slab.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateSlab {
    pub warehouse_id: String,
    pub name: String,
    pub min_km: f64,
    pub max_km: f64,
    pub flat_fee: Money,
    pub per_km_fee: Money,
    /// Defaults to `"INR"` when absent.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Input for updating a slab. All fields are replaced; a disabled slab
/// is re-activated by the update.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateSlab {
    pub name: String,
    pub min_km: f64,
    pub max_km: f64,
    pub flat_fee: Money,
    pub per_km_fee: Money,
    #[serde(default)]
    pub currency: Option<String>,
}

// =============================================================================
// Service
// =============================================================================

/// Orchestrates pricing slab mutations, versioning and auditing.
#[derive(Clone)]
pub struct PricingService {
    db: Database,
    cache: Arc<QuoteCache>,
    /// Serializes mutations so per-entity version numbers stay gapless.
    write_lock: Arc<Mutex<()>>,
}

impl PricingService {
    pub fn new(db: Database, cache: Arc<QuoteCache>) -> Self {
        PricingService {
            db,
            cache,
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    // ===== Reads =====

    pub async fn get(&self, id: &str) -> ServiceResult<PricingSlab> {
        Ok(self.db.pricing().get(id).await?)
    }

    pub async fn list(
        &self,
        warehouse_id: &str,
        active_only: bool,
    ) -> ServiceResult<Vec<PricingSlab>> {
        Ok(self
            .db
            .pricing()
            .list_by_warehouse(warehouse_id, active_only)
            .await?)
    }

    /// Version history for a slab, newest first.
    pub async fn versions(&self, pricing_id: &str) -> ServiceResult<Vec<PricingVersion>> {
        Ok(self.db.ledger().pricing_versions(pricing_id).await?)
    }

    // ===== Mutations =====

    /// Creates a slab. Records version 1 and a `CREATE` audit entry.
    pub async fn create(&self, input: CreateSlab, actor: &str) -> ServiceResult<PricingSlab> {
        validate_name(&input.name)?;
        validate_bracket(input.min_km, input.max_km)?;
        validate_fees(input.flat_fee, input.per_km_fee)?;

        self.db.warehouses().get(&input.warehouse_id).await?;

        let _guard = self.write_lock.lock().await;

        let now = Utc::now();
        let slab = PricingSlab {
            id: Uuid::new_v4().to_string(),
            warehouse_id: input.warehouse_id,
            name: input.name,
            min_km: input.min_km,
            max_km: input.max_km,
            flat_fee: input.flat_fee,
            per_km_fee: input.per_km_fee,
            currency: input
                .currency
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        let snapshot = serde_json::to_value(&slab)?;

        let mut tx = self.db.pool().begin().await?;
        self.db.pricing().insert(&mut tx, &slab).await?;
        self.append_ledger(&mut tx, &slab, ChangeAction::Create, actor, None, snapshot)
            .await?;
        tx.commit().await?;

        self.cache.clear();
        info!(slab_id = %slab.id, actor, "Created pricing slab");

        Ok(slab)
    }

    /// Replaces a slab's bracket, fees and name, re-activating it if
    /// disabled.
    pub async fn update(
        &self,
        id: &str,
        input: UpdateSlab,
        actor: &str,
    ) -> ServiceResult<PricingSlab> {
        validate_name(&input.name)?;
        validate_bracket(input.min_km, input.max_km)?;
        validate_fees(input.flat_fee, input.per_km_fee)?;

        let _guard = self.write_lock.lock().await;

        let before = self.db.pricing().get(id).await?;
        let before_snapshot = serde_json::to_value(&before)?;

        let slab = PricingSlab {
            name: input.name,
            min_km: input.min_km,
            max_km: input.max_km,
            flat_fee: input.flat_fee,
            per_km_fee: input.per_km_fee,
            currency: input.currency.unwrap_or(before.currency.clone()),
            is_active: true,
            updated_at: Utc::now(),
            ..before
        };
        let snapshot = serde_json::to_value(&slab)?;

        let mut tx = self.db.pool().begin().await?;
        self.db.pricing().update(&mut tx, &slab).await?;
        self.append_ledger(
            &mut tx,
            &slab,
            ChangeAction::Update,
            actor,
            Some(before_snapshot),
            snapshot,
        )
        .await?;
        tx.commit().await?;

        self.cache.clear();
        info!(slab_id = %slab.id, actor, "Updated pricing slab");

        Ok(slab)
    }

    /// Soft-deletes a slab.
    pub async fn disable(&self, id: &str, actor: &str) -> ServiceResult<PricingSlab> {
        let _guard = self.write_lock.lock().await;

        let before = self.db.pricing().get(id).await?;
        let before_snapshot = serde_json::to_value(&before)?;

        let slab = PricingSlab {
            is_active: false,
            updated_at: Utc::now(),
            ..before
        };
        let snapshot = serde_json::to_value(&slab)?;

        let mut tx = self.db.pool().begin().await?;
        self.db
            .pricing()
            .set_active(&mut tx, id, false, slab.updated_at)
            .await?;
        self.append_ledger(
            &mut tx,
            &slab,
            ChangeAction::Disable,
            actor,
            Some(before_snapshot),
            snapshot,
        )
        .await?;
        tx.commit().await?;

        self.cache.clear();
        info!(slab_id = %slab.id, actor, "Disabled pricing slab");

        Ok(slab)
    }

    // ===== Internals =====

    async fn append_ledger(
        &self,
        tx: &mut sqlx::SqliteConnection,
        slab: &PricingSlab,
        action: ChangeAction,
        actor: &str,
        before: Option<serde_json::Value>,
        snapshot: serde_json::Value,
    ) -> ServiceResult<()> {
        let ledger = self.db.ledger();
        let version = ledger.max_pricing_version(tx, &slab.id).await? + 1;
        let now = Utc::now();

        ledger
            .record_pricing_version(
                tx,
                &PricingVersion {
                    id: Uuid::new_v4().to_string(),
                    pricing_id: slab.id.clone(),
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
                    entity_kind: EntityKind::Pricing,
                    entity_id: Some(slab.id.clone()),
                    before,
                    after: Some(snapshot),
                    created_at: now,
                },
            )
            .await?;

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ServiceError;
    use lastmile_core::types::Warehouse;
    use lastmile_db::DbConfig;
    use serde_json::json;

    async fn test_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let wh = Warehouse {
            id: "wh-1".to_string(),
            name: "Connaught Place Hub".to_string(),
            lat: 28.6139,
            lng: 77.2090,
            is_active: true,
            created_at: Utc::now(),
        };
        let mut conn = db.pool().acquire().await.unwrap();
        db.warehouses().insert(&mut conn, &wh).await.unwrap();
        db
    }

    fn service(db: &Database) -> (PricingService, Arc<QuoteCache>) {
        let cache = Arc::new(QuoteCache::default());
        (PricingService::new(db.clone(), cache.clone()), cache)
    }

    fn create_input() -> CreateSlab {
        CreateSlab {
            warehouse_id: "wh-1".to_string(),
            name: "0-5 km".to_string(),
            min_km: 0.0,
            max_km: 5.0,
            flat_fee: Money::from_major(30),
            per_km_fee: Money::from_major(8),
            currency: None,
        }
    }

    #[tokio::test]
    async fn test_create_defaults_currency_and_versions() {
        let db = test_db().await;
        let (svc, _) = service(&db);

        let slab = svc.create(create_input(), "admin").await.unwrap();
        assert_eq!(slab.currency, "INR");

        let versions = svc.versions(&slab.id).await.unwrap();
        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].version, 1);
        assert_eq!(versions[0].action, ChangeAction::Create);
        assert_eq!(versions[0].snapshot["name"], json!("0-5 km"));
    }

    #[tokio::test]
    async fn test_invalid_bracket_rejected_without_writes() {
        let db = test_db().await;
        let (svc, _) = service(&db);

        let mut input = create_input();
        input.max_km = input.min_km; // max must be strictly greater
        let err = svc.create(input, "admin").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
        assert!(svc.list("wh-1", false).await.unwrap().is_empty());

        let mut input = create_input();
        input.flat_fee = Money::from_minor(-1);
        assert!(svc.create(input, "admin").await.is_err());
    }

    #[tokio::test]
    async fn test_update_reactivates_and_versions() {
        let db = test_db().await;
        let (svc, _) = service(&db);

        let slab = svc.create(create_input(), "admin").await.unwrap();
        svc.disable(&slab.id, "admin").await.unwrap();

        let updated = svc
            .update(
                &slab.id,
                UpdateSlab {
                    name: "0-6 km".to_string(),
                    min_km: 0.0,
                    max_km: 6.0,
                    flat_fee: Money::from_major(35),
                    per_km_fee: Money::from_major(8),
                    currency: None,
                },
                "admin",
            )
            .await
            .unwrap();

        assert!(updated.is_active);
        assert_eq!(updated.max_km, 6.0);
        assert_eq!(updated.currency, "INR"); // kept from the existing row

        let versions = svc.versions(&slab.id).await.unwrap();
        let numbers: Vec<i64> = versions.iter().map(|v| v.version).collect();
        assert_eq!(numbers, vec![3, 2, 1]);
        assert_eq!(versions[0].action, ChangeAction::Update);
        assert_eq!(versions[1].action, ChangeAction::Disable);
    }

    #[tokio::test]
    async fn test_disable_audits_before_and_after() {
        let db = test_db().await;
        let (svc, _) = service(&db);

        let slab = svc.create(create_input(), "admin").await.unwrap();
        svc.disable(&slab.id, "ops").await.unwrap();

        let audit = db.ledger().recent_audit(1).await.unwrap();
        assert_eq!(audit[0].actor, "ops");
        assert_eq!(audit[0].action, ChangeAction::Disable);
        assert_eq!(audit[0].entity_kind, EntityKind::Pricing);
        assert_eq!(audit[0].before.as_ref().unwrap()["is_active"], json!(true));
        assert_eq!(audit[0].after.as_ref().unwrap()["is_active"], json!(false));
    }

    #[tokio::test]
    async fn test_mutations_clear_cache() {
        let db = test_db().await;
        let (svc, cache) = service(&db);

        cache.set(
            QuoteCache::key("wh-1", 28.6, 77.2),
            lastmile_core::types::QuoteResult {
                serviceable: false,
                matched_zone: None,
                distance_km: 1.0,
                price: Money::zero(),
                currency: "INR".to_string(),
                slab_name: None,
            },
        );

        let slab = svc.create(create_input(), "admin").await.unwrap();
        assert!(cache.is_empty());

        cache.set(
            QuoteCache::key("wh-1", 28.6, 77.2),
            lastmile_core::types::QuoteResult {
                serviceable: false,
                matched_zone: None,
                distance_km: 1.0,
                price: Money::zero(),
                currency: "INR".to_string(),
                slab_name: None,
            },
        );
        svc.disable(&slab.id, "admin").await.unwrap();
        assert!(cache.is_empty());
    }
}
