//! # Database Seeder
//!
//! Seeds a Lastmile database with demo data for development:
//! one warehouse in central Delhi, a rectangular delivery zone around
//! it, and a three-slab pricing schedule.
//!
//! ## Usage
//! ```bash
//! cargo run --bin seed -- [database_path]
//! # defaults to ./lastmile.db
//! ```
//!
//! Seeded mutations go through the same entity + version + audit
//! transaction shape the services use, so the ledger starts consistent.

use chrono::Utc;
use uuid::Uuid;

use lastmile_core::geo::Point;
use lastmile_core::types::{
    AuditRecord, ChangeAction, EntityKind, PricingSlab, PricingVersion, Warehouse, Zone,
    ZoneVersion,
};
use lastmile_core::{Money, DEFAULT_CURRENCY};
use lastmile_db::{Database, DbConfig, DbResult};

const SEED_ACTOR: &str = "seed";

#[tokio::main]
async fn main() -> DbResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./lastmile.db".to_string());

    tracing::info!(path = %path, "Seeding database");

    let db = Database::new(DbConfig::new(&path)).await?;

    let warehouse_id = seed_warehouse(&db).await?;
    seed_zone(&db, &warehouse_id).await?;
    seed_pricing(&db, &warehouse_id).await?;

    tracing::info!(warehouse_id = %warehouse_id, "Seed complete");

    db.close().await;
    Ok(())
}

async fn seed_warehouse(db: &Database) -> DbResult<String> {
    let warehouse = Warehouse {
        id: Uuid::new_v4().to_string(),
        name: "Connaught Place Hub".to_string(),
        lat: 28.6139,
        lng: 77.2090,
        is_active: true,
        created_at: Utc::now(),
    };

    let mut tx = db.pool().begin().await?;
    db.warehouses().insert(&mut *tx, &warehouse).await?;
    tx.commit().await?;

    tracing::info!(id = %warehouse.id, name = %warehouse.name, "Seeded warehouse");
    Ok(warehouse.id)
}

async fn seed_zone(db: &Database, warehouse_id: &str) -> DbResult<()> {
    let now = Utc::now();
    let zone = Zone {
        id: Uuid::new_v4().to_string(),
        warehouse_id: warehouse_id.to_string(),
        name: "Central Delhi".to_string(),
        color: "#3B82F6".to_string(),
        ring: vec![
            Point::new(28.50, 77.10),
            Point::new(28.50, 77.32),
            Point::new(28.72, 77.32),
            Point::new(28.72, 77.10),
            Point::new(28.50, 77.10),
        ],
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    let snapshot = serde_json::to_value(&zone)?;

    let mut tx = db.pool().begin().await?;
    db.zones().insert(&mut *tx, &zone).await?;
    db.ledger()
        .record_zone_version(
            &mut *tx,
            &ZoneVersion {
                id: Uuid::new_v4().to_string(),
                zone_id: zone.id.clone(),
                version: 1,
                action: ChangeAction::Create,
                actor: SEED_ACTOR.to_string(),
                snapshot: snapshot.clone(),
                created_at: now,
            },
        )
        .await?;
    db.ledger()
        .record_audit(
            &mut *tx,
            &AuditRecord {
                id: Uuid::new_v4().to_string(),
                actor: SEED_ACTOR.to_string(),
                action: ChangeAction::Create,
                entity_kind: EntityKind::Zone,
                entity_id: Some(zone.id.clone()),
                before: None,
                after: Some(snapshot),
                created_at: now,
            },
        )
        .await?;
    tx.commit().await?;

    tracing::info!(id = %zone.id, name = %zone.name, "Seeded zone");
    Ok(())
}

async fn seed_pricing(db: &Database, warehouse_id: &str) -> DbResult<()> {
    let slabs = [
        ("0-5 km", 0.0, 5.0, Money::from_major(30), Money::from_major(8)),
        ("5-10 km", 5.0, 10.0, Money::from_major(50), Money::from_major(10)),
        ("10-25 km", 10.0, 25.0, Money::from_major(80), Money::from_major(12)),
    ];

    for (name, min_km, max_km, flat_fee, per_km_fee) in slabs {
        let now = Utc::now();
        let slab = PricingSlab {
            id: Uuid::new_v4().to_string(),
            warehouse_id: warehouse_id.to_string(),
            name: name.to_string(),
            min_km,
            max_km,
            flat_fee,
            per_km_fee,
            currency: DEFAULT_CURRENCY.to_string(),
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        let snapshot = serde_json::to_value(&slab)?;

        let mut tx = db.pool().begin().await?;
        db.pricing().insert(&mut *tx, &slab).await?;
        db.ledger()
            .record_pricing_version(
                &mut *tx,
                &PricingVersion {
                    id: Uuid::new_v4().to_string(),
                    pricing_id: slab.id.clone(),
                    version: 1,
                    action: ChangeAction::Create,
                    actor: SEED_ACTOR.to_string(),
                    snapshot: snapshot.clone(),
                    created_at: now,
                },
            )
            .await?;
        db.ledger()
            .record_audit(
                &mut *tx,
                &AuditRecord {
                    id: Uuid::new_v4().to_string(),
                    actor: SEED_ACTOR.to_string(),
                    action: ChangeAction::Create,
                    entity_kind: EntityKind::Pricing,
                    entity_id: Some(slab.id.clone()),
                    before: None,
                    after: Some(snapshot),
                    created_at: now,
                },
            )
            .await?;
        tx.commit().await?;

        tracing::info!(id = %slab.id, name, "Seeded pricing slab");
    }

    Ok(())
}
