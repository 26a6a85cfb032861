//! # Quote Service
//!
//! The read path: resolve a destination to a serviceability decision
//! and price.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     QuoteService::quote                                 │
//! │                                                                         │
//! │  (warehouse_id, lat, lng)                                              │
//! │       │                                                                 │
//! │       ├──► active warehouse lookup (404 on miss or disabled)           │
//! │       │                                                                 │
//! │       ├──► cache get ──► HIT: return, nothing logged                   │
//! │       │                                                                 │
//! │       ▼ MISS                                                           │
//! │  load active zones + slabs ──► compute_quote (pure)                    │
//! │       │                                                                 │
//! │       ├──► append quote log (best-effort, never fails the quote)       │
//! │       └──► cache set ──► return                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, warn};
use uuid::Uuid;

use lastmile_core::geo::Point;
use lastmile_core::quote::{compute_quote, find_zone};
use lastmile_core::types::{QuoteLogEntry, QuoteResult};
use lastmile_core::validation::validate_point;
use lastmile_db::Database;

use crate::cache::QuoteCache;
use crate::error::ServiceResult;

/// Computes delivery quotes against the live zone/pricing data.
#[derive(Clone)]
pub struct QuoteService {
    db: Database,
    cache: Arc<QuoteCache>,
}

impl QuoteService {
    pub fn new(db: Database, cache: Arc<QuoteCache>) -> Self {
        QuoteService { db, cache }
    }

    /// Quotes a delivery from a warehouse to a destination.
    ///
    /// Non-serviceable destinations return an ordinary `QuoteResult`
    /// with `serviceable: false`; only an absent/disabled warehouse or
    /// invalid coordinates are errors.
    pub async fn quote(
        &self,
        warehouse_id: &str,
        lat: f64,
        lng: f64,
    ) -> ServiceResult<QuoteResult> {
        let destination = Point::new(lat, lng);
        validate_point(destination)?;

        let warehouse = self.db.warehouses().get_active(warehouse_id).await?;

        let key = QuoteCache::key(warehouse_id, lat, lng);
        if let Some(cached) = self.cache.get(&key) {
            return Ok(cached);
        }

        let zones = self.db.zones().list_by_warehouse(warehouse_id, true).await?;
        let slabs = self
            .db
            .pricing()
            .list_by_warehouse(warehouse_id, true)
            .await?;

        // The engine reports the zone by name; the log wants its id
        let matched_zone_id = find_zone(&zones, destination).map(|z| z.id.clone());
        let result = compute_quote(&warehouse, &zones, &slabs, destination);

        debug!(
            warehouse_id,
            serviceable = result.serviceable,
            distance_km = result.distance_km,
            "Computed quote"
        );

        let entry = QuoteLogEntry {
            id: Uuid::new_v4().to_string(),
            warehouse_id: warehouse_id.to_string(),
            dest_lat: lat,
            dest_lng: lng,
            matched_zone_id,
            distance_km: result.distance_km,
            price: result.price,
            currency: result.currency.clone(),
            created_at: Utc::now(),
        };
        if let Err(err) = self.db.quote_logs().insert(&entry).await {
            // Analytics only; the quote itself is still good
            warn!(warehouse_id, error = %err, "Failed to log quote");
        }

        self.cache.set(key, result.clone());

        Ok(result)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
