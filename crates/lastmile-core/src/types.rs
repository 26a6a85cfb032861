//! # Domain Types
//!
//! Core domain types used throughout Lastmile.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │   Warehouse     │   │      Zone       │   │  PricingSlab    │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  id (UUID)      │       │
//! │  │  lat / lng      │   │  warehouse_id   │   │  warehouse_id   │       │
//! │  │  is_active      │   │  ring (closed)  │   │  min_km/max_km  │       │
//! │  └─────────────────┘   │  is_active      │   │  fees (Money)   │       │
//! │                        └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  ZoneVersion /  │   │  AuditRecord    │   │  QuoteResult    │       │
//! │  │  PricingVersion │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  ─────────────  │   │  before/after   │   │  serviceable    │       │
//! │  │  version (1..)  │   │  JSON snapshots │   │  distance/price │       │
//! │  │  JSON snapshot  │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Versions and audit records are append-only: once written they are never
//! mutated, so their snapshots preserve history even after the live entity
//! changes again.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::geo::Point;
use crate::money::Money;

// =============================================================================
// Change Action
// =============================================================================

/// The admin action that produced a version or audit record.
///
/// `Export` never appears on version records (exporting mutates nothing);
/// it exists for the bulk-export audit trail only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum ChangeAction {
    Create,
    Update,
    Disable,
    Import,
    Export,
}

// =============================================================================
// Entity Kind
// =============================================================================

/// The kind of versioned entity, for audit records and ledger routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "UPPERCASE"))]
#[ts(export)]
#[serde(rename_all = "UPPERCASE")]
pub enum EntityKind {
    Zone,
    Pricing,
}

// =============================================================================
// Warehouse
// =============================================================================

/// A dispatch origin. Every distance in a quote is measured from here.
///
/// Warehouses are effectively immutable once referenced by quotes; only the
/// active flag toggles.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Warehouse {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name shown in the admin console.
    pub name: String,

    /// Origin latitude in degrees.
    pub lat: f64,

    /// Origin longitude in degrees.
    pub lng: f64,

    /// Whether the warehouse accepts quotes (soft delete).
    pub is_active: bool,

    /// When the warehouse was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl Warehouse {
    /// Returns the warehouse origin as a geo point.
    #[inline]
    pub fn origin(&self) -> Point {
        Point::new(self.lat, self.lng)
    }
}

// =============================================================================
// Zone
// =============================================================================

/// A closed polygon region around a warehouse defining serviceable area.
///
/// ## Invariants
/// - `ring` has at least 4 vertices
/// - `ring` is explicitly closed (first vertex equals last vertex exactly)
///
/// Both are enforced by [`crate::validation::validate_ring`] before any
/// write. Updates replace name/color/ring in place (same entity id) and
/// bump the zone's version; "deletion" flips `is_active` and versions too.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Zone {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning warehouse.
    pub warehouse_id: String,

    /// Display name ("South Extension", "Sector 18", ...).
    pub name: String,

    /// Display color for the admin map. Never interpreted by the core.
    pub color: String,

    /// Closed (lat, lng) ring, internal vertex order.
    pub ring: Vec<Point>,

    /// Whether the zone participates in matching (soft delete).
    pub is_active: bool,

    /// When the zone was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the zone was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Zone {
    /// Tests whether a destination lies inside this zone's polygon.
    #[inline]
    pub fn contains(&self, point: Point) -> bool {
        crate::geo::point_in_polygon(point, &self.ring)
    }
}

// =============================================================================
// Pricing Slab
// =============================================================================

/// A distance-bracket pricing rule: flat fee plus a per-kilometre rate.
///
/// Multiple slabs per warehouse form a piecewise distance-to-fee schedule.
/// Slabs should not gap or overlap, but that is not enforced - the
/// resolver's first-match + outermost-fallback policy handles both.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingSlab {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Owning warehouse.
    pub warehouse_id: String,

    /// Display name ("0-5 km", "City", ...).
    pub name: String,

    /// Bracket floor in kilometres (inclusive).
    pub min_km: f64,

    /// Bracket ceiling in kilometres (inclusive). Always > `min_km`.
    pub max_km: f64,

    /// Base charge covering the bracket's starting distance.
    pub flat_fee: Money,

    /// Charge per kilometre above `min_km`.
    pub per_km_fee: Money,

    /// ISO currency code ("INR").
    pub currency: String,

    /// Whether the slab participates in resolution (soft delete).
    pub is_active: bool,

    /// When the slab was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the slab was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl PricingSlab {
    /// Checks whether a distance falls inside this bracket (inclusive on
    /// both ends, matching the resolver's `min_km <= d <= max_km` rule).
    #[inline]
    pub fn covers(&self, distance_km: f64) -> bool {
        self.min_km <= distance_km && distance_km <= self.max_km
    }
}

// =============================================================================
// Version Records
// =============================================================================

/// An immutable snapshot of a zone taken after a mutation.
///
/// Version numbers are per-zone: they start at 1, advance by exactly 1 per
/// mutation of that zone, and are never reused - even after a disable.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ZoneVersion {
    pub id: String,
    pub zone_id: String,
    pub version: i64,
    pub action: ChangeAction,
    /// Acting admin identifier.
    pub actor: String,
    /// Full-field snapshot of the zone's post-mutation state.
    #[ts(type = "unknown")]
    pub snapshot: serde_json::Value,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// An immutable snapshot of a pricing slab taken after a mutation.
///
/// Numbering rules are identical to [`ZoneVersion`] and independent of it:
/// each entity id counts its own mutations.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PricingVersion {
    pub id: String,
    pub pricing_id: String,
    pub version: i64,
    pub action: ChangeAction,
    pub actor: String,
    #[ts(type = "unknown")]
    pub snapshot: serde_json::Value,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Audit Record
// =============================================================================

/// An append-only record of who changed what.
///
/// Before/after are opaque structured snapshots, not entity references:
/// they keep historical state intact even if the entity changes further.
/// `before` is `None` on creation; `entity_id` is `None` on bulk
/// operations (import/export).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditRecord {
    pub id: String,
    pub actor: String,
    pub action: ChangeAction,
    pub entity_kind: EntityKind,
    pub entity_id: Option<String>,
    #[ts(type = "unknown | null")]
    pub before: Option<serde_json::Value>,
    #[ts(type = "unknown | null")]
    pub after: Option<serde_json::Value>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Quote Log
// =============================================================================

/// One computed quote, kept for analytics. Never read back by the core.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteLogEntry {
    pub id: String,
    pub warehouse_id: String,
    pub dest_lat: f64,
    pub dest_lng: f64,
    /// Matched zone, when one contained the destination.
    pub matched_zone_id: Option<String>,
    pub distance_km: f64,
    pub price: Money,
    pub currency: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Quote Result
// =============================================================================

/// The outcome of a quote computation.
///
/// ## Serviceability
/// `serviceable` is true only when BOTH a zone matched and a slab
/// resolved. A non-serviceable result is still fully formed:
///
/// - `distance_km` is always the real haversine distance
/// - `slab_name`/`currency` come from the fallback slab when one resolved,
///   even if no zone matched (and vice versa, a zone miss does not blank
///   the distance)
/// - `price` is zero exactly when not serviceable
///
/// This asymmetric partial fill is deliberate best-effort information for
/// the caller, preserved from the original decision policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct QuoteResult {
    pub serviceable: bool,
    pub matched_zone: Option<String>,
    /// Rounded to 3 decimal places.
    pub distance_km: f64,
    /// Minor currency units; zero when not serviceable.
    pub price: Money,
    pub currency: String,
    pub slab_name: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_action_wire_format() {
        assert_eq!(
            serde_json::to_string(&ChangeAction::Create).unwrap(),
            "\"CREATE\""
        );
        assert_eq!(
            serde_json::to_string(&ChangeAction::Disable).unwrap(),
            "\"DISABLE\""
        );
    }

    #[test]
    fn test_slab_covers_is_inclusive() {
        let slab = PricingSlab {
            id: "s1".into(),
            warehouse_id: "w1".into(),
            name: "0-5 km".into(),
            min_km: 0.0,
            max_km: 5.0,
            flat_fee: Money::from_minor(3000),
            per_km_fee: Money::from_minor(800),
            currency: "INR".into(),
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert!(slab.covers(0.0));
        assert!(slab.covers(5.0));
        assert!(!slab.covers(5.001));
    }

    #[test]
    fn test_warehouse_origin() {
        let wh = Warehouse {
            id: "w1".into(),
            name: "Okhla".into(),
            lat: 28.6139,
            lng: 77.2090,
            is_active: true,
            created_at: Utc::now(),
        };
        let origin = wh.origin();
        assert_eq!(origin.lat, 28.6139);
        assert_eq!(origin.lng, 77.2090);
    }
}
