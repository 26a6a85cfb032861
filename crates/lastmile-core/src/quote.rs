//! # Quote Engine
//!
//! Zone matching plus the serviceability/price decision.
//!
//! ## Decision Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    compute_quote                                        │
//! │                                                                         │
//! │  destination ──► find_zone(active zones, ascending id)                  │
//! │       │                                                                 │
//! │       ├──► distance_km(warehouse origin, destination)                   │
//! │       │                                                                 │
//! │       └──► find_slab(active slabs, distance)                            │
//! │                                                                         │
//! │  zone AND slab?  ──► serviceable, zone name, price, slab currency       │
//! │  either missing? ──► NOT serviceable, price 0 - but still carrying      │
//! │                      the distance, and the slab's name/currency when    │
//! │                      the slab alone resolved                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `compute_quote` is a pure function over (warehouse, zones, slabs,
//! destination). Writing the quote log and updating the cache are the
//! service layer's responsibility, never the engine's.

use crate::geo::{distance_km, Point};
use crate::money::Money;
use crate::pricing::{compute_price, find_slab};
use crate::types::{PricingSlab, QuoteResult, Warehouse, Zone};
use crate::DEFAULT_CURRENCY;

/// Finds the first active zone containing a point.
///
/// Zones are scanned in ascending-id order - a stable, documented
/// tie-break for overlapping zones, not an area or specificity rule. The
/// caller may pass zones in any order; inactive zones are skipped here so
/// the engine can take a warehouse's full zone set.
pub fn find_zone<'a>(zones: &'a [Zone], point: Point) -> Option<&'a Zone> {
    let mut active: Vec<&Zone> = zones.iter().filter(|z| z.is_active).collect();
    active.sort_by(|a, b| a.id.cmp(&b.id));

    active.into_iter().find(|z| z.contains(point))
}

/// Computes a full quote decision for a destination.
///
/// See the module docs for the policy. Only the *joint* presence of a
/// matched zone and a resolved slab makes a destination serviceable; a
/// single miss of either is enough to mark it non-serviceable, but never
/// blanks the information the other side produced.
pub fn compute_quote(
    warehouse: &Warehouse,
    zones: &[Zone],
    slabs: &[PricingSlab],
    destination: Point,
) -> QuoteResult {
    let zone = find_zone(zones, destination);
    let distance = distance_km(warehouse.origin(), destination);

    let active_slabs: Vec<PricingSlab> =
        slabs.iter().filter(|s| s.is_active).cloned().collect();
    let slab = find_slab(&active_slabs, distance);

    let distance_rounded = round_to(distance, crate::DISTANCE_DECIMALS);

    match (zone, slab) {
        (Some(zone), Some(slab)) => QuoteResult {
            serviceable: true,
            matched_zone: Some(zone.name.clone()),
            distance_km: distance_rounded,
            price: compute_price(distance, slab),
            currency: slab.currency.clone(),
            slab_name: Some(slab.name.clone()),
        },
        (_, slab) => QuoteResult {
            serviceable: false,
            matched_zone: None,
            distance_km: distance_rounded,
            price: Money::zero(),
            currency: slab
                .map(|s| s.currency.clone())
                .unwrap_or_else(|| DEFAULT_CURRENCY.to_string()),
            slab_name: slab.map(|s| s.name.clone()),
        },
    }
}

/// Rounds to a fixed number of decimal places (half away from zero).
fn round_to(value: f64, decimals: u32) -> f64 {
    let factor = 10f64.powi(decimals as i32);
    (value * factor).round() / factor
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn warehouse() -> Warehouse {
        Warehouse {
            id: "w1".into(),
            name: "Connaught Place".into(),
            lat: 28.6139,
            lng: 77.2090,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn rectangle_zone(id: &str, name: &str) -> Zone {
        Zone {
            id: id.into(),
            warehouse_id: "w1".into(),
            name: name.into(),
            color: "#7C3AED".into(),
            ring: vec![
                Point::new(28.7041, 77.1025),
                Point::new(28.7041, 77.2800),
                Point::new(28.5200, 77.2800),
                Point::new(28.5200, 77.1025),
                Point::new(28.7041, 77.1025),
            ],
            is_active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn city_slab() -> PricingSlab {
        PricingSlab {
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
        }
    }

    #[test]
    fn test_serviceable_quote_inside_zone() {
        // Scenario: destination inside the rectangle, one 0-5 km slab.
        let wh = warehouse();
        let zones = vec![rectangle_zone("z1", "Central")];
        let slabs = vec![city_slab()];
        let dest = Point::new(28.62, 77.21);

        let quote = compute_quote(&wh, &zones, &slabs, dest);

        assert!(quote.serviceable);
        assert_eq!(quote.matched_zone.as_deref(), Some("Central"));
        assert_eq!(quote.slab_name.as_deref(), Some("0-5 km"));
        assert_eq!(quote.currency, "INR");

        // price = 30.00 + billable_km × 8.00, billable = distance (min_km=0)
        let expected = Money::from_minor(3000)
            + Money::from_minor(800).scale_by_km(distance_km(wh.origin(), dest));
        assert_eq!(quote.price, expected);
        assert!(quote.distance_km > 0.0 && quote.distance_km < 1.0);
    }

    #[test]
    fn test_far_destination_not_serviceable_but_informative() {
        // Scenario: far outside the rectangle. Zone misses, slab falls
        // back, distance still reported.
        let wh = warehouse();
        let zones = vec![rectangle_zone("z1", "Central")];
        let slabs = vec![city_slab()];

        let quote = compute_quote(&wh, &zones, &slabs, Point::new(10.0, 10.0));

        assert!(!quote.serviceable);
        assert_eq!(quote.matched_zone, None);
        assert_eq!(quote.price, Money::zero());
        assert!(quote.distance_km > 1000.0); // real haversine distance
        assert_eq!(quote.slab_name.as_deref(), Some("0-5 km")); // fallback slab
        assert_eq!(quote.currency, "INR");
    }

    #[test]
    fn test_no_slabs_defaults_currency() {
        // Scenario: inside a zone but the warehouse has no active slabs.
        let wh = warehouse();
        let zones = vec![rectangle_zone("z1", "Central")];

        let quote = compute_quote(&wh, &zones, &[], Point::new(28.62, 77.21));

        assert!(!quote.serviceable);
        assert_eq!(quote.slab_name, None);
        assert_eq!(quote.currency, "INR");
        assert_eq!(quote.price, Money::zero());
    }

    #[test]
    fn test_inactive_slabs_are_ignored() {
        let wh = warehouse();
        let zones = vec![rectangle_zone("z1", "Central")];
        let mut slab = city_slab();
        slab.is_active = false;

        let quote = compute_quote(&wh, &zones, &[slab], Point::new(28.62, 77.21));

        assert!(!quote.serviceable);
        assert_eq!(quote.slab_name, None);
    }

    #[test]
    fn test_overlapping_zones_resolve_by_ascending_id() {
        let wh = warehouse();
        // Identical rings, different ids; pass them out of order.
        let zones = vec![
            rectangle_zone("z9", "Later"),
            rectangle_zone("z1", "Earlier"),
        ];
        let slabs = vec![city_slab()];

        let quote = compute_quote(&wh, &zones, &slabs, Point::new(28.62, 77.21));
        assert_eq!(quote.matched_zone.as_deref(), Some("Earlier"));
    }

    #[test]
    fn test_inactive_zone_does_not_match() {
        let wh = warehouse();
        let mut zone = rectangle_zone("z1", "Central");
        zone.is_active = false;
        let slabs = vec![city_slab()];

        let quote = compute_quote(&wh, &[zone], &slabs, Point::new(28.62, 77.21));
        assert!(!quote.serviceable);
        assert_eq!(quote.matched_zone, None);
        // Slab info still present: only the zone missed.
        assert_eq!(quote.slab_name.as_deref(), Some("0-5 km"));
    }

    #[test]
    fn test_distance_rounded_to_three_decimals() {
        let wh = warehouse();
        let quote = compute_quote(&wh, &[], &[], Point::new(28.62, 77.21));
        let scaled = quote.distance_km * 1000.0;
        assert!((scaled - scaled.round()).abs() < 1e-9);
    }
}
