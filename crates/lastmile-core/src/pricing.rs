//! # Pricing Slab Resolver
//!
//! Selects the distance bracket that applies to a computed distance and
//! turns it into a fee.
//!
//! ## Resolution Policy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Slab Resolution                                     │
//! │                                                                         │
//! │  Active slabs, sorted ascending by min_km:                              │
//! │                                                                         │
//! │    [0 ── 5]  [5 ── 12]  [12 ── 25]                                      │
//! │                                                                         │
//! │  distance = 8.3   → first bracket containing it → [5 ── 12]            │
//! │  distance = 40.0  → nothing contains it → FALLBACK to [12 ── 25]       │
//! │  no slabs at all  → None ("no pricing available")                       │
//! │                                                                         │
//! │  The fallback is deliberate: never refuse silently if some pricing      │
//! │  exists. Far destinations get the outermost slab's rate.                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use crate::money::Money;
use crate::types::PricingSlab;

/// Finds the slab applicable to a distance.
///
/// Slabs are considered in ascending `min_km` order; the first whose
/// inclusive bracket contains the distance wins. When no bracket contains
/// it (beyond nominal coverage, or the schedule has a gap above it), the
/// slab with the greatest `min_km` is returned instead. `None` only when
/// `slabs` is empty.
///
/// Callers pass the warehouse's *active* slabs; inactive slabs never reach
/// this function.
pub fn find_slab<'a>(slabs: &'a [PricingSlab], distance_km: f64) -> Option<&'a PricingSlab> {
    let mut sorted: Vec<&PricingSlab> = slabs.iter().collect();
    sorted.sort_by(|a, b| a.min_km.total_cmp(&b.min_km));

    sorted
        .iter()
        .find(|s| s.covers(distance_km))
        .copied()
        .or_else(|| sorted.last().copied())
}

/// Computes the fee for a distance under a slab.
///
/// `fee = flat_fee + max(0, distance - min_km) × per_km_fee`
///
/// Billable distance is measured from the slab's own `min_km` floor, not
/// from zero: the flat fee already covers the bracket's starting distance.
/// The `max(0, ..)` matters for fallback hits below the outermost slab's
/// floor, where only the flat fee applies.
///
/// ## Example
/// ```rust
/// use lastmile_core::pricing::compute_price;
/// # use lastmile_core::{Money, PricingSlab};
/// # use chrono::Utc;
/// # let slab = PricingSlab {
/// #     id: "s".into(), warehouse_id: "w".into(), name: "0-5 km".into(),
/// #     min_km: 0.0, max_km: 5.0,
/// #     flat_fee: Money::from_minor(3000), per_km_fee: Money::from_minor(800),
/// #     currency: "INR".into(), is_active: true,
/// #     created_at: Utc::now(), updated_at: Utc::now(),
/// # };
/// // ₹30.00 flat + 2.5 km × ₹8.00 = ₹50.00
/// assert_eq!(compute_price(2.5, &slab).minor(), 5000);
/// ```
pub fn compute_price(distance_km: f64, slab: &PricingSlab) -> Money {
    let billable_km = (distance_km - slab.min_km).max(0.0);
    slab.flat_fee + slab.per_km_fee.scale_by_km(billable_km)
}

// =============================================================================
// Unit Tests
// =============================================================================
