//! # Geo Kernel
//!
//! Great-circle distance and point-in-polygon primitives.
//!
//! Both functions are pure, deterministic, and have no failure modes.
//! Coordinates are plain degrees; callers guarantee valid ranges (the
//! validation module enforces them at the admin boundary).
//!
//! ## Planar approximation
//! `point_in_polygon` treats the ring as planar in (lat, lng) space rather
//! than geodesic. At city scale (zones a few kilometres across) the error
//! is far below the 5-decimal cache rounding, so the simpler test wins.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Mean Earth radius in kilometres, used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Epsilon substituted for a zero denominator when a polygon edge is
/// horizontal in latitude. Keeps the ray-cast division defined without
/// changing the crossing parity for real intersections.
const EDGE_EPSILON: f64 = 1e-12;

// =============================================================================
// Point
// =============================================================================

/// A geographic coordinate in degrees, latitude first.
///
/// Internal code always carries (lat, lng) in this order. The GeoJSON
/// boundary is the only place the order flips - see [`crate::geojson`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Point {
    pub lat: f64,
    pub lng: f64,
}

impl Point {
    /// Creates a point from latitude and longitude degrees.
    #[inline]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Point { lat, lng }
    }
}

// =============================================================================
// Distance
// =============================================================================

/// Great-circle distance between two points in kilometres (haversine).
///
/// The result is unrounded; rounding for display is the caller's
/// responsibility (the quote engine rounds to 3 decimals).
///
/// ## Example
/// ```rust
/// use lastmile_core::geo::{distance_km, Point};
///
/// let a = Point::new(28.6139, 77.2090);
/// let b = Point::new(28.7041, 77.1025);
///
/// let d = distance_km(a, b);
/// assert!(d > 14.0 && d < 15.0);
/// ```
pub fn distance_km(a: Point, b: Point) -> f64 {
    let phi1 = a.lat.to_radians();
    let phi2 = b.lat.to_radians();
    let d_phi = (b.lat - a.lat).to_radians();
    let d_lambda = (b.lng - a.lng).to_radians();

    let h = (d_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}

// =============================================================================
// Point-in-Polygon
// =============================================================================

/// Even-odd ray-casting containment test over a closed ring.
///
/// The ring must be explicitly closed (first vertex == last vertex); the
/// final edge is implied by iterating vertex pairs, so the repeated point
/// contributes a zero-length edge that never intersects the ray.
///
/// A point exactly on a vertex or edge has an implementation-defined
/// result. That is an accepted approximation at zone-boundary scale, not
/// something callers should compensate for.
///
/// ## Example
/// ```rust
/// use lastmile_core::geo::{point_in_polygon, Point};
///
/// let ring = vec![
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 10.0),
///     Point::new(10.0, 10.0),
///     Point::new(10.0, 0.0),
///     Point::new(0.0, 0.0),
/// ];
///
/// assert!(point_in_polygon(Point::new(5.0, 5.0), &ring));
/// assert!(!point_in_polygon(Point::new(15.0, 5.0), &ring));
/// ```
pub fn point_in_polygon(point: Point, ring: &[Point]) -> bool {
    let x = point.lng;
    let y = point.lat;

    let mut inside = false;
    for pair in ring.windows(2) {
        let (y1, x1) = (pair[0].lat, pair[0].lng);
        let (y2, x2) = (pair[1].lat, pair[1].lng);

        // Does the horizontal ray from `point` cross this edge?
        let straddles = (y1 > y) != (y2 > y);
        if !straddles {
            continue;
        }

        let mut dy = y2 - y1;
        if dy == 0.0 {
            dy = EDGE_EPSILON;
        }

        let x_at_y = (x2 - x1) * (y - y1) / dy + x1;
        if x < x_at_y {
            inside = !inside;
        }
    }

    inside
}

// =============================================================================
// Unit Tests
// =============================================================================
