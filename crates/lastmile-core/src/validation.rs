//! # Validation Module
//!
//! Input validation for zone and pricing mutations.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Frontend (TypeScript)                                        │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Service boundary (Rust)                                      │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: domain rule validation                               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Everything here runs BEFORE any entity, version, or audit write. A
//! rejected input leaves no trace anywhere.

use crate::error::ValidationError;
use crate::geo::Point;
use crate::money::Money;
use crate::MIN_RING_POINTS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Coordinate Validators
// =============================================================================

/// Validates that a point carries real-world coordinates.
///
/// ## Rules
/// - latitude in [-90, 90]
/// - longitude in [-180, 180]
pub fn validate_point(point: Point) -> ValidationResult<()> {
    if !(-90.0..=90.0).contains(&point.lat) {
        return Err(ValidationError::CoordinateOutOfRange {
            field: "lat".to_string(),
            value: point.lat,
            min: -90.0,
            max: 90.0,
        });
    }
    if !(-180.0..=180.0).contains(&point.lng) {
        return Err(ValidationError::CoordinateOutOfRange {
            field: "lng".to_string(),
            value: point.lng,
            min: -180.0,
            max: 180.0,
        });
    }
    Ok(())
}

/// Validates a zone polygon ring.
///
/// ## Rules
/// - at least 4 vertices
/// - explicitly closed: first vertex equals last vertex exactly
/// - every vertex within coordinate ranges
///
/// ## Example
/// ```rust
/// use lastmile_core::geo::Point;
/// use lastmile_core::validation::validate_ring;
///
/// let ring = vec![
///     Point::new(0.0, 0.0),
///     Point::new(0.0, 1.0),
///     Point::new(1.0, 1.0),
///     Point::new(0.0, 0.0),
/// ];
/// assert!(validate_ring(&ring).is_ok());
/// assert!(validate_ring(&ring[..3]).is_err()); // open and too short
/// ```
pub fn validate_ring(ring: &[Point]) -> ValidationResult<()> {
    if ring.len() < MIN_RING_POINTS {
        return Err(ValidationError::RingTooShort {
            got: ring.len(),
            min: MIN_RING_POINTS,
        });
    }

    // len >= 4 checked above, first/last exist
    if ring[0] != ring[ring.len() - 1] {
        return Err(ValidationError::RingNotClosed);
    }

    for point in ring {
        validate_point(*point)?;
    }

    Ok(())
}

// =============================================================================
// Name Validators
// =============================================================================

/// Validates a zone or slab display name.
///
/// ## Rules
/// - Must not be empty (after trimming)
/// - Must be at most 120 characters
pub fn validate_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 120 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 120,
        });
    }

    Ok(())
}

// =============================================================================
// Pricing Validators
// =============================================================================

/// Validates a slab's distance bracket.
///
/// ## Rules
/// - min_km must not be negative
/// - max_km must be strictly greater than min_km
pub fn validate_bracket(min_km: f64, max_km: f64) -> ValidationResult<()> {
    if min_km < 0.0 {
        return Err(ValidationError::CoordinateOutOfRange {
            field: "min_km".to_string(),
            value: min_km,
            min: 0.0,
            max: f64::MAX,
        });
    }

    if max_km <= min_km {
        return Err(ValidationError::InvalidBracket { min_km, max_km });
    }

    Ok(())
}

/// Validates slab fees.
///
/// ## Rules
/// - Both fees must be non-negative (zero is allowed: free brackets exist
///   for promotional schedules)
pub fn validate_fees(flat_fee: Money, per_km_fee: Money) -> ValidationResult<()> {
    if flat_fee.is_negative() {
        return Err(ValidationError::NegativeFee {
            field: "flat_fee".to_string(),
        });
    }
    if per_km_fee.is_negative() {
        return Err(ValidationError::NegativeFee {
            field: "per_km_fee".to_string(),
        });
    }
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn closed_triangle() -> Vec<Point> {
        vec![
            Point::new(0.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
            Point::new(0.0, 0.0),
        ]
    }

    #[test]
    fn test_validate_point() {
        assert!(validate_point(Point::new(28.61, 77.21)).is_ok());
        assert!(validate_point(Point::new(-90.0, 180.0)).is_ok());
        assert!(validate_point(Point::new(90.1, 0.0)).is_err());
        assert!(validate_point(Point::new(0.0, -180.5)).is_err());
    }

    #[test]
    fn test_validate_ring() {
        assert!(validate_ring(&closed_triangle()).is_ok());

        // Too short
        let short = &closed_triangle()[..3];
        assert!(matches!(
            validate_ring(short),
            Err(ValidationError::RingTooShort { .. })
        ));

        // Unclosed
        let mut open = closed_triangle();
        open[3] = Point::new(2.0, 2.0);
        assert!(matches!(
            validate_ring(&open),
            Err(ValidationError::RingNotClosed)
        ));

        // Bad vertex
        let mut bad = closed_triangle();
        bad[1] = Point::new(99.0, 1.0);
        assert!(matches!(
            validate_ring(&bad),
            Err(ValidationError::CoordinateOutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_name() {
        assert!(validate_name("South Extension").is_ok());
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
        assert!(validate_name(&"z".repeat(200)).is_err());
    }

    #[test]
    fn test_validate_bracket() {
        assert!(validate_bracket(0.0, 5.0).is_ok());
        assert!(validate_bracket(5.0, 12.0).is_ok());

        assert!(validate_bracket(5.0, 5.0).is_err()); // max == min
        assert!(validate_bracket(7.0, 5.0).is_err()); // inverted
        assert!(validate_bracket(-1.0, 5.0).is_err()); // negative floor
    }

    #[test]
    fn test_validate_fees() {
        assert!(validate_fees(Money::zero(), Money::zero()).is_ok());
        assert!(validate_fees(Money::from_minor(3000), Money::from_minor(800)).is_ok());
        assert!(validate_fees(Money::from_minor(-1), Money::zero()).is_err());
        assert!(validate_fees(Money::zero(), Money::from_minor(-1)).is_err());
    }
}
