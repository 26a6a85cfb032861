//! # Error Types
//!
//! Domain-specific error types for lastmile-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  lastmile-core errors (this file)                                      │
//! │  ├── CoreError        - General domain errors                          │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  lastmile-db errors (separate crate)                                   │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  lastmile-service errors (separate crate)                              │
//! │  └── ServiceError     - What callers of the service layer see          │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ServiceError → Caller   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A quote that turns out non-serviceable is NOT an error anywhere in this
//! hierarchy - it is an ordinary [`crate::types::QuoteResult`]. Errors mean
//! "failed to compute", never "computed, but no service here".
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (field, id, bounds)
//! 3. Errors are enum variants, never String
//! 4. Each error variant maps to a user-facing message

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent domain rule violations. They should be caught and
/// translated to user-friendly messages at the service boundary.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Warehouse cannot be found (or is inactive).
    #[error("Warehouse not found: {0}")]
    WarehouseNotFound(String),

    /// Zone cannot be found.
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),

    /// Pricing slab cannot be found.
    #[error("Pricing slab not found: {0}")]
    SlabNotFound(String),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when admin input doesn't meet requirements.
/// They are raised before any mutation, version, or audit write happens.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// A polygon ring has too few vertices (after auto-close).
    #[error("polygon must have at least {min} points, got {got}")]
    RingTooShort { got: usize, min: usize },

    /// A polygon ring is not closed (first vertex != last vertex).
    #[error("polygon ring is not closed")]
    RingNotClosed,

    /// A coordinate is outside valid latitude/longitude ranges.
    #[error("{field} {value} is out of range [{min}, {max}]")]
    CoordinateOutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A distance bracket where max_km does not exceed min_km.
    #[error("invalid bracket: max_km {max_km} must be greater than min_km {min_km}")]
    InvalidBracket { min_km: f64, max_km: f64 },

    /// A fee that is negative.
    #[error("{field} must not be negative")]
    NegativeFee { field: String },

    /// Invalid format (e.g., malformed GeoJSON, wrong point arity).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = ValidationError::InvalidBracket {
            min_km: 5.0,
            max_km: 5.0,
        };
        assert_eq!(
            err.to_string(),
            "invalid bracket: max_km 5 must be greater than min_km 5"
        );

        let err = ValidationError::RingTooShort { got: 3, min: 4 };
        assert_eq!(err.to_string(), "polygon must have at least 4 points, got 3");
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::Required {
            field: "name".to_string(),
        };
        let core_err: CoreError = validation_err.into();
        assert!(matches!(core_err, CoreError::Validation(_)));
    }
}
