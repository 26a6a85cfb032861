//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  In a quoting system that means ₹48.76 becoming ₹48.759999999,         │
//! │  and two identical quote requests disagreeing by a paisa.              │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Minor Units (paise)                              │
//! │    flat_fee = 3000 paise, per_km_fee = 800 paise                       │
//! │    The single float → money crossing (km × rate) rounds exactly        │
//! │    once, to the nearest paisa - which is the quoted 2-decimal price.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use lastmile_core::money::Money;
//!
//! // Create from minor units (preferred)
//! let flat_fee = Money::from_minor(3000); // ₹30.00
//!
//! // Arithmetic operations
//! let total = flat_fee + Money::from_minor(1876); // ₹48.76
//! assert_eq!(total.minor(), 4876);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (paise for INR).
///
/// ## Design Decisions
/// - **i64 (signed)**: Allows negative values for adjustments/refunds
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Serializes as a bare integer**: The wire format is minor units
///
/// The currency itself (e.g. `"INR"`) travels alongside on the owning
/// entity; `Money` is deliberately currency-agnostic arithmetic.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(transparent))]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units (paise).
    ///
    /// ## Example
    /// ```rust
    /// use lastmile_core::money::Money;
    ///
    /// let fee = Money::from_minor(3000); // Represents ₹30.00
    /// assert_eq!(fee.minor(), 3000);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from major units (whole rupees).
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * 100)
    }

    /// Returns the value in minor units (paise).
    #[inline]
    pub const fn minor(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rupees) portion.
    #[inline]
    pub const fn major_part(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies this per-unit rate by a (possibly fractional) kilometre
    /// count, rounding to the nearest minor unit.
    ///
    /// This is the one place a float crosses into money. Rounding happens
    /// exactly once, here, so a quoted price is always an exact number of
    /// paise - i.e. exact to 2 decimals.
    ///
    /// ## Example
    /// ```rust
    /// use lastmile_core::money::Money;
    ///
    /// let per_km = Money::from_minor(800); // ₹8.00 per km
    /// let charge = per_km.scale_by_km(2.345);
    /// assert_eq!(charge.minor(), 1876);    // ₹18.76
    /// ```
    pub fn scale_by_km(&self, km: f64) -> Money {
        Money((self.0 as f64 * km).round() as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money in a human-readable format.
///
/// ## Note
/// This is for logs and debugging. The frontend formats prices itself from
/// the minor-unit integer plus the currency code.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major_part().abs(), self.minor_part())
    }
}

/// Default money is zero.
impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_minor() {
        let money = Money::from_minor(4876);
        assert_eq!(money.minor(), 4876);
        assert_eq!(money.major_part(), 48);
        assert_eq!(money.minor_part(), 76);
    }

    #[test]
    fn test_from_major() {
        assert_eq!(Money::from_major(30).minor(), 3000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_minor(4876)), "48.76");
        assert_eq!(format!("{}", Money::from_minor(500)), "5.00");
        assert_eq!(format!("{}", Money::from_minor(-550)), "-5.50");
        assert_eq!(format!("{}", Money::from_minor(0)), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(500);

        assert_eq!((a + b).minor(), 1500);
        assert_eq!((a - b).minor(), 500);

        let mut c = a;
        c += b;
        assert_eq!(c.minor(), 1500);
    }

    #[test]
    fn test_scale_by_km_rounds_to_paisa() {
        let per_km = Money::from_minor(800);

        // 2.345 km × ₹8.00 = ₹18.76 exactly
        assert_eq!(per_km.scale_by_km(2.345).minor(), 1876);

        // 0.0004 km × ₹8.00 = 0.32 paise → rounds to 0
        assert_eq!(per_km.scale_by_km(0.0004).minor(), 0);

        // Zero distance charges nothing
        assert_eq!(per_km.scale_by_km(0.0).minor(), 0);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_negative());

        assert!(Money::from_minor(-100).is_negative());
        assert_eq!(Money::default(), Money::zero());
    }
}
