//! # lastmile-core: Pure Business Logic for Lastmile
//!
//! This crate is the **heart** of Lastmile. It contains all quoting
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Lastmile Architecture                             │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  lastmile-service (orchestration)               │   │
//! │  │    quote lookup ──► cache ──► engine ──► quote log              │   │
//! │  │    zone/slab mutation ──► ledger ──► cache clear                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ lastmile-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │    geo    │  │  pricing  │  │   quote   │  │  geojson  │  │   │
//! │  │   │ haversine │  │ find_slab │  │ find_zone │  │ ring swap │  │   │
//! │  │   │ ray cast  │  │ fee math  │  │ engine    │  │ + close   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  lastmile-db (Database Layer)                   │   │
//! │  │         SQLite repositories, versioning + audit ledger          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Warehouse, Zone, PricingSlab, versions, audit)
//! - [`geo`] - Great-circle distance and point-in-polygon primitives
//! - [`pricing`] - Slab resolution and fee computation
//! - [`quote`] - Zone matching and the quote engine
//! - [`geojson`] - GeoJSON ring interchange (lng,lat on the wire)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`validation`] - Input validation for zones and slabs
//! - [`error`] - Domain error types
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - same input = same output
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All fees are in minor units (i64) to avoid float errors
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use lastmile_core::geo::{distance_km, Point};
//!
//! let warehouse = Point::new(28.6139, 77.2090);
//! let destination = Point::new(28.62, 77.21);
//!
//! let d = distance_km(warehouse, destination);
//! assert!(d < 1.0); // well under a kilometer
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod geo;
pub mod geojson;
pub mod money;
pub mod pricing;
pub mod quote;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use lastmile_core::Money` instead of
// `use lastmile_core::money::Money`

pub use error::{CoreError, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default currency when no pricing slab resolved at all.
///
/// ## Why a constant?
/// A non-serviceable quote still carries a currency so the frontend can
/// render "0.00 INR" without special-casing. When a fallback slab exists,
/// its own currency wins over this default.
pub const DEFAULT_CURRENCY: &str = "INR";

/// Minimum number of vertices in a stored polygon ring.
///
/// ## Business Reason
/// A closed triangle needs 4 points (first repeated at the end). Anything
/// shorter cannot enclose area and is rejected at validation.
pub const MIN_RING_POINTS: usize = 4;

/// Decimal places used when rounding quoted distances.
pub const DISTANCE_DECIMALS: u32 = 3;
