//! # lastmile-service: Orchestration Layer
//!
//! Composes the pure quoting core with the SQLite persistence layer.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Lastmile Stack                                      │
//! │                                                                         │
//! │  ┌────────────────────┐                                                 │
//! │  │  lastmile-service  │  ◄── YOU ARE HERE                              │
//! │  │                    │                                                 │
//! │  │  • QuoteService    │  cache ► compute ► log                         │
//! │  │  • ZoneService     │  CRUD + GeoJSON + versions + audit             │
//! │  │  • PricingService  │  CRUD + versions + audit                       │
//! │  │  • QuoteCache      │  TTL/LRU, cleared on any mutation              │
//! │  └─────────┬──────────┘                                                 │
//! │            ▼                                                            │
//! │     lastmile-db  ──►  lastmile-core                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Wiring
//! ```rust,ignore
//! let db = Database::new(DbConfig::new("./lastmile.db")).await?;
//! let cache = Arc::new(QuoteCache::new(CacheConfig::default()));
//!
//! let quotes = QuoteService::new(db.clone(), cache.clone());
//! let zones = ZoneService::new(db.clone(), cache.clone());
//! let pricing = PricingService::new(db, cache);
//! ```
//! All three services share ONE cache so any zone or pricing mutation
//! invalidates every cached quote.

pub mod cache;
pub mod error;
pub mod pricing;
pub mod quote;
pub mod zones;

pub use cache::{CacheConfig, QuoteCache};
pub use error::{ServiceError, ServiceResult};
pub use pricing::{CreateSlab, PricingService, UpdateSlab};
pub use quote::QuoteService;
pub use zones::{CreateZone, ImportSummary, UpdateZone, ZoneService};
