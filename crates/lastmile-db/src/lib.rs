//! # lastmile-db: Database Layer
//!
//! SQLite persistence for the Lastmile delivery quoting engine.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Lastmile Stack                                      │
//! │                                                                         │
//! │  ┌────────────────────┐                                                 │
//! │  │  lastmile-service  │  Quote service, admin services, cache          │
//! │  └─────────┬──────────┘                                                 │
//! │            │ calls                                                      │
//! │            ▼                                                            │
//! │  ┌────────────────────┐                                                 │
//! │  │   lastmile-db      │  ◄── YOU ARE HERE                              │
//! │  │                    │                                                 │
//! │  │  • Repositories    │  Warehouse, Zone, Pricing, Ledger, QuoteLog    │
//! │  │  • Migrations      │  Embedded schema                               │
//! │  │  • Pool            │  SqlitePool with WAL                           │
//! │  └─────────┬──────────┘                                                 │
//! │            │ uses types from                                            │
//! │            ▼                                                            │
//! │  ┌────────────────────┐                                                 │
//! │  │   lastmile-core    │  Pure domain types + math (no I/O)             │
//! │  └────────────────────┘                                                 │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Transaction Convention
//! Read methods take `&self` and run on the pool. Write methods take a
//! `&mut SqliteConnection` so callers can group entity + version + audit
//! writes into one transaction:
//!
//! ```rust,ignore
//! let mut tx = db.pool().begin().await?;
//! db.zones().insert(&mut *tx, &zone).await?;
//! db.ledger().record_zone_version(&mut *tx, &version).await?;
//! db.ledger().record_audit(&mut *tx, &audit).await?;
//! tx.commit().await?;
//! ```

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// Re-export commonly used types at crate root
pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};
pub use repository::ledger::LedgerRepository;
pub use repository::pricing::PricingRepository;
pub use repository::quote_log::QuoteLogRepository;
pub use repository::warehouse::WarehouseRepository;
pub use repository::zone::ZoneRepository;
