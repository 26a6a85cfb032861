//! # Repository Pattern Implementation
//!
//! One repository per aggregate. Repositories hold a cheap clone of the
//! `SqlitePool` and translate between SQLite rows and `lastmile-core`
//! domain types.
//!
//! ## Row Mapping
//! Polygon rings and ledger snapshots are stored as JSON TEXT. Each
//! repository keeps a private `*Row` struct deriving `sqlx::FromRow`
//! and converts it to the domain type, so JSON parsing failures surface
//! as `DbError::Serialization` instead of panics.

pub mod ledger;
pub mod pricing;
pub mod quote_log;
pub mod warehouse;
pub mod zone;
