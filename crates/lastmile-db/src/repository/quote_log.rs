//! # Quote Log Repository
//!
//! Append-only analytics trail of computed quotes. Quote evaluation
//! writes here on every cache miss; nothing in the engine reads it
//! back, so a failed log write must never fail the quote (the service
//! layer logs and drops the error).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use lastmile_core::types::QuoteLogEntry;
use lastmile_core::Money;

use crate::error::DbResult;

#[derive(Debug, sqlx::FromRow)]
struct QuoteLogRow {
    id: String,
    warehouse_id: String,
    dest_lat: f64,
    dest_lng: f64,
    matched_zone_id: Option<String>,
    distance_km: f64,
    price: Money,
    currency: String,
    created_at: DateTime<Utc>,
}

impl From<QuoteLogRow> for QuoteLogEntry {
    fn from(row: QuoteLogRow) -> Self {
        QuoteLogEntry {
            id: row.id,
            warehouse_id: row.warehouse_id,
            dest_lat: row.dest_lat,
            dest_lng: row.dest_lng,
            matched_zone_id: row.matched_zone_id,
            distance_km: row.distance_km,
            price: row.price,
            currency: row.currency,
            created_at: row.created_at,
        }
    }
}

/// Repository for quote log entries.
#[derive(Debug, Clone)]
pub struct QuoteLogRepository {
    pool: SqlitePool,
}

impl QuoteLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        QuoteLogRepository { pool }
    }

    /// Appends a quote log entry. Runs on the pool; quote evaluation
    /// has no transaction to join.
    pub async fn insert(&self, entry: &QuoteLogEntry) -> DbResult<()> {
        sqlx::query(
            "INSERT INTO quote_logs
                 (id, warehouse_id, dest_lat, dest_lng, matched_zone_id,
                  distance_km, price, currency, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&entry.id)
        .bind(&entry.warehouse_id)
        .bind(entry.dest_lat)
        .bind(entry.dest_lng)
        .bind(&entry.matched_zone_id)
        .bind(entry.distance_km)
        .bind(entry.price)
        .bind(&entry.currency)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        debug!(warehouse_id = %entry.warehouse_id, "Logged quote");

        Ok(())
    }

    /// Recent quotes for a warehouse, newest first.
    pub async fn recent_for_warehouse(
        &self,
        warehouse_id: &str,
        limit: i64,
    ) -> DbResult<Vec<QuoteLogEntry>> {
        let rows = sqlx::query_as::<_, QuoteLogRow>(
            "SELECT id, warehouse_id, dest_lat, dest_lng, matched_zone_id,
                    distance_km, price, currency, created_at
             FROM quote_logs WHERE warehouse_id = ?
             ORDER BY created_at DESC, id DESC
             LIMIT ?",
        )
        .bind(warehouse_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
