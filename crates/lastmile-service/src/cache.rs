//! # Quote Cache
//!
//! In-process cache for computed quotes.
//!
//! ## Cache Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        QuoteCache                                       │
//! │                                                                         │
//! │  key = "{warehouse_id}:{lat:.5}:{lng:.5}"                               │
//! │         └── 5-decimal rounding ≈ 1.1 m; nearby requests share entries   │
//! │                                                                         │
//! │  get(key)  ──► hit if present AND younger than TTL (600 s default)     │
//! │  set(key)  ──► evicts the least-recently-used entry at capacity        │
//! │  clear()   ──► wipes everything; called on ANY zone/slab mutation      │
//! │                                                                         │
//! │  Best-effort only: a cold or cleared cache changes latency, never      │
//! │  answers.                                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Mutations clear the whole cache rather than hunting down affected
//! keys - a zone edit can change the answer for any destination of that
//! warehouse, and entries are cheap to recompute.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use tracing::debug;

use lastmile_core::types::QuoteResult;

/// Default maximum number of cached quotes.
pub const DEFAULT_CAPACITY: usize = 5000;

/// Default entry lifetime.
pub const DEFAULT_TTL: Duration = Duration::from_secs(600);

// =============================================================================
// Configuration
// =============================================================================

/// Cache tuning knobs, injected at construction. No ambient statics.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    pub capacity: usize,
    pub ttl: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: DEFAULT_CAPACITY,
            ttl: DEFAULT_TTL,
        }
    }
}

// =============================================================================
// Cache
// =============================================================================

#[derive(Debug)]
struct CacheEntry {
    result: QuoteResult,
    inserted_at: Instant,
    last_used: Instant,
}

/// TTL + capacity bounded quote cache.
///
/// Interior mutability behind a `std::sync::Mutex`; share via `Arc`.
/// The lock is held only for map operations, never across I/O.
#[derive(Debug)]
pub struct QuoteCache {
    config: CacheConfig,
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl QuoteCache {
    pub fn new(config: CacheConfig) -> Self {
        QuoteCache {
            config,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Builds a cache key from a warehouse and destination.
    ///
    /// Rounding to 5 decimals before formatting makes keys insensitive
    /// to float noise past ~1 metre.
    pub fn key(warehouse_id: &str, lat: f64, lng: f64) -> String {
        format!("{warehouse_id}:{lat:.5}:{lng:.5}")
    }

    /// Looks up a quote. Expired entries read as absent (and are
    /// dropped on the way out).
    pub fn get(&self, key: &str) -> Option<QuoteResult> {
        let mut entries = self.entries.lock().ok()?;

        match entries.get_mut(key) {
            Some(entry) if entry.inserted_at.elapsed() < self.config.ttl => {
                entry.last_used = Instant::now();
                debug!(key, "Quote cache hit");
                Some(entry.result.clone())
            }
            Some(_) => {
                entries.remove(key);
                debug!(key, "Quote cache entry expired");
                None
            }
            None => None,
        }
    }

    /// Stores a quote, evicting the least-recently-used entry when the
    /// cache is full.
    pub fn set(&self, key: String, result: QuoteResult) {
        let Ok(mut entries) = self.entries.lock() else {
            return;
        };

        if entries.len() >= self.config.capacity && !entries.contains_key(&key) {
            let oldest = entries
                .iter()
                .min_by_key(|(_, e)| e.last_used)
                .map(|(k, _)| k.clone());
            if let Some(oldest) = oldest {
                entries.remove(&oldest);
                debug!(key = %oldest, "Evicted quote cache entry");
            }
        }

        let now = Instant::now();
        entries.insert(
            key,
            CacheEntry {
                result,
                inserted_at: now,
                last_used: now,
            },
        );
    }

    /// Drops every entry. Called after any zone or pricing mutation.
    pub fn clear(&self) {
        if let Ok(mut entries) = self.entries.lock() {
            let count = entries.len();
            entries.clear();
            debug!(count, "Cleared quote cache");
        }
    }

    /// Current entry count (expired entries included until touched).
    pub fn len(&self) -> usize {
        self.entries.lock().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for QuoteCache {
    fn default() -> Self {
        QuoteCache::new(CacheConfig::default())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use lastmile_core::Money;

    fn quote(price_minor: i64) -> QuoteResult {
        QuoteResult {
            serviceable: true,
            matched_zone: Some("Central".to_string()),
            distance_km: 2.345,
            price: Money::from_minor(price_minor),
            currency: "INR".to_string(),
            slab_name: Some("0-5 km".to_string()),
        }
    }

    #[test]
    fn test_key_rounds_to_five_decimals() {
        let a = QuoteCache::key("wh-1", 28.613_901, 77.209_004);
        let b = QuoteCache::key("wh-1", 28.613_899, 77.208_996);
        assert_eq!(a, "wh-1:28.61390:77.20900");
        assert_eq!(a, b);

        // A different warehouse never shares keys
        let c = QuoteCache::key("wh-2", 28.613_901, 77.209_004);
        assert_ne!(a, c);
    }

    #[test]
    fn test_set_get_round_trip() {
        let cache = QuoteCache::default();
        let key = QuoteCache::key("wh-1", 28.6139, 77.2090);

        assert!(cache.get(&key).is_none());
        cache.set(key.clone(), quote(4876));
        assert_eq!(cache.get(&key), Some(quote(4876)));
    }

    #[test]
    fn test_ttl_expiry() {
        let cache = QuoteCache::new(CacheConfig {
            capacity: 10,
            ttl: Duration::from_millis(0),
        });
        let key = QuoteCache::key("wh-1", 28.6139, 77.2090);

        cache.set(key.clone(), quote(4876));
        // Zero TTL: the entry is already expired on read
        assert!(cache.get(&key).is_none());
        // And the expired entry was dropped
        assert!(cache.is_empty());
    }

    #[test]
    fn test_clear_wipes_everything() {
        let cache = QuoteCache::default();
        for i in 0..10 {
            cache.set(QuoteCache::key("wh-1", f64::from(i), 0.0), quote(100));
        }
        assert_eq!(cache.len(), 10);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(&QuoteCache::key("wh-1", 0.0, 0.0)).is_none());
    }

    #[test]
    fn test_capacity_bound_evicts_lru() {
        let cache = QuoteCache::new(CacheConfig {
            capacity: 3,
            ttl: Duration::from_secs(600),
        });

        let k0 = QuoteCache::key("wh-1", 0.0, 0.0);
        let k1 = QuoteCache::key("wh-1", 1.0, 0.0);
        let k2 = QuoteCache::key("wh-1", 2.0, 0.0);
        cache.set(k0.clone(), quote(0));
        cache.set(k1.clone(), quote(1));
        cache.set(k2.clone(), quote(2));

        // Touch k0 so k1 becomes the least recently used
        cache.get(&k0);

        cache.set(QuoteCache::key("wh-1", 3.0, 0.0), quote(3));
        assert_eq!(cache.len(), 3);
        assert!(cache.get(&k1).is_none());
        assert!(cache.get(&k0).is_some());
        assert!(cache.get(&k2).is_some());
    }

    #[test]
    fn test_overwrite_does_not_evict() {
        let cache = QuoteCache::new(CacheConfig {
            capacity: 1,
            ttl: Duration::from_secs(600),
        });
        let key = QuoteCache::key("wh-1", 0.0, 0.0);

        cache.set(key.clone(), quote(1));
        cache.set(key.clone(), quote(2));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(&key), Some(quote(2)));
    }
}
