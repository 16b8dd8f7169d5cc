//! In-memory indicator cache with fingerprint-based invalidation.
//!
//! Entries are keyed by (symbol, period, params hash, as-of date) and carry
//! the BLAKE3 fingerprint of the bars they were computed from. A lookup
//! with different bars under the same key is a miss and evicts the stale
//! entry. The cache is an explicit value passed to whoever needs it; there
//! is no global instance.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use quantlab_core::domain::Bar;
use quantlab_core::{IndicatorValues, Strategy};

use crate::data_loader::dataset_hash;

/// Bar period of the daily data the engine works on.
pub const DAILY: &str = "1d";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CacheKey {
    pub symbol: String,
    pub period: String,
    pub params_hash: String,
    pub as_of: NaiveDate,
}

impl CacheKey {
    /// Key for `strategy`'s indicators over `bars`. `None` for an empty series.
    pub fn for_strategy(bars: &[Bar], strategy: &Strategy) -> Option<Self> {
        let last = bars.last()?;
        Some(Self {
            symbol: last.symbol.clone(),
            period: DAILY.to_string(),
            params_hash: params_hash(strategy),
            as_of: last.date,
        })
    }
}

/// BLAKE3 over the strategy id and its resolved parameters in name order.
pub fn params_hash(strategy: &Strategy) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(strategy.id().as_bytes());
    for (name, value) in strategy.params() {
        hasher.update(name.as_bytes());
        hasher.update(&value.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

struct Entry {
    fingerprint: String,
    values: Arc<IndicatorValues>,
}

/// Hit/miss counters since construction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
}

/// Thread-safe indicator cache shared across batch workers.
#[derive(Default)]
pub struct IndicatorCache {
    entries: RwLock<HashMap<CacheKey, Entry>>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl IndicatorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached values for `key`, if they were computed from exactly `bars`.
    pub fn get(&self, key: &CacheKey, bars: &[Bar]) -> Option<Arc<IndicatorValues>> {
        self.lookup(key, &dataset_hash(bars))
    }

    fn lookup(&self, key: &CacheKey, fingerprint: &str) -> Option<Arc<IndicatorValues>> {
        let stale = {
            let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
            match entries.get(key) {
                Some(entry) if entry.fingerprint == fingerprint => {
                    self.hits.fetch_add(1, Ordering::Relaxed);
                    tracing::debug!(symbol = %key.symbol, as_of = %key.as_of, "Indicator cache hit.");
                    return Some(Arc::clone(&entry.values));
                }
                Some(_) => true,
                None => false,
            }
        };

        self.misses.fetch_add(1, Ordering::Relaxed);
        if stale {
            let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
            // Re-check under the write lock; another worker may have refreshed it.
            if entries.get(key).is_some_and(|e| e.fingerprint != fingerprint) {
                entries.remove(key);
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!(symbol = %key.symbol, as_of = %key.as_of, "Evicted stale indicator entry.");
            }
        } else {
            tracing::debug!(symbol = %key.symbol, as_of = %key.as_of, "Indicator cache miss.");
        }
        None
    }

    pub fn insert(&self, key: CacheKey, bars: &[Bar], values: IndicatorValues) -> Arc<IndicatorValues> {
        self.insert_fingerprinted(key, dataset_hash(bars), values)
    }

    fn insert_fingerprinted(&self, key: CacheKey, fingerprint: String, values: IndicatorValues) -> Arc<IndicatorValues> {
        let values = Arc::new(values);
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.insert(
            key,
            Entry {
                fingerprint,
                values: Arc::clone(&values),
            },
        );
        values
    }

    /// Cached values for `key`, or compute, store and return them.
    pub fn get_or_compute<F>(&self, key: CacheKey, bars: &[Bar], compute: F) -> Arc<IndicatorValues>
    where
        F: FnOnce() -> IndicatorValues,
    {
        let fingerprint = dataset_hash(bars);
        if let Some(values) = self.lookup(&key, &fingerprint) {
            return values;
        }
        self.insert_fingerprinted(key, fingerprint, compute())
    }

    /// Indicators for `strategy` over `bars`, through the cache.
    pub fn strategy_indicators(&self, bars: &[Bar], strategy: &Strategy) -> Arc<IndicatorValues> {
        match CacheKey::for_strategy(bars, strategy) {
            Some(key) => self.get_or_compute(key, bars, || strategy.compute_indicators(bars)),
            None => Arc::new(strategy.compute_indicators(bars)),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.write().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }
}
