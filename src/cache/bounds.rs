//! Bounding-box cache for place lookups.

use std::sync::Arc;

use lru::LruCache;
use serde::{Deserialize, Serialize};

use crate::clock::{duration_millis, Clock, SystemClock};
use crate::storage::KeyValueStore;
use crate::types::config::CacheConfig;
use crate::types::{Bounds, Place, QueryType};
use crate::PlacegateResult;

/// A cached upstream response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry {
    /// Category the places belong to.
    pub query_type: QueryType,

    /// Expanded box the places were fetched for.
    pub bounds: Bounds,

    /// Places as returned by the upstream.
    pub data: Vec<Place>,

    /// Creation time in epoch milliseconds.
    pub timestamp: i64,
}

impl CacheEntry {
    /// Checks whether the entry is past its TTL.
    pub fn is_expired(&self, now_millis: i64, ttl_millis: i64) -> bool {
        now_millis.saturating_sub(self.timestamp) >= ttl_millis
    }
}

/// Cache statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    /// Current number of entries.
    pub size: usize,

    /// Maximum number of entries.
    pub max_size: usize,

    /// Keys in insertion order, oldest first.
    pub entries: Vec<String>,

    /// Lookups answered from the cache since start.
    pub hits: u64,

    /// Lookups that missed since start.
    pub misses: u64,
}

impl CacheStats {
    /// Calculates the hit rate.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Deserialize)]
struct StoredEntry {
    key: String,
    entry: CacheEntry,
}

#[derive(Serialize)]
struct StoredEntryRef<'a> {
    key: &'a str,
    entry: &'a CacheEntry,
}

/// Cache of place lists keyed by query type and bounding box.
///
/// A lookup hits when the requested box lies inside a fresh cached box of the
/// same type. Stored boxes are expanded before insertion so that one fetch
/// covers the surrounding area as well.
///
/// Entries are kept in insertion order and evicted oldest first. Reads never
/// reorder them. Every insert writes the whole set through to the store.
pub struct BoundsCache {
    // Insertion-ordered map. Never read through `get`/`put` on a live key,
    // so nothing is promoted and `pop_lru` always yields the oldest insert.
    entries: LruCache<String, CacheEntry>,
    max_size: usize,
    ttl_millis: i64,
    expansion_factor: f64,
    storage_key: String,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    hits: u64,
    misses: u64,
}

/// Rounds to two decimals, ties away from zero (`0.125` gives `0.13`).
fn round_key_coord(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

impl BoundsCache {
    /// Creates a cache and rehydrates it from `store`.
    pub fn new(config: &CacheConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Creates a cache with an explicit time source.
    pub fn with_clock(
        config: &CacheConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let mut cache = Self {
            entries: LruCache::unbounded(),
            max_size: config.max_size,
            ttl_millis: duration_millis(config.ttl()),
            expansion_factor: config.expansion_factor.max(0.0),
            storage_key: config.storage_key.clone(),
            store,
            clock,
            hits: 0,
            misses: 0,
        };
        cache.load_from_storage();
        cache
    }

    /// Builds the key for an (already expanded) box.
    ///
    /// Coordinates are rounded to two decimals (about 1.1 km) so that nearly
    /// identical boxes share a slot.
    pub fn cache_key(query_type: &QueryType, bounds: &Bounds) -> String {
        format!(
            "{}_{:.2}_{:.2}_{:.2}_{:.2}",
            query_type,
            round_key_coord(bounds.sw.lat),
            round_key_coord(bounds.sw.lng),
            round_key_coord(bounds.ne.lat),
            round_key_coord(bounds.ne.lng)
        )
    }

    /// Looks up places for `requested`.
    ///
    /// Scans entries of `query_type` oldest first and returns the data of the
    /// first fresh one whose box contains `requested`. Expired entries of that
    /// type met along the way are dropped.
    pub fn get(&mut self, query_type: &QueryType, requested: &Bounds) -> Option<Vec<Place>> {
        let now = self.clock.now_millis();
        let mut expired = Vec::new();
        let mut found = None;

        for (key, entry) in self.entries.iter().rev() {
            if &entry.query_type != query_type {
                continue;
            }
            if entry.is_expired(now, self.ttl_millis) {
                expired.push(key.clone());
                continue;
            }
            if entry.bounds.contains(requested) {
                found = Some((key.clone(), entry.data.clone()));
                break;
            }
        }

        for key in &expired {
            self.entries.pop(key);
            tracing::debug!(key = %key, "Dropped expired cache entry");
        }

        match found {
            Some((key, data)) => {
                self.hits += 1;
                tracing::debug!(query_type = %query_type, key = %key, "Cache hit");
                Some(data)
            }
            None => {
                self.misses += 1;
                tracing::debug!(query_type = %query_type, "Cache miss");
                None
            }
        }
    }

    /// Stores places fetched for `requested`.
    ///
    /// The box is expanded by the configured factor first. When the cache is
    /// full the oldest entry is evicted. Re-setting an existing key replaces
    /// the entry without moving it in the eviction order.
    pub fn set(&mut self, query_type: QueryType, requested: &Bounds, data: Vec<Place>) {
        let expanded = requested.expand(self.expansion_factor);
        let key = Self::cache_key(&query_type, &expanded);

        if self.entries.len() >= self.max_size {
            if let Some((evicted, _)) = self.entries.pop_lru() {
                tracing::debug!(key = %evicted, "Cache full, evicted oldest entry");
            }
        }

        let count = data.len();
        let entry = CacheEntry {
            query_type,
            bounds: expanded,
            data,
            timestamp: self.clock.now_millis(),
        };

        match self.entries.peek_mut(&key) {
            Some(existing) => *existing = entry,
            None => {
                self.entries.push(key.clone(), entry);
            }
        }

        tracing::debug!(key = %key, places = count, "Cached places for expanded area");

        self.save_to_storage();
    }

    /// Empties the cache and deletes its persisted copy.
    pub fn clear(&mut self) {
        self.entries.clear();
        if let Err(e) = self.store.remove(&self.storage_key) {
            tracing::warn!(error = %e, "Failed to remove persisted cache");
        }
        tracing::info!("Cache cleared");
    }

    /// Drops every expired entry regardless of type.
    ///
    /// Returns how many were removed.
    pub fn cleanup_expired(&mut self) -> usize {
        let now = self.clock.now_millis();
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, e)| e.is_expired(now, self.ttl_millis))
            .map(|(k, _)| k.clone())
            .collect();

        for key in &expired {
            self.entries.pop(key);
        }

        if !expired.is_empty() {
            self.save_to_storage();
        }
        expired.len()
    }

    /// Returns cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            size: self.entries.len(),
            max_size: self.max_size,
            entries: self.entries.iter().rev().map(|(k, _)| k.clone()).collect(),
            hits: self.hits,
            misses: self.misses,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn load_from_storage(&mut self) {
        match self.read_stored() {
            Ok(Some(stored)) => {
                let now = self.clock.now_millis();
                for StoredEntry { key, entry } in stored {
                    if entry.is_expired(now, self.ttl_millis) || entry.bounds.validate().is_err() {
                        continue;
                    }
                    self.entries.put(key, entry);
                }

                while self.entries.len() > self.max_size {
                    self.entries.pop_lru();
                }

                if !self.entries.is_empty() {
                    tracing::info!(entries = self.entries.len(), "Loaded cached entries from storage");
                }
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable persisted cache");
                if let Err(e) = self.store.remove(&self.storage_key) {
                    tracing::warn!(error = %e, "Failed to remove persisted cache");
                }
            }
        }
    }

    fn read_stored(&self) -> PlacegateResult<Option<Vec<StoredEntry>>> {
        match self.store.get(&self.storage_key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_to_storage(&mut self) {
        if let Err(e) = self.write_stored() {
            tracing::warn!(error = %e, "Failed to persist cache, clearing it");
            self.clear();
        }
    }

    fn write_stored(&self) -> PlacegateResult<()> {
        let stored: Vec<StoredEntryRef<'_>> = self
            .entries
            .iter()
            .rev()
            .map(|(key, entry)| StoredEntryRef { key, entry })
            .collect();
        let raw = serde_json::to_string(&stored)?;
        self.store.set(&self.storage_key, &raw)
    }
}
