//! Cache-first, rate-limited place lookups.
//!
//! The gateway composes the three collaborators in a fixed order: the
//! bounds cache, then the rate limiter, then the upstream fetcher. It never
//! returns an error; a denied or failed lookup yields an empty place list and
//! an outcome describing why.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::cache::{BoundsCache, CacheStats};
use crate::fetch::PlacesFetcher;
use crate::limiter::{RateLimitStats, RateLimiter};
use crate::types::{Bounds, Place, QueryType};

/// Where the places of a lookup came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LookupSource {
    /// Served from a cached box.
    Cache,
    /// Fetched from the upstream and cached.
    Upstream,
    /// Refused by the rate limiter; nothing was fetched.
    RateLimited { reset_in_minutes: i64 },
    /// The upstream call failed; no quota was consumed.
    UpstreamFailed { reason: String },
}

/// Result of a lookup.
#[derive(Debug, Clone, Serialize)]
pub struct LookupOutcome {
    pub places: Vec<Place>,
    pub source: LookupSource,
}

impl LookupOutcome {
    fn empty(source: LookupSource) -> Self {
        Self {
            places: Vec::new(),
            source,
        }
    }

    /// True if the places came from the cache or the upstream.
    pub fn is_success(&self) -> bool {
        matches!(self.source, LookupSource::Cache | LookupSource::Upstream)
    }
}

/// Combined cache and rate limit statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayStats {
    pub cache: CacheStats,
    pub rate_limit: RateLimitStats,
}

/// Cache-first, rate-limited access to an upstream places source.
pub struct PlacesGateway {
    cache: Mutex<BoundsCache>,
    limiter: Mutex<RateLimiter>,
    fetcher: Arc<dyn PlacesFetcher>,
}

impl PlacesGateway {
    pub fn new(cache: BoundsCache, limiter: RateLimiter, fetcher: Arc<dyn PlacesFetcher>) -> Self {
        Self {
            cache: Mutex::new(cache),
            limiter: Mutex::new(limiter),
            fetcher,
        }
    }

    /// Looks up places of `query_type` inside `bounds`.
    ///
    /// Locks are released while the upstream call is in flight, so a slow
    /// fetch does not block cache hits from other tasks. Two concurrent misses
    /// for the same area may both go upstream.
    pub async fn lookup(&self, query_type: &QueryType, bounds: &Bounds) -> LookupOutcome {
        if let Some(places) = self.cache.lock().await.get(query_type, bounds) {
            return LookupOutcome {
                places,
                source: LookupSource::Cache,
            };
        }

        {
            let mut limiter = self.limiter.lock().await;
            if !limiter.can_make_request() {
                let stats = limiter.stats();
                tracing::warn!(
                    query_type = %query_type,
                    reset_in_minutes = stats.reset_in_minutes,
                    "Rate limit reached, skipping upstream call"
                );
                return LookupOutcome::empty(LookupSource::RateLimited {
                    reset_in_minutes: stats.reset_in_minutes,
                });
            }
        }

        match self
            .fetcher
            .fetch_places(query_type, bounds.sw, bounds.ne)
            .await
        {
            Ok(places) => {
                self.limiter.lock().await.record_request();
                self.cache
                    .lock()
                    .await
                    .set(query_type.clone(), bounds, places.clone());

                tracing::info!(
                    fetcher = self.fetcher.name(),
                    query_type = %query_type,
                    places = places.len(),
                    "Fetched places from upstream"
                );

                LookupOutcome {
                    places,
                    source: LookupSource::Upstream,
                }
            }
            Err(e) => {
                tracing::warn!(
                    fetcher = self.fetcher.name(),
                    query_type = %query_type,
                    error = %e,
                    "Upstream fetch failed"
                );
                LookupOutcome::empty(LookupSource::UpstreamFailed {
                    reason: e.to_string(),
                })
            }
        }
    }

    /// Returns cache and rate limit statistics.
    pub async fn stats(&self) -> GatewayStats {
        let cache = self.cache.lock().await.stats();
        let rate_limit = self.limiter.lock().await.stats();
        GatewayStats { cache, rate_limit }
    }

    /// Empties the cache.
    pub async fn clear_cache(&self) {
        self.cache.lock().await.clear();
    }

    /// Restarts the rate limit window. Meant for operators and tests.
    pub async fn reset_rate_limit(&self) {
        self.limiter.lock().await.reset();
    }
}
