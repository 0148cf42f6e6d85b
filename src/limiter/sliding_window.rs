//! Sliding window request limiter.

use std::collections::VecDeque;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::clock::{duration_millis, Clock, SystemClock};
use crate::storage::KeyValueStore;
use crate::types::config::RateLimitConfig;
use crate::{PlacegateError, PlacegateResult};

/// Rate limiter statistics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStats {
    /// Requests still allowed in the current window.
    pub remaining: usize,

    /// Requests allowed per window.
    pub limit: usize,

    /// Milliseconds until the oldest recorded request leaves the window.
    pub reset_in: i64,

    /// `reset_in` rounded up to whole minutes.
    pub reset_in_minutes: i64,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredState {
    requests: Vec<i64>,
    window_start: i64,
}

/// Counts granted requests over a trailing window.
///
/// Quota comes back one request at a time as old requests age out, rather
/// than all at once at a fixed boundary. Checking and recording are separate
/// so that failed upstream calls never consume quota.
pub struct RateLimiter {
    requests: VecDeque<i64>,
    window_start: i64,
    max_requests: usize,
    window_millis: i64,
    storage_key: String,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
}

impl RateLimiter {
    /// Creates a limiter and restores its state from `store`.
    pub fn new(config: &RateLimitConfig, store: Arc<dyn KeyValueStore>) -> Self {
        Self::with_clock(config, store, Arc::new(SystemClock))
    }

    /// Creates a limiter with an explicit time source.
    pub fn with_clock(
        config: &RateLimitConfig,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let now = clock.now_millis();
        let mut limiter = Self {
            requests: VecDeque::new(),
            window_start: now,
            max_requests: config.max_requests,
            window_millis: duration_millis(config.window()),
            storage_key: config.storage_key.clone(),
            store,
            clock,
        };
        limiter.load_from_storage();
        limiter
    }

    /// Returns true if another request fits in the window.
    ///
    /// Does not reserve a slot; call [`record_request`](Self::record_request)
    /// once the request has actually succeeded.
    pub fn can_make_request(&mut self) -> bool {
        self.prune();
        self.requests.len() < self.max_requests
    }

    /// Records a granted request at the current time.
    pub fn record_request(&mut self) {
        self.requests.push_back(self.clock.now_millis());
        self.save_to_storage();
    }

    /// Requests still allowed in the current window.
    pub fn remaining(&mut self) -> usize {
        self.prune();
        self.max_requests.saturating_sub(self.requests.len())
    }

    /// Milliseconds until the oldest recorded request ages out, 0 if none.
    pub fn time_until_reset(&self) -> i64 {
        match self.requests.iter().min() {
            Some(oldest) => {
                let reset_at = oldest.saturating_add(self.window_millis);
                reset_at.saturating_sub(self.clock.now_millis()).max(0)
            }
            None => 0,
        }
    }

    /// Returns limiter statistics.
    pub fn stats(&mut self) -> RateLimitStats {
        let remaining = self.remaining();
        let reset_in = self.time_until_reset();
        RateLimitStats {
            remaining,
            limit: self.max_requests,
            reset_in,
            reset_in_minutes: (reset_in + 59_999) / 60_000,
        }
    }

    /// Forgets all recorded requests and restarts the window.
    pub fn reset(&mut self) {
        self.requests.clear();
        self.window_start = self.clock.now_millis();
        self.save_to_storage();
        tracing::info!("Rate limit reset");
    }

    /// Start of the current window in epoch milliseconds.
    pub fn window_start(&self) -> i64 {
        self.window_start
    }

    fn prune(&mut self) {
        let now = self.clock.now_millis();
        let window = self.window_millis;
        self.requests.retain(|t| now.saturating_sub(*t) < window);
    }

    fn load_from_storage(&mut self) {
        let now = self.clock.now_millis();
        match self.read_stored() {
            Ok(Some(state)) => {
                if now.saturating_sub(state.window_start) > self.window_millis {
                    self.requests.clear();
                    self.window_start = now;
                } else {
                    self.window_start = state.window_start;
                    self.requests = state.requests.into_iter().collect();
                    // Stored timestamps may be unordered or from the future
                    self.requests.make_contiguous().sort_unstable();
                    self.requests.retain(|t| *t <= now);
                    self.prune();
                    // A window never holds more than the quota; keep the newest
                    while self.requests.len() > self.max_requests {
                        self.requests.pop_front();
                    }
                }
                tracing::debug!(
                    recorded = self.requests.len(),
                    "Restored rate limit state"
                );
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable rate limit state");
                self.requests.clear();
                self.window_start = now;
                if let Err(e) = self.store.remove(&self.storage_key) {
                    tracing::warn!(error = %e, "Failed to remove rate limit state");
                }
            }
        }
    }

    fn read_stored(&self) -> PlacegateResult<Option<StoredState>> {
        match self.store.get(&self.storage_key)? {
            Some(raw) => Ok(Some(serde_json::from_str(&raw)?)),
            None => Ok(None),
        }
    }

    fn save_to_storage(&self) {
        let state = StoredState {
            requests: self.requests.iter().copied().collect(),
            window_start: self.window_start,
        };
        let result = serde_json::to_string(&state)
            .map_err(PlacegateError::from)
            .and_then(|raw| self.store.set(&self.storage_key, &raw));

        if let Err(e) = result {
            tracing::warn!(error = %e, "Failed to persist rate limit state");
        }
    }
}
