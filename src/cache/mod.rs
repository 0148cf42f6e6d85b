//! Bounding-box cache for place lookups.
//!
//! A request is served from the cache when its box is fully contained in a
//! fresh cached box of the same query type, so one wide fetch answers the
//! narrower viewports that follow it while the user pans and zooms.

mod bounds;

pub use bounds::{BoundsCache, CacheEntry, CacheStats};
