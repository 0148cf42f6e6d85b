//! # placegate
//!
//! Client-side guard for metered places APIs.
//!
//! Lookups for restaurants, hotels or attractions inside a map viewport go
//! through a bounding-box cache first and a sliding window rate limiter
//! second; only then is the upstream called. Both the cache and the limiter
//! write their state through to a durable key-value store so quota and
//! cached areas survive restarts.
//!
//! ## Modules
//!
//! - [`cache`] - Bounding-box cache with FIFO eviction and TTL
//! - [`limiter`] - Sliding window rate limiter
//! - [`storage`] - Key-value stores (memory, SQLite)
//! - [`fetch`] - Upstream places fetchers
//! - [`gateway`] - The composed cache-first lookup
//! - [`clock`] - Time sources
//! - [`cli`] - Command line interface
//! - [`types`] - Shared types

pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod clock;
pub mod fetch;
pub mod gateway;
pub mod limiter;
pub mod storage;
pub mod types;

pub use cache::BoundsCache;
pub use gateway::{LookupOutcome, LookupSource, PlacesGateway};
pub use limiter::RateLimiter;
pub use types::config::Config;
pub use types::errors::{PlacegateError, PlacegateResult};
