//! Sliding window rate limiting for outbound upstream calls.

mod sliding_window;

pub use sliding_window::{RateLimitStats, RateLimiter};
