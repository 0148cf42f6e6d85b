//! Durable key-value stores backing the cache and the rate limiter.
//!
//! Both components write their whole state as one JSON blob under a single
//! string key, so any store that can hold strings will do.
//!
//! - [`MemoryStore`]: process-local, used in tests and as a fallback
//! - [`SqliteStore`]: SQLite file, the default for the CLI

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::MemoryStore;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::PlacegateResult;

/// A string-keyed durable store.
pub trait KeyValueStore: Send + Sync {
    /// Reads a value. `Ok(None)` means the key is absent.
    fn get(&self, key: &str) -> PlacegateResult<Option<String>>;

    /// Writes a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> PlacegateResult<()>;

    /// Deletes a key. Removing an absent key is not an error.
    fn remove(&self, key: &str) -> PlacegateResult<()>;
}
