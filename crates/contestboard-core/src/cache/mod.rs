//! Local caching module for offline data access.
//!
//! This module provides the `CacheStore` for keeping the last catalog fetch
//! on disk and the favorites set for the current session. The catalog is
//! cached as JSON and considered stale after 60 minutes.

pub mod manager;
pub mod store;

use thiserror::Error;

pub use manager::{
    age_display, age_minutes, is_fresh, CacheEntry, CacheStore, CONTESTS_CACHE_KEY,
    DEFAULT_CACHE_TTL_MS, FAVORITES_KEY,
};
pub use store::{FileStore, KeyValueStore, MemoryStore};

#[cfg(test)]
pub(crate) use store::SharedStore;

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cached value for {key} is corrupt: {source}")]
    Corrupt {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to encode cache value: {0}")]
    Serialize(serde_json::Error),
}
