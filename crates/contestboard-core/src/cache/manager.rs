use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{Contest, FavoriteSet};

use super::store::KeyValueStore;
use super::CacheError;

/// Durable key holding the last successful catalog fetch
pub const CONTESTS_CACHE_KEY: &str = "contests-cache";

/// Session key holding the favorites set
pub const FAVORITES_KEY: &str = "favoriteContests";

/// Consider cache stale after 1 hour
pub const DEFAULT_CACHE_TTL_MS: i64 = 60 * 60 * 1000;

const MINUTE_MS: i64 = 60 * 1000;

/// Snapshot of a successful fetch
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: Vec<Contest>,
    #[serde(rename = "timestamp")]
    pub fetched_at_ms: i64,
}

impl CacheEntry {
    pub fn new(data: Vec<Contest>, fetched_at_ms: i64) -> Self {
        Self {
            data,
            fetched_at_ms,
        }
    }

    pub fn is_fresh(&self, now_ms: i64, ttl_ms: i64) -> bool {
        is_fresh(self, now_ms, ttl_ms)
    }
}

/// Whole minutes between a fetch and `now_ms`
pub fn age_minutes(fetched_at_ms: i64, now_ms: i64) -> i64 {
    (now_ms - fetched_at_ms) / MINUTE_MS
}

/// An entry is fresh strictly before `ttl_ms` has elapsed since it was fetched.
pub fn is_fresh(entry: &CacheEntry, now_ms: i64, ttl_ms: i64) -> bool {
    now_ms - entry.fetched_at_ms < ttl_ms
}

/// Render an age in minutes as "just now", "12m ago", "3h ago" or "2d ago".
pub fn age_display(minutes: i64) -> String {
    if minutes < 1 {
        // Negative ages come from clock skew
        "just now".to_string()
    } else if minutes < 60 {
        format!("{}m ago", minutes)
    } else if minutes < 1440 {
        let hours = minutes / 60;
        let remaining_mins = minutes % 60;
        if remaining_mins >= 30 {
            format!("{}h ago", hours + 1)
        } else {
            format!("{}h ago", hours)
        }
    } else {
        let days = minutes / 1440;
        let remaining_hours = (minutes % 1440) / 60;
        if remaining_hours >= 12 {
            format!("{}d ago", days + 1)
        } else {
            format!("{}d ago", days)
        }
    }
}

/// Borrowed form of `CacheEntry` used when writing
#[derive(Serialize)]
struct StoredEntry<'a> {
    data: &'a [Contest],
    timestamp: i64,
}

/// Contest cache plus favorites, each in its own storage scope.
pub struct CacheStore {
    durable: Box<dyn KeyValueStore>,
    session: Box<dyn KeyValueStore>,
}

impl CacheStore {
    pub fn new(durable: Box<dyn KeyValueStore>, session: Box<dyn KeyValueStore>) -> Self {
        Self { durable, session }
    }

    pub fn try_read(&self) -> Result<Option<CacheEntry>, CacheError> {
        let Some(contents) = self.durable.get(CONTESTS_CACHE_KEY)? else {
            return Ok(None);
        };
        let entry = serde_json::from_str(&contents).map_err(|source| CacheError::Corrupt {
            key: CONTESTS_CACHE_KEY,
            source,
        })?;
        Ok(Some(entry))
    }

    /// Load the cached catalog. Unreadable or malformed data counts as a miss.
    pub fn read(&self) -> Option<CacheEntry> {
        match self.try_read() {
            Ok(entry) => entry,
            Err(e) => {
                debug!(cache = CONTESTS_CACHE_KEY, error = %e, "Ignoring unusable cache");
                None
            }
        }
    }

    /// Replace the cached catalog. Returns the timestamp actually stored.
    ///
    /// The stored timestamp never moves backwards: an entry older than the
    /// current one is written with the current timestamp.
    pub fn write(&self, entry: &CacheEntry) -> Result<i64, CacheError> {
        let mut fetched_at_ms = entry.fetched_at_ms;
        if let Some(previous) = self.read() {
            if fetched_at_ms < previous.fetched_at_ms {
                debug!(
                    new = fetched_at_ms,
                    previous = previous.fetched_at_ms,
                    "Clamping cache timestamp"
                );
                fetched_at_ms = previous.fetched_at_ms;
            }
        }
        let stored = StoredEntry {
            data: &entry.data,
            timestamp: fetched_at_ms,
        };
        let contents = serde_json::to_string(&stored).map_err(CacheError::Serialize)?;
        self.durable.set(CONTESTS_CACHE_KEY, &contents)?;
        Ok(fetched_at_ms)
    }

    pub fn read_favorites(&self) -> FavoriteSet {
        let contents = match self.session.get(FAVORITES_KEY) {
            Ok(Some(c)) => c,
            Ok(None) => return FavoriteSet::new(),
            Err(e) => {
                debug!(error = %e, "Failed to read favorites");
                return FavoriteSet::new();
            }
        };
        serde_json::from_str(&contents).unwrap_or_else(|e| {
            debug!(error = %e, "Ignoring malformed favorites");
            FavoriteSet::new()
        })
    }

    pub fn write_favorites(&self, favorites: &FavoriteSet) -> Result<(), CacheError> {
        let contents = serde_json::to_string(favorites).map_err(CacheError::Serialize)?;
        self.session.set(FAVORITES_KEY, &contents)
    }
}

// ============================================================================
// Tests
// ============================================================================
