//! Caching layer for schedule boards.
//!
//! A search asks for the same board several times: once per candidate of the
//! previous leg in general mode, and again on the next run a few seconds
//! later. Boards are cached for a short TTL so a search costs one fetch per
//! distinct board. Countdown messages drift by at most the TTL, which stays
//! below the provider's one-minute granularity.
//!
//! Variant station lists are not cached here: the classifier keeps them in
//! its persistent store.

use std::sync::Arc;
use std::time::Duration;

use moka::sync::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Direction, TransportKind};
use crate::ratp::{ProviderError, ScheduleEntry, ScheduleProvider};

/// Cache key for schedule boards: (kind, line, station, direction).
type BoardKey = (TransportKind, String, String, Direction);

/// Cached board entry.
type BoardEntry = Arc<Vec<ScheduleEntry>>;

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached boards.
    pub ttl: Duration,

    /// Maximum number of cached boards.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(20),
            max_capacity: 256,
        }
    }
}

/// Schedule provider with caching.
///
/// Wraps any provider and caches its schedule boards. Failures are not
/// cached.
pub struct CachedProvider<P> {
    inner: P,
    boards: MokaCache<BoardKey, BoardEntry>,
}

impl<P: ScheduleProvider> CachedProvider<P> {
    /// Create a new cached provider.
    pub fn new(inner: P, config: &CacheConfig) -> Self {
        let boards = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { inner, boards }
    }

    /// Get a board, using the cache if available.
    pub fn board(
        &self,
        kind: TransportKind,
        line: &str,
        station: &str,
        direction: Direction,
    ) -> Result<BoardEntry, ProviderError> {
        let key = (kind, line.to_string(), station.to_string(), direction);

        if let Some(cached) = self.boards.get(&key) {
            trace!(%kind, line, station, "Board served from cache");
            return Ok(cached);
        }

        let entries = self
            .inner
            .fetch_schedules(kind, line, station, direction)?;
        let entry = Arc::new(entries);
        self.boards.insert(key, entry.clone());

        Ok(entry)
    }

    /// Access the underlying provider for operations that bypass cache.
    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Get cache statistics.
    pub fn cache_entry_count(&self) -> u64 {
        self.boards.run_pending_tasks();
        self.boards.entry_count()
    }
}

impl<P: ScheduleProvider> ScheduleProvider for CachedProvider<P> {
    fn fetch_schedules(
        &self,
        kind: TransportKind,
        line: &str,
        station: &str,
        direction: Direction,
    ) -> Result<Vec<ScheduleEntry>, ProviderError> {
        self.board(kind, line, station, direction)
            .map(|board| board.as_ref().clone())
    }

    fn fetch_variant_stations(
        &self,
        line: &str,
        code: &str,
    ) -> Result<Vec<String>, ProviderError> {
        self.inner.fetch_variant_stations(line, code)
    }
}
