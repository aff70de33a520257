//! In-process result cache for repeated searches.
//!
//! Entries are keyed by the full [`FilterCriteria`] and expire after a fixed
//! time-to-live. Only successful results are stored. A hit is re-evaluated at
//! the lookup instant so the at-risk flag is never served stale.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, TimeDelta, Utc};
use tracing::debug;

use super::cancel::CancellationSignal;
use super::criteria::FilterCriteria;
use super::error::SearchError;
use super::models::ResultSet;
use super::pipeline::SearchPipeline;

/// Default time-to-live in seconds.
pub const DEFAULT_CACHE_TTL_SECONDS: u64 = 300;

#[derive(Debug, Clone)]
struct CacheEntry {
    result: ResultSet,
    expires_at: DateTime<Utc>,
}

/// Time-bounded map from criteria to results.
#[derive(Debug)]
pub struct SearchCache {
    ttl: TimeDelta,
    entries: Mutex<HashMap<FilterCriteria, CacheEntry>>,
}

impl Default for SearchCache {
    fn default() -> Self {
        Self::with_ttl_seconds(DEFAULT_CACHE_TTL_SECONDS)
    }
}

impl SearchCache {
    /// Creates an empty cache whose entries live for `ttl_seconds`.
    #[must_use]
    pub fn with_ttl_seconds(ttl_seconds: u64) -> Self {
        let seconds = i64::try_from(ttl_seconds).unwrap_or(i64::MAX);
        Self {
            ttl: TimeDelta::try_seconds(seconds).unwrap_or(TimeDelta::MAX),
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the cached result for `criteria`, re-evaluated at `now`.
    ///
    /// An entry at or past its expiry is evicted and reported as a miss.
    #[must_use]
    pub fn get(&self, criteria: &FilterCriteria, now: DateTime<Utc>) -> Option<ResultSet> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let expired = entries.get(criteria)?.expires_at <= now;
        if expired {
            entries.remove(criteria);
            return None;
        }
        entries
            .get(criteria)
            .map(|entry| entry.result.reevaluated_at(now))
    }

    /// Stores `result` for `criteria`, replacing any earlier entry.
    ///
    /// Entries already expired at `now` are dropped first.
    pub fn insert(&self, criteria: FilterCriteria, result: ResultSet, now: DateTime<Utc>) {
        let expires_at = now.checked_add_signed(self.ttl).unwrap_or(DateTime::<Utc>::MAX_UTC);
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.retain(|_, entry| entry.expires_at > now);
        entries.insert(criteria, CacheEntry { result, expires_at });
    }

    /// Number of stored entries, including expired ones not yet swept.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns true when nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A [`SearchPipeline`] fronted by a [`SearchCache`].
pub struct CachedSearch {
    pipeline: SearchPipeline,
    cache: SearchCache,
}

impl CachedSearch {
    /// Wraps `pipeline` with `cache`.
    #[must_use]
    pub const fn new(pipeline: SearchPipeline, cache: SearchCache) -> Self {
        Self { pipeline, cache }
    }

    /// Borrow the underlying cache.
    #[must_use]
    pub const fn cache(&self) -> &SearchCache {
        &self.cache
    }

    /// Serves `criteria` from the cache or runs the pipeline.
    ///
    /// # Errors
    ///
    /// Returns any error from [`SearchPipeline::search`]; failures are not
    /// cached.
    pub async fn search(
        &self,
        criteria: &FilterCriteria,
        cancel: &CancellationSignal,
    ) -> Result<ResultSet, SearchError> {
        let now = self.pipeline.clock().now();
        if let Some(hit) = self.cache.get(criteria, now) {
            debug!(returned = hit.items.len(), "search served from cache");
            return Ok(hit);
        }

        let result = self.pipeline.search(criteria, cancel).await?;
        self.cache.insert(criteria.clone(), result.clone(), now);
        Ok(result)
    }
}
