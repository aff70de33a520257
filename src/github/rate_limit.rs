//! Search quota inspection.
//!
//! The search endpoint has its own, much smaller, quota bucket. Before a
//! search starts the guard reads that bucket from `/rate_limit` and refuses
//! to proceed when fewer than [`MIN_SEARCH_REMAINING`] calls are left, so a
//! search never starts that is bound to fail part-way through pagination.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::classify::classify;
use super::error::SearchError;
use super::transport::Transport;

/// API route of the quota endpoint.
pub const RATE_LIMIT_ROUTE: &str = "/rate_limit";

/// Fewest remaining search calls for which a search is allowed to start.
pub const MIN_SEARCH_REMAINING: u32 = 2;

/// Quota state of one rate limit bucket.
///
/// # Example
///
/// ```
/// use prowl::github::rate_limit::RateLimitInfo;
///
/// let info = RateLimitInfo::new(30, 29, 1_700_000_000);
/// assert!(!info.is_below_search_threshold());
/// assert_eq!(info.remaining(), 29);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitInfo {
    limit: u32,
    remaining: u32,
    reset_at: u64,
}

impl RateLimitInfo {
    /// Creates a new rate limit info instance.
    #[must_use]
    pub const fn new(limit: u32, remaining: u32, reset_at: u64) -> Self {
        Self {
            limit,
            remaining,
            reset_at,
        }
    }

    /// Returns the maximum requests allowed in the current window.
    #[must_use]
    pub const fn limit(&self) -> u32 {
        self.limit
    }

    /// Returns the remaining requests in the current window.
    #[must_use]
    pub const fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Returns true when too few calls remain to start a search.
    #[must_use]
    pub const fn is_below_search_threshold(&self) -> bool {
        self.remaining < MIN_SEARCH_REMAINING
    }

    /// Returns the reset instant, or `None` when it is out of range.
    #[must_use]
    pub fn reset_time(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.reset_at)
            .ok()
            .and_then(|seconds| DateTime::from_timestamp(seconds, 0))
    }

    /// Seconds from `now` until the window resets; 0 once it has passed.
    #[must_use]
    pub fn seconds_until_reset(&self, now: DateTime<Utc>) -> u64 {
        let now_seconds = u64::try_from(now.timestamp()).unwrap_or(0);
        self.reset_at.saturating_sub(now_seconds)
    }
}

#[derive(Debug, Deserialize)]
struct ApiRateLimitBody {
    resources: ApiResources,
}

#[derive(Debug, Deserialize)]
struct ApiResources {
    search: ApiBucket,
}

#[derive(Debug, Deserialize)]
struct ApiBucket {
    limit: u64,
    remaining: u64,
    reset: u64,
}

impl TryFrom<ApiBucket> for RateLimitInfo {
    type Error = SearchError;

    fn try_from(bucket: ApiBucket) -> Result<Self, Self::Error> {
        let limit = u32::try_from(bucket.limit)
            .map_err(|_| SearchError::malformed("search quota limit is out of range"))?;
        let remaining = u32::try_from(bucket.remaining)
            .map_err(|_| SearchError::malformed("search quota remaining is out of range"))?;
        Ok(Self::new(limit, remaining, bucket.reset))
    }
}

/// Reads the search quota before any search call is issued.
pub struct RateLimitGuard {
    transport: Arc<dyn Transport>,
}

impl RateLimitGuard {
    /// Creates a guard reading through `transport`.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Reads the search bucket without judging it.
    ///
    /// # Errors
    ///
    /// Returns the classified transport failure, or
    /// [`SearchError::MalformedRecord`] when the body lacks the search bucket.
    pub async fn quota(&self) -> Result<RateLimitInfo, SearchError> {
        let body = self
            .transport
            .get(RATE_LIMIT_ROUTE, &[])
            .await
            .map_err(|error| classify(&error))?;

        let parsed: ApiRateLimitBody = serde_json::from_value(body).map_err(|error| {
            SearchError::malformed(format!("rate limit response: {error}"))
        })?;
        RateLimitInfo::try_from(parsed.resources.search)
    }

    /// Reads the search bucket and refuses when it is nearly exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::RateLimitExceeded`] carrying the reset instant
    /// when fewer than [`MIN_SEARCH_REMAINING`] calls remain, or any error
    /// from [`RateLimitGuard::quota`].
    pub async fn check_quota(&self, now: DateTime<Utc>) -> Result<RateLimitInfo, SearchError> {
        let info = self.quota().await?;
        debug!(
            remaining = info.remaining(),
            limit = info.limit(),
            "search quota read"
        );

        if info.is_below_search_threshold() {
            let wait = info.seconds_until_reset(now);
            warn!(
                remaining = info.remaining(),
                seconds_until_reset = wait,
                "refusing search: quota nearly exhausted"
            );
            return Err(SearchError::RateLimitExceeded {
                reset_at: info.reset_time(),
                message: format!(
                    "{} of {} search calls remaining; retry in {wait}s",
                    info.remaining(),
                    info.limit()
                ),
            });
        }

        Ok(info)
    }
}
