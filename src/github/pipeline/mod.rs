//! Orchestration of one pull request search.
//!
//! A search runs in fixed order: build the query (no remote call on invalid
//! criteria), check the search quota, then for each page in turn enrich and
//! transform its records. All records of one call share a single `now`
//! taken from the clock at the start. There are no retries; the first error
//! ends the call and nothing partial is returned.

use std::future::Future;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::cancel::CancellationSignal;
use super::clock::Clock;
use super::criteria::FilterCriteria;
use super::enrich::{DEFAULT_CONCURRENCY, DetailEnricher};
use super::error::SearchError;
use super::models::ResultSet;
use super::pagination::{PaginationLimits, Paginator};
use super::query::{SearchQuery, build_query};
use super::rate_limit::RateLimitGuard;
use super::transform::transform_all;
use super::transport::Transport;

/// Tunables for [`SearchPipeline`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Pagination bounds and inter-page delay.
    pub limits: PaginationLimits,
    /// Detail lookups in flight.
    pub concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            limits: PaginationLimits::default(),
            concurrency: DEFAULT_CONCURRENCY,
        }
    }
}

/// Runs pull request searches.
pub struct SearchPipeline {
    transport: Arc<dyn Transport>,
    clock: Arc<dyn Clock>,
    settings: PipelineSettings,
}

impl SearchPipeline {
    /// Creates a pipeline over the given collaborators.
    #[must_use]
    pub fn new(
        transport: Arc<dyn Transport>,
        clock: Arc<dyn Clock>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            transport,
            clock,
            settings,
        }
    }

    /// Clock used for query construction and at-risk evaluation.
    #[must_use]
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Finds pull requests matching `criteria`, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilter`] before any remote call when the
    /// criteria are malformed, [`SearchError::Cancelled`] when `cancel`
    /// fires first, and otherwise the first error raised by the quota check,
    /// pagination, enrichment, or transformation. A rate limit rejection
    /// has its reset instant filled in from a fresh quota read when
    /// possible.
    pub async fn search(
        &self,
        criteria: &FilterCriteria,
        cancel: &CancellationSignal,
    ) -> Result<ResultSet, SearchError> {
        let now = self.clock.now();
        let query = build_query(criteria, now)?;
        info!(query = %query, "searching pull requests");

        match self.run(query, now, cancel).await {
            Err(SearchError::RateLimitExceeded {
                reset_at: None,
                message,
            }) => Err(self.with_reset_time(message, cancel).await),
            outcome => outcome,
        }
    }

    async fn run(
        &self,
        query: SearchQuery,
        now: DateTime<Utc>,
        cancel: &CancellationSignal,
    ) -> Result<ResultSet, SearchError> {
        let guard = RateLimitGuard::new(Arc::clone(&self.transport));
        until_cancelled(cancel, guard.check_quota(now)).await?;

        let mut paginator = Paginator::new(Arc::clone(&self.transport), query, self.settings.limits);
        let enricher = DetailEnricher::new(Arc::clone(&self.transport), self.settings.concurrency);

        let mut items = Vec::new();
        while let Some(records) = until_cancelled(cancel, paginator.next_page()).await? {
            if records.is_empty() {
                continue;
            }
            let enriched = until_cancelled(cancel, enricher.enrich(records)).await?;
            items.extend(transform_all(&enriched, now)?);
            debug!(collected = items.len(), "page enriched");
        }

        let result = ResultSet::new(items, paginator.total_count());
        info!(
            returned = result.items.len(),
            total_count = result.total_count,
            "search completed"
        );
        Ok(result)
    }

    async fn with_reset_time(&self, message: String, cancel: &CancellationSignal) -> SearchError {
        let guard = RateLimitGuard::new(Arc::clone(&self.transport));
        let reset_at = until_cancelled(cancel, guard.quota())
            .await
            .ok()
            .and_then(|info| info.reset_time());
        SearchError::RateLimitExceeded { reset_at, message }
    }
}

/// Runs `operation` unless `cancel` fires first.
///
/// Cancellation is checked before the operation is polled, so an already
/// cancelled signal issues no remote call.
async fn until_cancelled<T, F>(cancel: &CancellationSignal, operation: F) -> Result<T, SearchError>
where
    F: Future<Output = Result<T, SearchError>>,
{
    tokio::select! {
        biased;
        () = cancel.cancelled() => Err(SearchError::Cancelled),
        outcome = operation => outcome,
    }
}
