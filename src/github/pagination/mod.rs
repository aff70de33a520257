//! Sequential retrieval of search result pages.
//!
//! The [`Paginator`] walks `/search/issues` one page at a time in strict
//! order, newest first. Whether another page is requested is decided by the
//! pure [`transition`] function in [`state`], so the stop rules (short page,
//! result cap, page cap, failure) can be tested without a transport.

mod state;

use std::sync::Arc;

use tracing::debug;

use super::classify::classify;
use super::error::SearchError;
use super::models::{SearchPage, SummaryRecord};
use super::query::SearchQuery;
use super::transport::Transport;

pub use state::{PageEvent, PageState, PaginationLimits, transition};

/// API route of the search endpoint.
pub const SEARCH_ROUTE: &str = "/search/issues";

/// Records collected by [`Paginator::fetch_all`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectedPages {
    /// Filtered records in page order.
    pub records: Vec<SummaryRecord>,
    /// Remote match count reported by the last page fetched.
    pub total_count: u64,
}

/// Fetches search pages for one query.
///
/// A paginator is single-use: once it reaches [`PageState::Done`] or
/// [`PageState::Failed`] every further call to [`Paginator::next_page`]
/// returns `Ok(None)`.
pub struct Paginator {
    transport: Arc<dyn Transport>,
    query: SearchQuery,
    limits: PaginationLimits,
    state: PageState,
    total_count: u64,
}

impl Paginator {
    /// Creates a paginator positioned before the first page.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, query: SearchQuery, limits: PaginationLimits) -> Self {
        Self {
            transport,
            query,
            limits,
            state: PageState::START,
            total_count: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> PageState {
        self.state
    }

    /// Remote match count reported by the most recent page, 0 before the
    /// first page.
    #[must_use]
    pub const fn total_count(&self) -> u64 {
        self.total_count
    }

    /// Fetches and filters the next page.
    ///
    /// Records without a detail locator are dropped, and the page is
    /// truncated so the running total never exceeds the result cap. Before
    /// every page after the first the configured delay is awaited.
    ///
    /// # Errors
    ///
    /// Returns the classified transport failure, or
    /// [`SearchError::MalformedRecord`] when the page cannot be decoded. The
    /// paginator is then failed.
    pub async fn next_page(&mut self) -> Result<Option<Vec<SummaryRecord>>, SearchError> {
        let PageState::Fetching { page, collected } = self.state else {
            return Ok(None);
        };

        if page > 1 && !self.limits.page_delay.is_zero() {
            tokio::time::sleep(self.limits.page_delay).await;
        }

        let search_page = match self.fetch(page).await {
            Ok(search_page) => search_page,
            Err(error) => {
                self.state = transition(self.state, PageEvent::Failed, &self.limits);
                return Err(error);
            }
        };

        self.total_count = search_page.total_count;
        let raw_len = search_page.items.len();
        self.state = transition(self.state, PageEvent::Fetched { raw_len }, &self.limits);

        let room = self.limits.max_results.saturating_sub(collected);
        let records: Vec<SummaryRecord> = search_page
            .items
            .into_iter()
            .filter(SummaryRecord::is_pull_request)
            .take(room)
            .collect();

        self.state = transition(
            self.state,
            PageEvent::Filtered {
                kept: records.len(),
            },
            &self.limits,
        );
        debug!(
            page,
            raw_len,
            kept = records.len(),
            total_count = self.total_count,
            "search page fetched"
        );

        Ok(Some(records))
    }

    /// Drains every remaining page.
    ///
    /// # Errors
    ///
    /// Returns the first error from [`Paginator::next_page`]; records from
    /// earlier pages are discarded.
    pub async fn fetch_all(mut self) -> Result<CollectedPages, SearchError> {
        let mut records = Vec::new();
        while let Some(page) = self.next_page().await? {
            records.extend(page);
        }
        Ok(CollectedPages {
            records,
            total_count: self.total_count,
        })
    }

    async fn fetch(&self, page: u32) -> Result<SearchPage, SearchError> {
        let params = self.params(page);
        let body = self
            .transport
            .get(SEARCH_ROUTE, &params)
            .await
            .map_err(|error| classify(&error))?;

        serde_json::from_value(body).map_err(|error| {
            SearchError::malformed(format!("search page {page}: {error}"))
        })
    }

    fn params(&self, page: u32) -> Vec<(String, String)> {
        vec![
            ("q".to_owned(), self.query.as_str().to_owned()),
            ("sort".to_owned(), "created".to_owned()),
            ("order".to_owned(), "desc".to_owned()),
            ("per_page".to_owned(), self.limits.per_page.to_string()),
            ("page".to_owned(), page.to_string()),
        ]
    }
}
