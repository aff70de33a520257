//! Translation of filter criteria into the GitHub search grammar.
//!
//! Terms are emitted in a fixed order: the pull-request anchor, the
//! repository, one `is:` predicate per status, creation-date bounds, and
//! finally the stale-only restriction.
//!
//! The grammar ANDs independent `is:` predicates, so selecting several
//! statuses narrows the result rather than widening it. GitHub offers no OR
//! form for these qualifiers, and the behaviour is kept as is.

use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};

use super::criteria::{FilterCriteria, PullRequestStatus};
use super::error::SearchError;
use super::staleness::staleness_window;

const PULL_REQUEST_TERM: &str = "is:pr";
const DATE_FORMAT: &str = "%Y-%m-%d";
const CUTOFF_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

/// A built search query string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery(String);

impl SearchQuery {
    /// Borrow the query string.
    #[must_use]
    pub const fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for SearchQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Builds the search query for `criteria` as evaluated at `now`.
///
/// `now` only affects the stale-only term.
///
/// # Errors
///
/// Returns [`SearchError::InvalidFilter`] when the repository is missing or
/// not of the form `owner/name`, or when the date range is inverted.
///
/// # Example
///
/// ```
/// use chrono::Utc;
/// use prowl::github::{FilterCriteria, PullRequestStatus, build_query};
///
/// let criteria = FilterCriteria::for_repository("octo/repo")
///     .with_status(PullRequestStatus::Open);
/// let query = build_query(&criteria, Utc::now()).expect("criteria should be valid");
/// assert_eq!(query.as_str(), "is:pr repo:octo/repo is:open");
/// ```
pub fn build_query(criteria: &FilterCriteria, now: DateTime<Utc>) -> Result<SearchQuery, SearchError> {
    let repository = criteria.repository_slug()?;
    criteria.date_range.validate()?;

    let mut terms = vec![PULL_REQUEST_TERM.to_owned(), format!("repo:{repository}")];

    terms.extend(
        criteria
            .statuses
            .iter()
            .map(|status| status_term(*status)),
    );

    if let Some(start) = criteria.date_range.start {
        terms.push(format!("created:>={}", format_date(start)));
    }
    if let Some(end) = criteria.date_range.end {
        terms.push(format!("created:<={}", format_date(end)));
    }

    if criteria.stale_only {
        if !criteria.statuses.contains(&PullRequestStatus::Open) {
            terms.push(status_term(PullRequestStatus::Open));
        }
        // A bare date would match the whole cutoff day.
        let cutoff = now - staleness_window();
        terms.push(format!("created:<={}", cutoff.format(CUTOFF_FORMAT)));
    }

    Ok(SearchQuery(terms.join(" ")))
}

fn status_term(status: PullRequestStatus) -> String {
    format!("is:{status}")
}

fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}
