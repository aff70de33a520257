//! Filter criteria accepted by the search pipeline.
//!
//! [`FilterCriteria`] is plain caller input. Validation of the repository
//! slug and the date range happens when the query is built, so that a
//! malformed value is reported as [`SearchError::InvalidFilter`] before any
//! remote call is attempted.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::Serialize;

use super::error::SearchError;

/// Status of a pull request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PullRequestStatus {
    /// Open and awaiting review or merge.
    Open,
    /// Closed without merging.
    Closed,
    /// Merged into the base branch.
    Merged,
}

impl PullRequestStatus {
    /// Returns the lowercase name used by the search grammar.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Merged => "merged",
        }
    }
}

impl fmt::Display for PullRequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PullRequestStatus {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        [Self::Open, Self::Closed, Self::Merged]
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| {
                SearchError::invalid_filter(format!(
                    "unknown status `{trimmed}` (expected open, closed, or merged)"
                ))
            })
    }
}

/// Parses a comma-separated status list such as `open,merged`.
///
/// Blank entries are ignored, duplicates collapse.
///
/// # Errors
///
/// Returns [`SearchError::InvalidFilter`] when an entry is not a known status.
pub fn parse_statuses(input: &str) -> Result<BTreeSet<PullRequestStatus>, SearchError> {
    input
        .split(',')
        .filter(|entry| !entry.trim().is_empty())
        .map(str::parse)
        .collect()
}

/// Validated `owner/name` repository identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositorySlug {
    owner: String,
    name: String,
}

impl RepositorySlug {
    /// Parses `owner/name`.
    ///
    /// Each side must be one or more ASCII letters, digits, underscores, dots,
    /// or hyphens, and must not consist only of dots.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilter`] when the value is empty or does
    /// not have the `owner/name` shape.
    pub fn parse(value: &str) -> Result<Self, SearchError> {
        let invalid = || {
            SearchError::invalid_filter(format!(
                "repository `{value}` must have the form owner/name"
            ))
        };

        let (owner, name) = value.split_once('/').ok_or_else(invalid)?;
        if !is_valid_segment(owner) || !is_valid_segment(name) {
            return Err(invalid());
        }

        Ok(Self {
            owner: owner.to_owned(),
            name: name.to_owned(),
        })
    }

    /// Repository owner.
    #[must_use]
    pub const fn owner(&self) -> &str {
        self.owner.as_str()
    }

    /// Repository name.
    #[must_use]
    pub const fn name(&self) -> &str {
        self.name.as_str()
    }
}

impl fmt::Display for RepositorySlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

fn is_valid_segment(segment: &str) -> bool {
    !segment.is_empty()
        && segment
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        && !segment.chars().all(|c| c == '.')
}

/// Inclusive UTC creation-date window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct DateRange {
    /// Earliest creation date, inclusive.
    pub start: Option<NaiveDate>,
    /// Latest creation date, inclusive.
    pub end: Option<NaiveDate>,
}

impl DateRange {
    /// Creates a range from optional bounds.
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// Returns the range covering the last `period` up to and including
    /// `today`.
    #[must_use]
    pub fn for_period(period: Period, today: NaiveDate) -> Self {
        let start = match period {
            Period::Week => today.checked_sub_days(Days::new(7)),
            Period::Month => today.checked_sub_months(Months::new(1)),
            Period::Year => today.checked_sub_months(Months::new(12)),
        };
        Self::new(start, Some(today))
    }

    /// Checks that the start bound is not after the end bound.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilter`] when `start > end`.
    pub fn validate(&self) -> Result<(), SearchError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(SearchError::invalid_filter(format!(
                "date range start {start} is after end {end}"
            ))),
            _ => Ok(()),
        }
    }
}

/// Named look-back window for [`DateRange::for_period`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    /// The last seven days.
    Week,
    /// The last calendar month.
    Month,
    /// The last twelve months.
    Year,
}

impl FromStr for Period {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "week" => Ok(Self::Week),
            "month" => Ok(Self::Month),
            "year" => Ok(Self::Year),
            other => Err(SearchError::invalid_filter(format!(
                "unknown period `{other}` (expected week, month, or year)"
            ))),
        }
    }
}

/// Parses a date bound given as `YYYY-MM-DD` or an RFC 3339 timestamp.
///
/// Timestamps are converted to UTC and their time of day is dropped.
///
/// # Errors
///
/// Returns [`SearchError::InvalidFilter`] when neither format matches.
pub fn parse_date_bound(value: &str) -> Result<NaiveDate, SearchError> {
    let trimmed = value.trim();
    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(trimmed)
        .map(|timestamp| timestamp.with_timezone(&Utc).date_naive())
        .map_err(|_| {
            SearchError::invalid_filter(format!(
                "date `{trimmed}` must be YYYY-MM-DD or an RFC 3339 timestamp"
            ))
        })
}

/// Caller-supplied search filters.
///
/// The value keys the result cache, so two criteria compare equal exactly
/// when they would produce the same query at the same instant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FilterCriteria {
    /// Repository in `owner/name` form. Required.
    pub repository: Option<String>,
    /// Statuses to filter on. Multiple statuses narrow the result.
    pub statuses: BTreeSet<PullRequestStatus>,
    /// Creation-date window.
    pub date_range: DateRange,
    /// Restrict to open pull requests older than the staleness window.
    pub stale_only: bool,
}

impl FilterCriteria {
    /// Creates criteria for `repository` with no other filters.
    #[must_use]
    pub fn for_repository(repository: impl Into<String>) -> Self {
        Self {
            repository: Some(repository.into()),
            ..Self::default()
        }
    }

    /// Adds `status` to the status filter.
    #[must_use]
    pub fn with_status(mut self, status: PullRequestStatus) -> Self {
        self.statuses.insert(status);
        self
    }

    /// Replaces the date range.
    #[must_use]
    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    /// Sets the stale-only flag.
    #[must_use]
    pub fn with_stale_only(mut self, stale_only: bool) -> Self {
        self.stale_only = stale_only;
        self
    }

    /// Validates and returns the repository slug.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilter`] when the repository is absent or
    /// malformed.
    pub fn repository_slug(&self) -> Result<RepositorySlug, SearchError> {
        let repository = self
            .repository
            .as_deref()
            .ok_or_else(|| SearchError::invalid_filter("repository is required"))?;
        RepositorySlug::parse(repository)
    }
}
