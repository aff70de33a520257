//! The at-risk rule for long-open pull requests.
//!
//! This is the only place the rule is written down. The query builder uses
//! the same window for its stale-only term, and the transformer and result
//! cache call [`is_at_risk`] with an explicit instant.

use chrono::{DateTime, TimeDelta, Utc};

use super::criteria::PullRequestStatus;

/// Number of days after which an open pull request is considered at risk.
pub const STALENESS_WINDOW_DAYS: i64 = 7;

/// Returns the staleness window as a duration.
#[must_use]
pub fn staleness_window() -> TimeDelta {
    TimeDelta::days(STALENESS_WINDOW_DAYS)
}

/// Returns true when an open pull request created at `created_at` has been
/// open for at least the staleness window at `now`.
#[must_use]
pub fn is_at_risk(status: PullRequestStatus, created_at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    status == PullRequestStatus::Open && now.signed_duration_since(created_at) >= staleness_window()
}
