//! Conversion of remote record pairs into [`PullRequest`] values.

use chrono::{DateTime, Utc};

use super::criteria::PullRequestStatus;
use super::error::SearchError;
use super::models::{
    Author, DetailRecord, EnrichedRecord, PullRequest, PullRequestDates, PullRequestParts,
    PullRequestStats, SummaryRecord,
};

/// Builds the domain entity from a summary and its detail record.
///
/// Only the supplied `now` is consulted, so the same inputs always produce
/// the same value.
///
/// # Errors
///
/// Returns [`SearchError::UnknownStatus`] when the summary state is not one
/// of `open`, `closed`, or `merged`.
pub fn transform(
    summary: &SummaryRecord,
    detail: &DetailRecord,
    now: DateTime<Utc>,
) -> Result<PullRequest, SearchError> {
    let status = map_status(summary)?;

    let parts = PullRequestParts {
        id: summary.id,
        number: summary.number,
        title: summary.title.clone(),
        status,
        repository: detail.repository.clone(),
        author: Author {
            login: summary.user.login.clone(),
            avatar_url: summary.user.avatar_url.clone(),
        },
        stats: PullRequestStats {
            additions: detail.additions,
            deletions: detail.deletions,
            comments: summary.comments,
        },
        dates: PullRequestDates {
            created_at: summary.created_at,
            closed_at: summary.closed_at,
        },
    };

    Ok(PullRequest::new(parts, now))
}

/// Transforms every enriched record in order.
///
/// # Errors
///
/// Returns the first [`transform`] error.
pub fn transform_all(
    records: &[EnrichedRecord],
    now: DateTime<Utc>,
) -> Result<Vec<PullRequest>, SearchError> {
    records
        .iter()
        .map(|record| transform(&record.summary, &record.detail, now))
        .collect()
}

fn map_status(summary: &SummaryRecord) -> Result<PullRequestStatus, SearchError> {
    let state = summary.state.as_str();
    if state.eq_ignore_ascii_case("open") {
        return Ok(PullRequestStatus::Open);
    }
    if state.eq_ignore_ascii_case("merged") {
        return Ok(PullRequestStatus::Merged);
    }
    if state.eq_ignore_ascii_case("closed") {
        let merged = summary
            .pull_request
            .as_ref()
            .is_some_and(|link| link.merged_at.is_some());
        return Ok(if merged {
            PullRequestStatus::Merged
        } else {
            PullRequestStatus::Closed
        });
    }

    Err(SearchError::UnknownStatus {
        state: summary.state.clone(),
    })
}
