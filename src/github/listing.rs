//! Client-side ordering and filtering of retrieved pull requests.

use std::cmp::Ordering;
use std::str::FromStr;

use super::error::SearchError;
use super::models::PullRequest;

/// Field to order pull requests by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortKey {
    /// Creation timestamp.
    #[default]
    Created,
    /// Added plus deleted lines.
    Changes,
    /// Pull request number.
    Number,
    /// Title, case-insensitive.
    Title,
    /// Author login, case-insensitive.
    Author,
    /// Repository full name, case-insensitive.
    Repository,
}

impl FromStr for SortKey {
    type Err = SearchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "created" | "date" | "dates" => Ok(Self::Created),
            "changes" => Ok(Self::Changes),
            "number" => Ok(Self::Number),
            "title" => Ok(Self::Title),
            "author" => Ok(Self::Author),
            "repository" | "repo" => Ok(Self::Repository),
            other => Err(SearchError::invalid_filter(format!(
                "unknown sort key `{other}` (expected created, changes, number, title, author, \
                 or repository)"
            ))),
        }
    }
}

/// Ordering direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    /// Smallest first.
    Ascending,
    /// Largest first.
    #[default]
    Descending,
}

/// Sorts `pull_requests` in place. Equal elements keep their order.
pub fn sort_pull_requests(pull_requests: &mut [PullRequest], key: SortKey, direction: SortDirection) {
    pull_requests.sort_by(|left, right| {
        let ordering = compare(left, right, key);
        match direction {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    });
}

fn compare(left: &PullRequest, right: &PullRequest, key: SortKey) -> Ordering {
    match key {
        SortKey::Created => left.dates().created_at.cmp(&right.dates().created_at),
        SortKey::Changes => left.changes().cmp(&right.changes()),
        SortKey::Number => left.number().cmp(&right.number()),
        SortKey::Title => compare_text(left.title(), right.title()),
        SortKey::Author => compare_text(&left.author().login, &right.author().login),
        SortKey::Repository => compare_text(
            &left.repository().full_name,
            &right.repository().full_name,
        ),
    }
}

fn compare_text(left: &str, right: &str) -> Ordering {
    left.to_lowercase().cmp(&right.to_lowercase())
}

/// Returns the pull requests whose title, author login, repository full
/// name, or number contains `term`, ignoring case. A blank term keeps all.
#[must_use]
pub fn filter_by_search_term(pull_requests: &[PullRequest], term: &str) -> Vec<PullRequest> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return pull_requests.to_vec();
    }

    pull_requests
        .iter()
        .filter(|pull_request| matches_term(pull_request, &needle))
        .cloned()
        .collect()
}

fn matches_term(pull_request: &PullRequest, needle: &str) -> bool {
    pull_request.title().to_lowercase().contains(needle)
        || pull_request.author().login.to_lowercase().contains(needle)
        || pull_request
            .repository()
            .full_name
            .to_lowercase()
            .contains(needle)
        || pull_request.number().to_string().contains(needle)
}
