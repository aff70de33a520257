//! Remote record shapes and the pull request domain entity.
//!
//! [`SummaryRecord`] and [`DetailRecord`] mirror the search and pull request
//! endpoints and live only for the duration of one search. [`PullRequest`] is
//! the immutable domain value the pipeline returns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use super::criteria::PullRequestStatus;
use super::error::SearchError;
use super::staleness::is_at_risk;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Hard ceiling on the reported total and on materialised results.
pub const MAX_RESULTS: usize = 500;

/// Author handle attached to a search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteUser {
    /// Login handle.
    pub login: String,
    /// Avatar image URL.
    pub avatar_url: String,
}

/// Marker present on search results that are pull requests.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PullRequestLink {
    /// API URL of the pull request detail record.
    pub url: String,
    /// Merge timestamp when the pull request was merged.
    #[serde(default)]
    pub merged_at: Option<DateTime<Utc>>,
}

/// Search result entry, lacking diff statistics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SummaryRecord {
    /// Remote identifier.
    pub id: u64,
    /// Pull request number within the repository.
    pub number: u64,
    /// Title.
    pub title: String,
    /// Free-text state (`open`, `closed`).
    pub state: String,
    /// Author.
    pub user: RemoteUser,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Close timestamp, if closed.
    #[serde(default)]
    pub closed_at: Option<DateTime<Utc>>,
    /// Issue comment count.
    #[serde(default)]
    pub comments: u64,
    /// Detail locator; absent when the item is an issue.
    #[serde(default)]
    pub pull_request: Option<PullRequestLink>,
}

impl SummaryRecord {
    /// Returns true when the record carries a detail locator.
    #[must_use]
    pub const fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }

    /// Returns the API route of the detail record, relative to the API base.
    ///
    /// The route starts at the `/repos/` segment so that enterprise hosts,
    /// whose API lives under `/api/v3`, resolve against the client's base.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MalformedRecord`] when the locator is missing
    /// or is not a pull request API URL.
    pub fn detail_route(&self) -> Result<String, SearchError> {
        let link = self.pull_request.as_ref().ok_or_else(|| {
            SearchError::malformed(format!("item #{} has no pull request locator", self.number))
        })?;

        let url = Url::parse(&link.url).map_err(|error| {
            SearchError::malformed(format!(
                "item #{} has an invalid locator `{}`: {error}",
                self.number, link.url
            ))
        })?;

        let path = url.path();
        path.find("/repos/")
            .and_then(|start| path.get(start..))
            .filter(|route| route.contains("/pulls/"))
            .map(ToOwned::to_owned)
            .ok_or_else(|| {
                SearchError::malformed(format!(
                    "item #{} locator `{}` is not a pull request URL",
                    self.number, link.url
                ))
            })
    }
}

/// One page of search results.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchPage {
    /// Remote count of all matching items.
    pub total_count: u64,
    /// Items on this page, newest first.
    pub items: Vec<SummaryRecord>,
}

/// Repository identity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryRef {
    /// Short name.
    pub name: String,
    /// `owner/name`.
    #[serde(alias = "full_name")]
    pub full_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiBranch {
    repo: RepositoryRef,
}

#[derive(Debug, Clone, Deserialize)]
struct ApiPullRequestDetail {
    additions: u64,
    deletions: u64,
    base: ApiBranch,
}

/// Supplementary pull request data requiring a second lookup.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "ApiPullRequestDetail")]
pub struct DetailRecord {
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Owning repository; authoritative over anything in the summary.
    pub repository: RepositoryRef,
}

impl From<ApiPullRequestDetail> for DetailRecord {
    fn from(api: ApiPullRequestDetail) -> Self {
        Self {
            additions: api.additions,
            deletions: api.deletions,
            repository: api.base.repo,
        }
    }
}

/// A summary paired with its detail record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnrichedRecord {
    /// Search result entry.
    pub summary: SummaryRecord,
    /// Detail fetched for the entry.
    pub detail: DetailRecord,
}

/// Pull request author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    /// Login handle.
    pub login: String,
    /// Avatar image URL.
    pub avatar_url: String,
}

/// Diff and discussion counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PullRequestStats {
    /// Lines added.
    pub additions: u64,
    /// Lines deleted.
    pub deletions: u64,
    /// Issue comments.
    pub comments: u64,
}

/// Lifecycle timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequestDates {
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Close timestamp, if closed or merged.
    pub closed_at: Option<DateTime<Utc>>,
}

/// Pull request domain entity.
///
/// Values are only constructed by the transformer and are never mutated
/// afterwards; [`PullRequest::reevaluated_at`] returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PullRequest {
    id: u64,
    number: u64,
    title: String,
    status: PullRequestStatus,
    repository: RepositoryRef,
    author: Author,
    stats: PullRequestStats,
    dates: PullRequestDates,
    is_at_risk: bool,
}

/// Field values for [`PullRequest::new`].
#[derive(Debug, Clone)]
pub(crate) struct PullRequestParts {
    pub(crate) id: u64,
    pub(crate) number: u64,
    pub(crate) title: String,
    pub(crate) status: PullRequestStatus,
    pub(crate) repository: RepositoryRef,
    pub(crate) author: Author,
    pub(crate) stats: PullRequestStats,
    pub(crate) dates: PullRequestDates,
}

impl PullRequest {
    /// Assembles the entity and derives the at-risk flag at `now`.
    pub(crate) fn new(parts: PullRequestParts, now: DateTime<Utc>) -> Self {
        let at_risk = is_at_risk(parts.status, parts.dates.created_at, now);
        Self {
            id: parts.id,
            number: parts.number,
            title: parts.title,
            status: parts.status,
            repository: parts.repository,
            author: parts.author,
            stats: parts.stats,
            dates: parts.dates,
            is_at_risk: at_risk,
        }
    }

    /// Returns a copy with the at-risk flag recomputed at `now`.
    #[must_use]
    pub fn reevaluated_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            is_at_risk: is_at_risk(self.status, self.dates.created_at, now),
            ..self.clone()
        }
    }

    /// Remote identifier.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Pull request number.
    #[must_use]
    pub const fn number(&self) -> u64 {
        self.number
    }

    /// Title.
    #[must_use]
    pub const fn title(&self) -> &str {
        self.title.as_str()
    }

    /// Status.
    #[must_use]
    pub const fn status(&self) -> PullRequestStatus {
        self.status
    }

    /// Owning repository.
    #[must_use]
    pub const fn repository(&self) -> &RepositoryRef {
        &self.repository
    }

    /// Author.
    #[must_use]
    pub const fn author(&self) -> &Author {
        &self.author
    }

    /// Diff and discussion counters.
    #[must_use]
    pub const fn stats(&self) -> PullRequestStats {
        self.stats
    }

    /// Lifecycle timestamps.
    #[must_use]
    pub const fn dates(&self) -> PullRequestDates {
        self.dates
    }

    /// Whether the pull request was at risk when this value was evaluated.
    #[must_use]
    pub const fn is_at_risk(&self) -> bool {
        self.is_at_risk
    }

    /// Total changed lines.
    #[must_use]
    pub const fn changes(&self) -> u64 {
        self.stats.additions.saturating_add(self.stats.deletions)
    }

    /// Compact diff summary such as `+10 -5`.
    #[must_use]
    pub fn stats_summary(&self) -> String {
        format!("+{} -{}", self.stats.additions, self.stats.deletions)
    }
}

/// Bounded, ordered search result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSet {
    /// Pull requests, newest first.
    pub items: Vec<PullRequest>,
    /// Remote match count, capped at [`MAX_RESULTS`].
    pub total_count: u64,
}

impl ResultSet {
    /// Creates a result set, capping `remote_total` at [`MAX_RESULTS`].
    #[must_use]
    pub fn new(items: Vec<PullRequest>, remote_total: u64) -> Self {
        let ceiling = u64::try_from(MAX_RESULTS).unwrap_or(u64::MAX);
        Self {
            items,
            total_count: remote_total.min(ceiling),
        }
    }

    /// Returns a copy whose items have their at-risk flag recomputed at `now`.
    #[must_use]
    pub fn reevaluated_at(&self, now: DateTime<Utc>) -> Self {
        Self {
            items: self
                .items
                .iter()
                .map(|pull_request| pull_request.reevaluated_at(now))
                .collect(),
            total_count: self.total_count,
        }
    }
}
