//! GitHub pull request retrieval.
//!
//! The [`SearchPipeline`] turns [`FilterCriteria`] into a bounded, enriched,
//! newest-first [`ResultSet`]. Its collaborators are passed in explicitly: a
//! [`Transport`] for REST calls and a [`Clock`] for the current instant, so
//! each stage can be exercised in isolation.

pub mod cache;
pub mod cancel;
pub mod classify;
pub mod clock;
pub mod criteria;
pub mod enrich;
pub mod error;
pub mod listing;
pub mod models;
pub mod pagination;
pub mod pipeline;
pub mod query;
pub mod rate_limit;
pub mod staleness;
pub mod token;
pub mod transform;
pub mod transport;

pub use cache::{CachedSearch, SearchCache};
pub use cancel::{CancellationHandle, CancellationSignal, cancellation};
pub use classify::classify;
pub use clock::{Clock, FixedClock, SystemClock};
pub use criteria::{DateRange, FilterCriteria, Period, PullRequestStatus, RepositorySlug};
pub use enrich::DetailEnricher;
pub use error::SearchError;
pub use listing::{SortDirection, SortKey, filter_by_search_term, sort_pull_requests};
pub use models::{PullRequest, ResultSet};
pub use pagination::{PaginationLimits, Paginator};
pub use pipeline::{PipelineSettings, SearchPipeline};
pub use query::{SearchQuery, build_query};
pub use rate_limit::{RateLimitGuard, RateLimitInfo};
pub use staleness::is_at_risk;
pub use token::PersonalAccessToken;
pub use transform::transform;
pub use transport::{OctocrabTransport, Transport, TransportError};

#[cfg(test)]
pub use transport::MockTransport;
