//! Prowl library crate for finding pull requests in a GitHub repository.
//!
//! The library builds search queries from filter criteria, checks the search
//! quota, pages through results, enriches each pull request with diff
//! statistics, and flags long-open pull requests as at risk. Failures are
//! classified into errors that tell the caller what to do next.

pub mod config;
pub mod github;
pub mod telemetry;

pub use config::ProwlConfig;
pub use github::{
    CancellationSignal, FilterCriteria, OctocrabTransport, PersonalAccessToken, PullRequest,
    PullRequestStatus, ResultSet, SearchError, SearchPipeline,
};
