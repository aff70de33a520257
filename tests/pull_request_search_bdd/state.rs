//! Scenario state for the pull request search BDD tests.
//!
//! Each scenario owns a Tokio runtime and a Wiremock server standing in for
//! a GitHub Enterprise host at `/api/v3`.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use prowl::github::{
    CancellationSignal, FilterCriteria, FixedClock, OctocrabTransport, PaginationLimits,
    PersonalAccessToken, PipelineSettings, ResultSet, SearchError, SearchPipeline,
};
use rstest_bdd::Slot;
use tokio::runtime::Runtime;
use url::Url;
use wiremock::{Mock, MockServer, Request};

/// Instant the scenarios treat as now.
pub(crate) const NOW: &str = "2024-03-15T12:00:00Z";

pub(crate) struct SearchState {
    runtime: Runtime,
    server: MockServer,
    pub(crate) result: Slot<ResultSet>,
    pub(crate) error: Slot<SearchError>,
}

impl SearchState {
    pub(crate) fn start() -> Self {
        let runtime = Runtime::new()
            .unwrap_or_else(|error| panic!("failed to create Tokio runtime: {error}"));
        let server = runtime.block_on(MockServer::start());
        Self {
            runtime,
            server,
            result: Slot::default(),
            error: Slot::default(),
        }
    }

    pub(crate) fn mount(&self, mock: Mock) {
        self.runtime.block_on(mock.mount(&self.server));
    }

    /// Requests the server received for `path`, relative to the API base.
    pub(crate) fn requests_to(&self, path: &str) -> Vec<Request> {
        let full_path = format!("{}{path}", super::harness::API_PREFIX);
        self.runtime
            .block_on(self.server.received_requests())
            .unwrap_or_default()
            .into_iter()
            .filter(|request| request.url.path() == full_path)
            .collect()
    }

    /// Runs a search for `repository` and stores the outcome.
    pub(crate) fn search(&self, repository: &str) {
        match self.run_search(repository) {
            Ok(result) => {
                let _had_previous_error = self.error.take().is_some();
                self.result.set(result);
            }
            Err(error) => {
                let _had_previous_result = self.result.take().is_some();
                self.error.set(error);
            }
        }
    }

    fn run_search(&self, repository: &str) -> Result<ResultSet, SearchError> {
        let api_base = Url::parse(&format!(
            "{}{}",
            self.server.uri(),
            super::harness::API_PREFIX
        ))
        .map_err(|error| SearchError::InvalidUrl(error.to_string()))?;
        let token = PersonalAccessToken::new("ghp_scenario")?;
        let settings = PipelineSettings {
            limits: PaginationLimits {
                page_delay: std::time::Duration::ZERO,
                ..PaginationLimits::default()
            },
            ..PipelineSettings::default()
        };
        let criteria = FilterCriteria::for_repository(repository);

        self.runtime.block_on(async {
            let transport = OctocrabTransport::for_token(&token, &api_base)?;
            let pipeline = SearchPipeline::new(
                Arc::new(transport),
                Arc::new(FixedClock::new(now())),
                settings,
            );
            pipeline.search(&criteria, &CancellationSignal::never()).await
        })
    }
}

pub(crate) fn now() -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(NOW)
        .unwrap_or_else(|error| panic!("invalid scenario timestamp: {error}"))
        .with_timezone(&Utc)
}
