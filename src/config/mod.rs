//! Application configuration loaded from CLI, environment, and files.
//!
//! Values are merged with ortho-config's layered approach.
//!
//! # Precedence
//!
//! Configuration values are loaded with the following precedence (lowest to
//! highest):
//!
//! 1. **Defaults** – Built-in application defaults
//! 2. **Configuration file** – `.prowl.toml` in the current directory, home
//!    directory, or XDG config directory
//! 3. **Environment variables** – `PROWL_REPOSITORY`, `PROWL_TOKEN`, or
//!    `GITHUB_TOKEN` for the token only
//! 4. **Command-line arguments** – `--repository`/`-r`, `--status`/`-s`,
//!    `--token`/`-t`, and the remaining long flags
//!
//! # Configuration File
//!
//! ```toml
//! repository = "octocat/hello-world"
//! status = "open"
//! period = "month"
//! token = "ghp_example"
//! api_base = "https://ghe.example.com/api/v3"
//! concurrency = 10
//! ```

use std::env;
use std::time::Duration;

use chrono::NaiveDate;
use ortho_config::OrthoConfig;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::github::criteria::{DateRange, FilterCriteria, Period, parse_date_bound, parse_statuses};
use crate::github::enrich::DEFAULT_CONCURRENCY;
use crate::github::error::SearchError;
use crate::github::listing::{SortDirection, SortKey};
use crate::github::pagination::PaginationLimits;
use crate::github::pipeline::PipelineSettings;

/// Public GitHub REST API base.
pub const DEFAULT_API_BASE: &str = "https://api.github.com";

/// Default pause between search pages, in milliseconds.
pub const DEFAULT_PAGE_DELAY_MS: u64 = 250;

/// Application configuration supporting CLI, environment, and file sources.
///
/// # Example
///
/// ```no_run
/// use ortho_config::OrthoConfig;
/// use prowl::ProwlConfig;
///
/// let config = ProwlConfig::load().expect("failed to load configuration");
/// let token = config.resolve_token().expect("token required");
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, OrthoConfig)]
#[serde(default)]
#[ortho_config(
    prefix = "PROWL",
    discovery(
        dotfile_name = ".prowl.toml",
        config_file_name = "prowl.toml",
        app_name = "prowl"
    )
)]
pub struct ProwlConfig {
    /// Personal access token for GitHub API authentication.
    ///
    /// Can be provided via:
    /// - CLI: `--token <TOKEN>` or `-t <TOKEN>`
    /// - Environment: `PROWL_TOKEN` or `GITHUB_TOKEN`
    /// - Config file: `token = "..."`
    #[ortho_config(cli_short = 't')]
    pub token: Option<String>,

    /// Repository to search, as `owner/name`.
    #[ortho_config(cli_short = 'r')]
    pub repository: Option<String>,

    /// Comma-separated statuses (`open`, `closed`, `merged`).
    ///
    /// Several statuses narrow the search: GitHub requires every `is:`
    /// predicate to match.
    #[ortho_config(cli_short = 's')]
    pub status: Option<String>,

    /// Earliest creation date, `YYYY-MM-DD` or RFC 3339.
    #[ortho_config()]
    pub since: Option<String>,

    /// Latest creation date, `YYYY-MM-DD` or RFC 3339.
    #[ortho_config()]
    pub until: Option<String>,

    /// Look-back window (`week`, `month`, `year`) ending today. Cannot be
    /// combined with `since` or `until`.
    #[ortho_config()]
    pub period: Option<String>,

    /// Only open pull requests older than seven days.
    #[ortho_config()]
    pub stale_only: bool,

    /// Free-text filter applied to the retrieved pull requests.
    #[ortho_config()]
    pub search: Option<String>,

    /// Sort key for the output (`created`, `changes`, `number`, `title`,
    /// `author`, `repository`).
    #[ortho_config()]
    pub sort: Option<String>,

    /// Sort ascending instead of descending.
    #[ortho_config()]
    pub ascending: bool,

    /// Print JSON instead of a table.
    #[ortho_config(cli_short = 'j')]
    pub json: bool,

    /// REST API base URL; set for GitHub Enterprise hosts.
    #[ortho_config()]
    pub api_base: String,

    /// Pause between search pages, in milliseconds.
    #[ortho_config()]
    pub page_delay_ms: u64,

    /// Detail lookups in flight.
    #[ortho_config()]
    pub concurrency: usize,

    /// Emit telemetry events to stderr as JSON lines.
    #[ortho_config()]
    pub telemetry: bool,
}

impl Default for ProwlConfig {
    fn default() -> Self {
        Self {
            token: None,
            repository: None,
            status: None,
            since: None,
            until: None,
            period: None,
            stale_only: false,
            search: None,
            sort: None,
            ascending: false,
            json: false,
            api_base: DEFAULT_API_BASE.to_owned(),
            page_delay_ms: DEFAULT_PAGE_DELAY_MS,
            concurrency: DEFAULT_CONCURRENCY,
            telemetry: false,
        }
    }
}

impl ProwlConfig {
    /// Resolves the token from configuration or the `GITHUB_TOKEN`
    /// environment variable.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::MissingToken`] when no token source provides a
    /// value.
    pub fn resolve_token(&self) -> Result<String, SearchError> {
        self.token
            .clone()
            .or_else(|| env::var("GITHUB_TOKEN").ok())
            .ok_or(SearchError::MissingToken)
    }

    /// Builds filter criteria from the configured values.
    ///
    /// `today` anchors the `period` window.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilter`] when a status, date, or period
    /// cannot be parsed, and [`SearchError::Configuration`] when `period` is
    /// combined with explicit bounds.
    pub fn filter_criteria(&self, today: NaiveDate) -> Result<FilterCriteria, SearchError> {
        let statuses = self
            .status
            .as_deref()
            .map(parse_statuses)
            .transpose()?
            .unwrap_or_default();

        Ok(FilterCriteria {
            repository: self.repository.clone(),
            statuses,
            date_range: self.date_range(today)?,
            stale_only: self.stale_only,
        })
    }

    fn date_range(&self, today: NaiveDate) -> Result<DateRange, SearchError> {
        let start = self.since.as_deref().map(parse_date_bound).transpose()?;
        let end = self.until.as_deref().map(parse_date_bound).transpose()?;

        let Some(period) = self.period.as_deref() else {
            return Ok(DateRange::new(start, end));
        };

        if start.is_some() || end.is_some() {
            return Err(SearchError::Configuration {
                message: "period cannot be combined with since or until".to_owned(),
            });
        }
        Ok(DateRange::for_period(period.parse::<Period>()?, today))
    }

    /// Parses the API base URL.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidUrl`] when the value is not a URL.
    pub fn api_base_url(&self) -> Result<Url, SearchError> {
        Url::parse(&self.api_base)
            .map_err(|error| SearchError::InvalidUrl(format!("{}: {error}", self.api_base)))
    }

    /// Pipeline tunables derived from the configuration.
    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            limits: PaginationLimits {
                page_delay: Duration::from_millis(self.page_delay_ms),
                ..PaginationLimits::default()
            },
            concurrency: self.concurrency,
        }
    }

    /// Parses the output sort key, defaulting to creation date.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidFilter`] for an unknown key.
    pub fn sort_key(&self) -> Result<SortKey, SearchError> {
        self.sort
            .as_deref()
            .map(str::parse)
            .transpose()
            .map(Option::unwrap_or_default)
    }

    /// Output sort direction.
    #[must_use]
    pub const fn sort_direction(&self) -> SortDirection {
        if self.ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }
}

#[cfg(test)]
mod tests;
