//! Error types exposed by the pull request search layer.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors surfaced while validating criteria or retrieving pull requests.
///
/// Every variant carries enough context (status, reset time, or remediation
/// text) for the caller to act without inspecting internals.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SearchError {
    /// The filter criteria are malformed; no remote call was attempted.
    #[error("invalid filter: {message}")]
    InvalidFilter {
        /// Which part of the criteria was rejected and why.
        message: String,
    },

    /// The search quota is exhausted.
    #[error("GitHub search rate limit exceeded: {message}{}", describe_reset(.reset_at.as_ref()))]
    RateLimitExceeded {
        /// When the quota window resets, if known.
        reset_at: Option<DateTime<Utc>>,
        /// Message from GitHub or from the quota check.
        message: String,
    },

    /// The credential was rejected by GitHub.
    #[error("GitHub rejected the token: {message}")]
    Authentication {
        /// GitHub error message returned with the 401 response.
        message: String,
    },

    /// GitHub refused the query as too broad (HTTP 422).
    #[error(
        "search query rejected as too broad: {message}; narrow the repository, \
         shorten the date range, or select fewer statuses"
    )]
    QueryTooBroad {
        /// Message returned by GitHub.
        message: String,
    },

    /// GitHub returned an error that has no more specific classification.
    #[error("GitHub API error ({status}): {message}")]
    RemoteService {
        /// HTTP status code.
        status: u16,
        /// Remote message, passed through verbatim.
        message: String,
    },

    /// No response was received from GitHub.
    #[error("network error talking to GitHub: {message}")]
    Network {
        /// Transport-level error detail.
        message: String,
    },

    /// A remote record violated the expected shape.
    #[error("malformed record from GitHub: {message}")]
    MalformedRecord {
        /// What was missing or undecodable.
        message: String,
    },

    /// A remote record carried a state value outside open/closed/merged.
    #[error("unknown pull request state `{state}`")]
    UnknownStatus {
        /// The unrecognised state value.
        state: String,
    },

    /// The caller cancelled the search.
    #[error("search cancelled")]
    Cancelled,

    /// The authentication token was missing.
    #[error("personal access token is required")]
    MissingToken,

    /// A configured URL could not be parsed.
    #[error("URL is invalid: {0}")]
    InvalidUrl(String),

    /// Configuration could not be loaded.
    #[error("configuration error: {message}")]
    Configuration {
        /// Details about the configuration failure.
        message: String,
    },

    /// Local I/O operation failed.
    #[error("I/O error: {message}")]
    Io {
        /// Error detail from the underlying I/O operation.
        message: String,
    },
}

impl SearchError {
    /// Returns true when the caller may retry the same call unchanged.
    ///
    /// Only network failures qualify: quota exhaustion would be made worse by
    /// retrying, and malformed data would be reproduced.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    pub(crate) fn invalid_filter(message: impl Into<String>) -> Self {
        Self::InvalidFilter {
            message: message.into(),
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedRecord {
            message: message.into(),
        }
    }
}

fn describe_reset(reset_at: Option<&DateTime<Utc>>) -> String {
    reset_at.map_or_else(String::new, |reset| {
        format!(" (resets at {})", reset.to_rfc3339())
    })
}
