//! Transport collaborator for GitHub REST calls.
//!
//! Every pipeline component receives an explicit transport handle instead of
//! reaching for a shared client. The trait returns raw JSON so each component
//! decodes the shape it needs and reports undecodable records itself. The
//! Octocrab implementation handles bearer authentication and surfaces the
//! HTTP status and GitHub error message on failure.

mod client;
mod error_mapping;

use async_trait::async_trait;
use http::{StatusCode, Uri};
use octocrab::Octocrab;
use thiserror::Error;
use url::{Url, form_urlencoded};

use super::error::SearchError;
use super::token::PersonalAccessToken;

use client::build_octocrab_client;
use error_mapping::{map_http_error, map_octocrab_error};

/// Query parameters as ordered key/value pairs.
pub type QueryParams = [(String, String)];

/// Raw failure reported by a [`Transport`].
///
/// The error classifier turns these into [`SearchError`] variants.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// GitHub answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Http {
        /// Response status.
        status: StatusCode,
        /// `message` field of the GitHub error body.
        message: String,
        /// `documentation_url` field of the GitHub error body.
        documentation_url: Option<String>,
    },

    /// No response was received.
    #[error("connection failed: {message}")]
    Connection {
        /// Transport-level error detail.
        message: String,
    },

    /// A response was received but its body could not be decoded.
    #[error("response could not be decoded: {message}")]
    Decode {
        /// Decoder error detail.
        message: String,
    },
}

/// Issues authenticated `GET` requests against the GitHub REST API.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch `route` (relative to the API base) with `params` appended as a
    /// query string, returning the decoded JSON body.
    async fn get(
        &self,
        route: &str,
        params: &QueryParams,
    ) -> Result<serde_json::Value, TransportError>;
}

/// Octocrab-backed transport.
pub struct OctocrabTransport {
    client: Octocrab,
}

impl OctocrabTransport {
    /// Creates a transport from an Octocrab client.
    #[must_use]
    pub const fn new(client: Octocrab) -> Self {
        Self { client }
    }

    /// Builds an authenticated transport for `api_base`.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::InvalidUrl` when the base URI cannot be parsed or
    /// `SearchError::Configuration` when Octocrab fails to construct a client.
    pub fn for_token(token: &PersonalAccessToken, api_base: &Url) -> Result<Self, SearchError> {
        build_octocrab_client(token, api_base.as_str()).map(Self::new)
    }
}

#[async_trait]
impl Transport for OctocrabTransport {
    async fn get(
        &self,
        route: &str,
        params: &QueryParams,
    ) -> Result<serde_json::Value, TransportError> {
        let uri = request_uri(route, params)?;
        let response = self
            .client
            ._get(uri)
            .await
            .map_err(|error| map_octocrab_error(&error))?;

        let status = response.status();
        let body = self
            .client
            .body_to_string(response)
            .await
            .map_err(|error| map_octocrab_error(&error));

        if !status.is_success() {
            return Err(map_http_error(status, &body.unwrap_or_default()));
        }

        serde_json::from_str(&body?).map_err(|error| TransportError::Decode {
            message: error.to_string(),
        })
    }
}

/// Joins `route` and the encoded `params` into a request URI.
fn request_uri(route: &str, params: &QueryParams) -> Result<Uri, TransportError> {
    let target = if params.is_empty() {
        route.to_owned()
    } else {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(params)
            .finish();
        format!("{route}?{query}")
    };
    target.parse::<Uri>().map_err(|error| TransportError::Decode {
        message: format!("invalid route `{route}`: {error}"),
    })
}

#[cfg(test)]
mod tests;
