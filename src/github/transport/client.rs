//! Octocrab client construction for the transport.

use http::Uri;
use octocrab::Octocrab;

use crate::github::error::SearchError;
use crate::github::token::PersonalAccessToken;

/// Builds an Octocrab client for the given token and API base URL.
///
/// Octocrab composes the bearer authorisation header from the token and
/// resolves relative routes against `api_base`.
///
/// # Errors
///
/// Returns `SearchError::InvalidUrl` when the base URI cannot be parsed or
/// `SearchError::Configuration` when Octocrab fails to construct a client.
pub(super) fn build_octocrab_client(
    token: &PersonalAccessToken,
    api_base: &str,
) -> Result<Octocrab, SearchError> {
    let base_uri: Uri = api_base
        .parse::<Uri>()
        .map_err(|error| SearchError::InvalidUrl(error.to_string()))?;

    Octocrab::builder()
        .personal_token(token.as_ref())
        .base_uri(base_uri)
        .map_err(|error| SearchError::Configuration {
            message: format!("build client failed: {error}"),
        })?
        .build()
        .map_err(|error| SearchError::Configuration {
            message: format!("build client failed: {error}"),
        })
}
