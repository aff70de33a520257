//! Classification of transport failures into actionable search errors.

use http::StatusCode;

use super::error::SearchError;
use super::transport::TransportError;

const RATE_LIMIT_MARKER: &str = "rate limit";
const RATE_LIMIT_DOCS_MARKER: &str = "rate-limit";

/// Maps a raw transport failure to a [`SearchError`].
///
/// Precedence: 422 is a query-breadth problem, 401 a credential problem,
/// then 403, 429, or any message mentioning the rate limit is treated as
/// quota exhaustion. Remaining HTTP failures pass their message through
/// verbatim.
#[must_use]
pub fn classify(failure: &TransportError) -> SearchError {
    match failure {
        TransportError::Http {
            status,
            message,
            documentation_url,
        } => classify_http(*status, message, documentation_url.as_deref()),
        TransportError::Connection { message } => SearchError::Network {
            message: message.clone(),
        },
        TransportError::Decode { message } => SearchError::MalformedRecord {
            message: message.clone(),
        },
    }
}

fn classify_http(status: StatusCode, message: &str, documentation_url: Option<&str>) -> SearchError {
    match status {
        StatusCode::UNPROCESSABLE_ENTITY => SearchError::QueryTooBroad {
            message: message.to_owned(),
        },
        StatusCode::UNAUTHORIZED => SearchError::Authentication {
            message: message.to_owned(),
        },
        _ if is_rate_limited(status, message, documentation_url) => {
            SearchError::RateLimitExceeded {
                reset_at: None,
                message: message.to_owned(),
            }
        }
        _ => SearchError::RemoteService {
            status: status.as_u16(),
            message: message.to_owned(),
        },
    }
}

fn is_rate_limited(status: StatusCode, message: &str, documentation_url: Option<&str>) -> bool {
    matches!(
        status,
        StatusCode::FORBIDDEN | StatusCode::TOO_MANY_REQUESTS
    ) || message.to_lowercase().contains(RATE_LIMIT_MARKER)
        || documentation_url.is_some_and(|url| url.contains(RATE_LIMIT_DOCS_MARKER))
}
