//! Mapping of Octocrab failures onto [`TransportError`].

use http::StatusCode;

use super::TransportError;

/// Checks if an octocrab error represents a network/transport issue.
const fn is_network_error(error: &octocrab::Error) -> bool {
    matches!(
        error,
        octocrab::Error::Http { .. }
            | octocrab::Error::Hyper { .. }
            | octocrab::Error::Service { .. }
    )
}

/// Maps a failure to obtain a response.
pub(super) fn map_octocrab_error(error: &octocrab::Error) -> TransportError {
    if let octocrab::Error::GitHub { source, .. } = error {
        return TransportError::Http {
            status: source.status_code,
            message: source.message.clone(),
            documentation_url: source.documentation_url.clone(),
        };
    }

    if is_network_error(error) {
        return TransportError::Connection {
            message: error.to_string(),
        };
    }

    TransportError::Decode {
        message: error.to_string(),
    }
}

/// Builds an HTTP failure from a non-success response.
///
/// GitHub's JSON error body supplies the message and documentation URL when
/// present. Bodies from proxies are often HTML or empty, so the canonical
/// reason phrase stands in for the message.
pub(super) fn map_http_error(status: StatusCode, body: &str) -> TransportError {
    let parsed = serde_json::from_str::<serde_json::Value>(body).ok();
    let field = |name: &str| {
        parsed
            .as_ref()
            .and_then(|value| value.get(name))
            .and_then(serde_json::Value::as_str)
            .map(ToOwned::to_owned)
    };

    TransportError::Http {
        status,
        message: field("message").unwrap_or_else(|| fallback_message(status)),
        documentation_url: field("documentation_url"),
    }
}

fn fallback_message(status: StatusCode) -> String {
    status
        .canonical_reason()
        .map_or_else(|| format!("HTTP {}", status.as_u16()), ToOwned::to_owned)
}
