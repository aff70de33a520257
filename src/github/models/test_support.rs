//! Test helpers for constructing GitHub response bodies.
//!
//! The builders return `serde_json::Value` in the shape GitHub sends, so the
//! same fixtures drive unit tests against a mocked transport and integration
//! tests against a `wiremock` server.
//!
//! # Examples
//!
//! ```
//! use prowl::github::models::test_support::{search_page_json, summary_json};
//!
//! let page = search_page_json(1, vec![summary_json(7, "open", "2024-03-01T10:00:00Z")]);
//! assert_eq!(page["items"][0]["number"], 7);
//! ```

use serde_json::{Value, json};

/// Repository used by fixtures unless stated otherwise.
pub const FIXTURE_REPOSITORY: &str = "octo/repo";

/// Builds a search result entry for pull request `number` in
/// [`FIXTURE_REPOSITORY`].
///
/// `created_at` must be an RFC 3339 timestamp.
#[must_use]
pub fn summary_json(number: u64, state: &str, created_at: &str) -> Value {
    json!({
        "id": 1000 + number,
        "number": number,
        "title": format!("Pull request {number}"),
        "state": state,
        "user": {
            "login": "alice",
            "avatar_url": "https://avatars.example.com/alice.png"
        },
        "created_at": created_at,
        "closed_at": null,
        "comments": 2,
        "pull_request": {
            "url": detail_url(number),
            "merged_at": null
        }
    })
}

/// Builds a closed search result entry that records a merge.
#[must_use]
pub fn merged_summary_json(number: u64, created_at: &str, merged_at: &str) -> Value {
    let mut summary = summary_json(number, "closed", created_at);
    summary["closed_at"] = json!(merged_at);
    summary["pull_request"]["merged_at"] = json!(merged_at);
    summary
}

/// Builds a search result entry without a pull request locator.
#[must_use]
pub fn issue_summary_json(number: u64, created_at: &str) -> Value {
    let mut summary = summary_json(number, "open", created_at);
    if let Some(object) = summary.as_object_mut() {
        object.remove("pull_request");
    }
    summary
}

/// Absolute API URL of pull request `number` in [`FIXTURE_REPOSITORY`].
#[must_use]
pub fn detail_url(number: u64) -> String {
    format!("https://api.github.com/repos/{FIXTURE_REPOSITORY}/pulls/{number}")
}

/// API route of pull request `number` in [`FIXTURE_REPOSITORY`].
#[must_use]
pub fn detail_route(number: u64) -> String {
    format!("/repos/{FIXTURE_REPOSITORY}/pulls/{number}")
}

/// Builds a pull request detail body with the given counters.
#[must_use]
pub fn detail_json(additions: u64, deletions: u64) -> Value {
    let name = FIXTURE_REPOSITORY
        .split_once('/')
        .map_or(FIXTURE_REPOSITORY, |(_, name)| name);
    json!({
        "additions": additions,
        "deletions": deletions,
        "base": {
            "repo": {
                "name": name,
                "full_name": FIXTURE_REPOSITORY
            }
        }
    })
}

/// Builds a search response page.
#[must_use]
pub fn search_page_json(total_count: u64, items: Vec<Value>) -> Value {
    json!({
        "total_count": total_count,
        "incomplete_results": false,
        "items": items
    })
}

/// Builds a `/rate_limit` body whose search bucket has `remaining` calls
/// left, resetting at Unix time `reset`.
#[must_use]
pub fn rate_limit_json(remaining: u32, reset: i64) -> Value {
    json!({
        "resources": {
            "core": { "limit": 5000, "remaining": 5000, "reset": reset, "used": 0 },
            "search": { "limit": 30, "remaining": remaining, "reset": reset, "used": 30 - remaining.min(30) }
        },
        "rate": { "limit": 5000, "remaining": 5000, "reset": reset, "used": 0 }
    })
}
