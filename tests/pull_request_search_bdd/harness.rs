//! Wiremock responders for the pull request search BDD tests.

use prowl::github::models::test_support::{
    detail_json, detail_route, issue_summary_json, rate_limit_json, search_page_json,
    summary_json,
};
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

use super::state::SearchState;

/// Path prefix of the mock GitHub Enterprise API.
pub(crate) const API_PREFIX: &str = "/api/v3";

/// Unix time at which the mock search quota resets.
pub(crate) const RATE_LIMIT_RESET_AT: i64 = 1_710_507_600;

pub(crate) const SEARCH_ROUTE: &str = "/search/issues";

fn api_path(route: &str) -> String {
    format!("{API_PREFIX}{route}")
}

pub(crate) fn mount_rate_limit(state: &SearchState, remaining: u32) {
    state.mount(
        Mock::given(method("GET"))
            .and(path(api_path("/rate_limit")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(rate_limit_json(remaining, RATE_LIMIT_RESET_AT)),
            ),
    );
}

/// Serves one search page: `newer` created yesterday, an issue without a
/// pull request locator, then `older` created two weeks ago.
pub(crate) fn mount_search_page(state: &SearchState, newer: u64, issue: u64, older: u64) {
    let page = search_page_json(
        3,
        vec![
            summary_json(newer, "open", "2024-03-14T09:00:00Z"),
            issue_summary_json(issue, "2024-03-10T09:00:00Z"),
            summary_json(older, "open", "2024-03-01T09:00:00Z"),
        ],
    );
    state.mount(
        Mock::given(method("GET"))
            .and(path(api_path(SEARCH_ROUTE)))
            .respond_with(ResponseTemplate::new(200).set_body_json(page)),
    );
}

pub(crate) fn mount_rejected_search(state: &SearchState) {
    state.mount(
        Mock::given(method("GET"))
            .and(path(api_path(SEARCH_ROUTE)))
            .respond_with(ResponseTemplate::new(422).set_body_json(json!({
                "message": "Validation Failed",
                "documentation_url": "https://docs.github.com/rest/search/search"
            }))),
    );
}

pub(crate) fn mount_detail(state: &SearchState, number: u64) {
    state.mount(
        Mock::given(method("GET"))
            .and(path(api_path(&detail_route(number))))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_json(number, 1))),
    );
}

pub(crate) fn mount_missing_detail(state: &SearchState, number: u64) {
    state.mount(
        Mock::given(method("GET"))
            .and(path(api_path(&detail_route(number))))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({
                "message": "Not Found",
                "documentation_url": "https://docs.github.com/rest"
            }))),
    );
}
