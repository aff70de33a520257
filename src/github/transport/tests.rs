//! Tests for the Octocrab transport.

use std::net::TcpListener;

use http::StatusCode;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;
use url::Url;
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::{OctocrabTransport, Transport, TransportError};
use crate::github::classify::classify;
use crate::github::error::SearchError;
use crate::github::token::PersonalAccessToken;

struct TransportFixture {
    runtime: Runtime,
    server: MockServer,
    transport: OctocrabTransport,
}

impl TransportFixture {
    fn block_on<F: std::future::Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    fn mount(&self, mock: Mock) {
        self.block_on(mock.mount(&self.server));
    }
}

#[fixture]
fn token() -> PersonalAccessToken {
    PersonalAccessToken::new("valid-token").expect("token should be valid")
}

fn api_base(server: &MockServer) -> Url {
    Url::parse(&format!("{}/api/v3", server.uri())).expect("server URI should parse")
}

#[fixture]
fn transport_fixture(token: PersonalAccessToken) -> TransportFixture {
    let runtime = Runtime::new().expect("runtime should start");
    let server = runtime.block_on(MockServer::start());
    let transport = {
        let _guard = runtime.enter();
        OctocrabTransport::for_token(&token, &api_base(&server))
            .expect("should create transport")
    };
    TransportFixture {
        runtime,
        server,
        transport,
    }
}

#[rstest]
fn get_returns_json_body_and_forwards_params(transport_fixture: TransportFixture) {
    transport_fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/search/issues"))
            .and(query_param("q", "is:pr repo:octo/repo"))
            .and(query_param("page", "2"))
            .and(header_exists("authorization"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "total_count": 0, "items": [] })),
            ),
    );

    let params = vec![
        ("q".to_owned(), "is:pr repo:octo/repo".to_owned()),
        ("page".to_owned(), "2".to_owned()),
    ];
    let body = transport_fixture
        .block_on(transport_fixture.transport.get("/search/issues", &params))
        .expect("request should succeed");

    assert_eq!(body["total_count"], 0);
}

#[rstest]
fn get_without_params_fetches_route(transport_fixture: TransportFixture) {
    transport_fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/repos/octo/repo/pulls/7"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "additions": 3 })),
            ),
    );

    let body = transport_fixture
        .block_on(
            transport_fixture
                .transport
                .get("/repos/octo/repo/pulls/7", &[]),
        )
        .expect("request should succeed");

    assert_eq!(body["additions"], 3);
}

#[rstest]
#[case::rate_limited(403, "API rate limit exceeded for user")]
#[case::unprocessable(422, "Validation Failed")]
#[case::unauthorised(401, "Bad credentials")]
fn get_surfaces_status_and_message(
    transport_fixture: TransportFixture,
    #[case] status: u16,
    #[case] message: &str,
) {
    transport_fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/rate_limit"))
            .respond_with(ResponseTemplate::new(status).set_body_json(serde_json::json!({
                "message": message,
                "documentation_url": "https://docs.github.com/rest"
            }))),
    );

    let error = transport_fixture
        .block_on(transport_fixture.transport.get("/rate_limit", &[]))
        .expect_err("request should fail");

    match error {
        TransportError::Http {
            status: actual_status,
            message: actual_message,
            documentation_url,
        } => {
            assert_eq!(
                actual_status,
                StatusCode::from_u16(status).expect("status should be valid")
            );
            assert_eq!(actual_message, message);
            assert_eq!(
                documentation_url.as_deref(),
                Some("https://docs.github.com/rest")
            );
        }
        other => panic!("expected Http error, got {other:?}"),
    }
}

#[rstest]
fn get_keeps_status_when_error_body_is_not_json(transport_fixture: TransportFixture) {
    transport_fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/search/issues"))
            .respond_with(ResponseTemplate::new(502).set_body_string("<html>Bad Gateway</html>")),
    );

    let error = transport_fixture
        .block_on(transport_fixture.transport.get("/search/issues", &[]))
        .expect_err("request should fail");

    assert_eq!(
        error,
        TransportError::Http {
            status: StatusCode::BAD_GATEWAY,
            message: "Bad Gateway".to_owned(),
            documentation_url: None,
        }
    );
    assert_eq!(
        classify(&error),
        SearchError::RemoteService {
            status: 502,
            message: "Bad Gateway".to_owned(),
        }
    );
}

#[rstest]
fn plain_text_forbidden_is_still_rate_limited(transport_fixture: TransportFixture) {
    transport_fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/search/issues"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Forbidden")),
    );

    let error = transport_fixture
        .block_on(transport_fixture.transport.get("/search/issues", &[]))
        .expect_err("request should fail");

    assert!(
        matches!(classify(&error), SearchError::RateLimitExceeded { reset_at: None, .. }),
        "expected rate limit, got {error:?}"
    );
}

#[rstest]
fn get_reports_undecodable_success_body(transport_fixture: TransportFixture) {
    transport_fixture.mount(
        Mock::given(method("GET"))
            .and(path("/api/v3/rate_limit"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json")),
    );

    let error = transport_fixture
        .block_on(transport_fixture.transport.get("/rate_limit", &[]))
        .expect_err("request should fail");

    assert!(
        matches!(error, TransportError::Decode { .. }),
        "expected Decode, got {error:?}"
    );
}

/// Returns a loopback URL whose port has no listener.
fn closed_port_base() -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").expect("listener should bind");
    let port = listener
        .local_addr()
        .expect("listener should have an address")
        .port();
    drop(listener);
    Url::parse(&format!("http://127.0.0.1:{port}/api/v3")).expect("URL should parse")
}

#[rstest]
fn get_reports_connection_failures(token: PersonalAccessToken) {
    let runtime = Runtime::new().expect("runtime should start");
    let base = closed_port_base();
    let transport = {
        let _guard = runtime.enter();
        OctocrabTransport::for_token(&token, &base).expect("should create transport")
    };

    let error = runtime
        .block_on(transport.get("/rate_limit", &[]))
        .expect_err("request should fail without a listener");

    assert!(
        matches!(error, TransportError::Connection { .. }),
        "expected Connection, got {error:?}"
    );
    assert!(classify(&error).is_retryable());
}
