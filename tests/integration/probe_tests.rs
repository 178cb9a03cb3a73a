use crate::common::{create_test_config, USER_AGENT};
use linkwatch::config::NotifierConfig;
use linkwatch::probe::Prober;
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn prober() -> Prober {
    let config = create_test_config(":memory:", NotifierConfig::Log);
    Prober::from_config(&config).unwrap()
}

#[tokio::test]
async fn test_success_status_is_up() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
        .mount(&server)
        .await;

    let result = prober().probe(&format!("{}/", server.uri())).await;

    assert!(result.is_up);
    assert_eq!(result.status_code, Some(200));
    assert_eq!(result.error_message(), None);
}

#[tokio::test]
async fn test_redirect_is_followed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("location", format!("{}/new", server.uri()).as_str()),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/new"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let result = prober().probe(&format!("{}/old", server.uri())).await;

    assert!(result.is_up);
    assert_eq!(result.status_code, Some(200));
}

#[tokio::test]
async fn test_server_error_is_down() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = prober().probe(&server.uri()).await;

    assert!(!result.is_up);
    assert_eq!(result.status_code, Some(503));
    assert_eq!(result.error_message().as_deref(), Some("HTTP 503"));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let result = prober().probe(&server.uri()).await;

    assert!(!result.is_up);
    assert_eq!(result.status_code, None);
    assert_eq!(result.error_message().as_deref(), Some("Connection Timeout"));
    // Latency is still recorded for the failed attempt
    assert!(result.latency_secs >= 0.9);
    assert!(result.latency_secs < 3.0);
}

#[tokio::test]
async fn test_refused_connection_is_connection_error() {
    let result = prober().probe("http://127.0.0.1:1/").await;

    assert!(!result.is_up);
    assert_eq!(result.status_code, None);
    assert_eq!(result.error_message().as_deref(), Some("Connection Error"));
}

#[tokio::test]
async fn test_identifying_header_is_sent() {
    let server = MockServer::start().await;

    // Any request without the expected header falls through to a 404
    Mock::given(method("GET"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let result = prober().probe(&server.uri()).await;

    assert!(result.is_up);
    assert_eq!(result.status_code, Some(204));
}
