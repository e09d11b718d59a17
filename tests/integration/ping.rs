//! Ping endpoint

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_missing_host_makes_no_adapter_calls() {
    let server = TestServer::start().await;

    for path in ["/ping", "/ping?host=", "/ping?other=1.1.1.1"] {
        let (status, body) = server.get_json(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_failure(&body, "invalid-input");
        assert_eq!(body["error"], "Host parameter is required");
    }

    assert_eq!(server.calls.total(), 0);
}

#[tokio::test]
async fn test_option_like_host_is_rejected() {
    let server = TestServer::start().await;

    for host in ["-f", "-c%20100%20example.com", "example.com%3B%20ls"] {
        let (status, _) = server.get_json(&format!("/ping?host={}", host)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", host);
    }

    assert_eq!(server.calls.total(), 0);
}

#[tokio::test]
async fn test_reachable_host() {
    let server = TestServer::start().await;
    let (status, body) = server.get_json("/ping?host=1.1.1.1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["output"].as_str().unwrap().contains("time=12.5 ms"));
}

#[tokio::test]
async fn test_unreachable_host() {
    let server = TestServer::start_with(Scenario::default().with_unreachable("10.255.255.1")).await;
    let (status, body) = server.get_json("/ping?host=10.255.255.1").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&body, "ping-failed");
    assert!(body["error"].as_str().unwrap().contains("100% packet loss"));
}
