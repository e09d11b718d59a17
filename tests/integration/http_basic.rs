//! Routing fallbacks, methods, CORS and request IDs

use crate::helpers::*;
use reqwest::{Method, StatusCode};

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = TestServer::start().await;
    let resp = server.get("/does-not-exist").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
    assert_header_starts_with(&resp, "content-type", "application/json");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(
        body,
        serde_json::json!({"success": false, "error": "Not found", "code": "not-found"})
    );
}

#[tokio::test]
async fn test_post_to_api_route_is_405() {
    let server = TestServer::start().await;
    let resp = server.request(Method::POST, "/ping?host=1.1.1.1").await;

    assert_status(&resp, StatusCode::METHOD_NOT_ALLOWED);
    assert_header(&resp, "allow", "GET, HEAD");

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_failure(&body, "method-not-allowed");
    assert_eq!(server.calls.total(), 0);
}

#[tokio::test]
async fn test_post_to_unknown_route_is_404() {
    let server = TestServer::start().await;
    let resp = server.request(Method::DELETE, "/nothing-here").await;

    assert_status(&resp, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_head_has_no_body() {
    let server = TestServer::start().await;
    let resp = server.request(Method::HEAD, "/health").await;

    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "application/json");
    assert!(resp.bytes().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = TestServer::start().await;
    let resp = server
        .request_with_headers(
            Method::OPTIONS,
            "/dns-lookup",
            &[
                ("origin", "https://tools.example.org"),
                ("access-control-request-method", "GET"),
            ],
        )
        .await;

    assert_status(&resp, StatusCode::NO_CONTENT);
    assert_header(&resp, "access-control-allow-origin", "*");
    assert_header(&resp, "access-control-allow-methods", "GET, HEAD, OPTIONS");
    assert_header(&resp, "access-control-max-age", "86400");
    assert_eq!(server.calls.total(), 0);
}

#[tokio::test]
async fn test_cors_on_regular_response() {
    let server = TestServer::start().await;
    let resp = server
        .request_with_headers(
            Method::GET,
            "/health",
            &[("origin", "https://tools.example.org")],
        )
        .await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "access-control-allow-origin", "*");
}

#[tokio::test]
async fn test_request_id() {
    let server = TestServer::start().await;

    let resp = server
        .request_with_headers(Method::GET, "/health", &[("x-request-id", "abc-123")])
        .await;
    assert_header(&resp, "x-request-id", "abc-123");

    let resp = server.get("/health").await;
    let generated = resp.headers()["x-request-id"].to_str().unwrap();
    assert_eq!(generated.len(), 12);
    assert!(generated.chars().all(|c| c.is_ascii_hexdigit()));
}
