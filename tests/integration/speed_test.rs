//! Speed test downloads

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_large_payload() {
    let server = TestServer::start().await;
    let resp = server.get("/speed-test-file/large").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "application/octet-stream");
    assert_header(
        &resp,
        "content-disposition",
        "attachment; filename=\"speedtest-large.dat\"",
    );
    assert_header(&resp, "cache-control", "no-store");

    let body = resp.bytes().await.unwrap();
    assert_eq!(body.len(), 10 * 1024 * 1024);
    assert!(body.iter().any(|b| *b != body[0]));
}

#[tokio::test]
async fn test_unknown_size_serves_small() {
    let server = TestServer::start().await;
    let resp = server.get("/speed-test-file/enormous").await;

    assert_status(&resp, StatusCode::OK);
    assert_header(
        &resp,
        "content-disposition",
        "attachment; filename=\"speedtest-small.dat\"",
    );
    assert_eq!(resp.bytes().await.unwrap().len(), 1024 * 1024);
}

#[tokio::test]
async fn test_payloads_differ_between_requests() {
    let server = TestServer::start().await;
    let first = server.get("/speed-test-file/small").await.bytes().await.unwrap();
    let second = server.get("/speed-test-file/small").await.bytes().await.unwrap();

    assert_eq!(first.len(), second.len());
    assert_ne!(first, second);
}

#[tokio::test]
async fn test_head_reports_length_without_body() {
    let server = TestServer::start().await;
    let resp = server
        .request(reqwest::Method::HEAD, "/speed-test-file/xlarge")
        .await;

    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-length", "26214400");
    assert_header(
        &resp,
        "content-disposition",
        "attachment; filename=\"speedtest-xlarge.dat\"",
    );
    assert!(resp.bytes().await.unwrap().is_empty());
}
