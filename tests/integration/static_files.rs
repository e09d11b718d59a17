//! Static front-end pages

use crate::helpers::*;
use reqwest::StatusCode;

fn static_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>landing</h1>").unwrap();
    std::fs::write(dir.path().join("app.html"), "<h1>tools</h1>").unwrap();
    std::fs::create_dir(dir.path().join("css")).unwrap();
    std::fs::write(dir.path().join("css/site.css"), "body { margin: 0 }").unwrap();
    dir
}

#[tokio::test]
async fn test_index_and_app_pages() {
    let dir = static_dir();
    let server = TestServer::start_in(Scenario::default(), dir.path().to_path_buf()).await;

    let resp = server.get("/").await;
    assert_status(&resp, StatusCode::OK);
    assert_header(&resp, "content-type", "text/html; charset=utf-8");
    assert_eq!(resp.text().await.unwrap(), "<h1>landing</h1>");

    let resp = server.get("/app").await;
    assert_status(&resp, StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "<h1>tools</h1>");
}

#[tokio::test]
async fn test_asset_mime_type() {
    let dir = static_dir();
    let server = TestServer::start_in(Scenario::default(), dir.path().to_path_buf()).await;

    let resp = server.get("/css/site.css").await;
    assert_status(&resp, StatusCode::OK);
    assert_header_starts_with(&resp, "content-type", "text/css");
}

#[tokio::test]
async fn test_missing_page_is_json_404() {
    let dir = tempfile::tempdir().unwrap();
    let server = TestServer::start_in(Scenario::default(), dir.path().to_path_buf()).await;

    let resp = server.get("/app").await;
    assert_status(&resp, StatusCode::NOT_FOUND);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_failure(&body, "not-found");
}

/// Test directory traversal protection
#[tokio::test]
async fn test_directory_traversal_protection() {
    let outer = tempfile::tempdir().unwrap();
    std::fs::write(outer.path().join("secret.txt"), "top secret").unwrap();
    let public = outer.path().join("public");
    std::fs::create_dir(&public).unwrap();

    let server = TestServer::start_in(Scenario::default(), public).await;

    for path in ["/../secret.txt", "/%2e%2e/secret.txt", "/..%2fsecret.txt"] {
        let resp = server.get(path).await;
        assert_status(&resp, StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_bundled_pages() {
    let server = TestServer::start().await;

    for path in ["/", "/app"] {
        let resp = server.get(path).await;
        assert_status(&resp, StatusCode::OK);
        assert!(resp.text().await.unwrap().contains("netdiag"));
    }
}
