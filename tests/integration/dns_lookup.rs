//! DNS lookup endpoint

use netdiag::dns::RecordType;

use crate::helpers::*;
use reqwest::StatusCode;

#[tokio::test]
async fn test_missing_domain_makes_no_adapter_calls() {
    let server = TestServer::start().await;

    for path in ["/dns-lookup", "/dns-lookup?domain=", "/dns-lookup?domain=%20%20"] {
        let (status, body) = server.get_json(path).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", path);
        assert_failure(&body, "invalid-input");
        assert_eq!(body["error"], "Domain parameter is required");
    }

    assert_eq!(server.calls.total(), 0);
}

#[tokio::test]
async fn test_overlong_domain_is_rejected() {
    let server = TestServer::start().await;
    let domain = format!("{}.com", "a".repeat(260));
    let (status, body) = server.get_json(&format!("/dns-lookup?domain={}", domain)).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&body, "invalid-input");
    assert_eq!(server.calls.total(), 0);
}

#[tokio::test]
async fn test_only_answered_types_are_present() {
    let scenario = Scenario::default()
        .with_answer(RecordType::A, &["93.184.215.14"])
        .with_answer(RecordType::Mx, &["10 mail.example.com"]);
    let server = TestServer::start_with(scenario).await;

    let (status, body) = server.get_json("/dns-lookup?domain=example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ip"], "93.184.215.14");
    assert_eq!(keys(&body["records"]), vec!["A", "MX"]);
    assert_eq!(body["records"]["MX"], serde_json::json!(["10 mail.example.com"]));
    assert_eq!(server.calls.queries(), 5);
}

#[tokio::test]
async fn test_unresolvable_domain_skips_record_queries() {
    let server = TestServer::start_with(Scenario::default().with_unresolvable_domain()).await;

    let (status, body) = server.get_json("/dns-lookup?domain=nope.invalid").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_failure(&body, "resolution-failed");
    assert_eq!(body["error"], "Failed to resolve domain");
    assert!(body["details"].as_str().unwrap().contains("Name or service not known"));
    assert_eq!(server.calls.queries(), 0);
}

#[tokio::test]
async fn test_timed_out_type_is_omitted() {
    let scenario = Scenario::default()
        .with_answer(RecordType::A, &["93.184.215.14"])
        .with_answer(RecordType::Ns, &["a.iana-servers.net", "b.iana-servers.net"])
        .with_answer(RecordType::Txt, &["v=spf1 -all"])
        .with_hanging(RecordType::Aaaa);
    let server = TestServer::start_with(scenario).await;

    let (status, body) = server.get_json("/dns-lookup?domain=example.com").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&body["records"]), vec!["A", "NS", "TXT"]);
    assert_eq!(
        body["records"]["NS"],
        serde_json::json!(["a.iana-servers.net", "b.iana-servers.net"])
    );
}

#[tokio::test]
async fn test_domain_is_trimmed_and_decoded() {
    let scenario = Scenario::default().with_answer(RecordType::A, &["93.184.215.14"]);
    let server = TestServer::start_with(scenario).await;

    let (status, body) = server.get_json("/dns-lookup?domain=+example.com+").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(keys(&body), vec!["ip", "records"]);
}
