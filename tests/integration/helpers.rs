//! Test server and counting fake adapters

use std::collections::HashMap;
use std::net::IpAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Method, Response, StatusCode};

use netdiag::api::{Adapters, Diagnostics, Settings};
use netdiag::config::MiddlewareConfig;
use netdiag::dns::{DnsResolver, RecordError, RecordType, ResolveFailure};
use netdiag::middleware;
use netdiag::probe::{PingProbe, ProbeError};
use netdiag::system::{HostMetrics, HostSnapshot, MetricsError};
use netdiag::upstream::{GeoInfo, PublicIpClient, UpstreamError};
use netdiag::Server;

pub const IP_SERVICE_URL: &str = "https://api.ipify.org?format=json";
pub const GEO_SERVICE_URL: &str = "http://ip-api.com/json/203.0.113.9";

/// Adapter calls observed by the fakes.
#[derive(Default)]
pub struct CallCounts {
    pub resolve: AtomicUsize,
    pub query: AtomicUsize,
    pub ping: AtomicUsize,
    pub snapshot: AtomicUsize,
    pub public_ip: AtomicUsize,
    pub geolocate: AtomicUsize,
}

#[allow(dead_code)]
impl CallCounts {
    pub fn total(&self) -> usize {
        [
            &self.resolve,
            &self.query,
            &self.ping,
            &self.snapshot,
            &self.public_ip,
            &self.geolocate,
        ]
        .iter()
        .map(|c| c.load(Ordering::SeqCst))
        .sum()
    }

    pub fn queries(&self) -> usize {
        self.query.load(Ordering::SeqCst)
    }
}

/// How a fake outbound service call ends.
#[derive(Clone, Copy, Debug)]
#[allow(dead_code)]
pub enum Upstream {
    Ok,
    Timeout,
    Refused,
}

impl Upstream {
    fn fail(self, url: &str) -> Option<UpstreamError> {
        match self {
            Upstream::Ok => None,
            Upstream::Timeout => Some(UpstreamError::Timeout { url: url.into() }),
            Upstream::Refused => Some(UpstreamError::Transport {
                url: url.into(),
                message: "connection refused".into(),
            }),
        }
    }
}

/// What the fake adapters answer.
#[derive(Clone, Debug)]
pub struct Scenario {
    /// Primary address; `None` behaves like NXDOMAIN.
    pub primary: Option<IpAddr>,
    /// Record answers; unlisted types report no answer.
    pub answers: HashMap<RecordType, Vec<String>>,
    /// Record types whose query never completes.
    pub hanging: Vec<RecordType>,
    /// Hosts the ping probe cannot reach.
    pub unreachable: Vec<String>,
    pub public_ip: Upstream,
    pub geo: Upstream,
    pub metrics_available: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            primary: Some("93.184.215.14".parse().unwrap()),
            answers: HashMap::new(),
            hanging: Vec::new(),
            unreachable: Vec::new(),
            public_ip: Upstream::Ok,
            geo: Upstream::Ok,
            metrics_available: true,
        }
    }
}

#[allow(dead_code)]
impl Scenario {
    pub fn with_answer(mut self, record_type: RecordType, values: &[&str]) -> Self {
        self.answers
            .insert(record_type, values.iter().map(|v| v.to_string()).collect());
        self
    }

    pub fn with_hanging(mut self, record_type: RecordType) -> Self {
        self.hanging.push(record_type);
        self
    }

    pub fn with_unresolvable_domain(mut self) -> Self {
        self.primary = None;
        self
    }

    pub fn with_unreachable(mut self, host: &str) -> Self {
        self.unreachable.push(host.to_string());
        self
    }
}

struct Fake {
    scenario: Arc<Scenario>,
    calls: Arc<CallCounts>,
}

#[async_trait]
impl DnsResolver for Fake {
    async fn resolve_primary(&self, domain: &str) -> Result<IpAddr, ResolveFailure> {
        self.calls.resolve.fetch_add(1, Ordering::SeqCst);
        self.scenario.primary.ok_or_else(|| {
            ResolveFailure::new(
                domain,
                "failed to lookup address information: Name or service not known",
            )
        })
    }

    async fn query(
        &self,
        _domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, RecordError> {
        self.calls.query.fetch_add(1, Ordering::SeqCst);
        if self.scenario.hanging.contains(&record_type) {
            tokio::time::sleep(Duration::from_secs(30)).await;
        }
        self.scenario
            .answers
            .get(&record_type)
            .cloned()
            .ok_or(RecordError::NoAnswer)
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[async_trait]
impl PingProbe for Fake {
    async fn ping(&self, host: &str) -> Result<String, ProbeError> {
        self.calls.ping.fetch_add(1, Ordering::SeqCst);
        if self.scenario.unreachable.iter().any(|h| h == host) {
            return Err(ProbeError::Failed {
                code: Some(1),
                output: format!(
                    "PING {host} ({host}) 56(84) bytes of data.\n\n--- {host} ping statistics ---\n1 packets transmitted, 0 received, 100% packet loss, time 0ms\n"
                ),
            });
        }
        Ok(format!(
            "PING {host} ({host}) 56(84) bytes of data.\n64 bytes from {host}: icmp_seq=1 ttl=57 time=12.5 ms\n"
        ))
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[async_trait]
impl HostMetrics for Fake {
    async fn snapshot(&self) -> Result<HostSnapshot, MetricsError> {
        self.calls.snapshot.fetch_add(1, Ordering::SeqCst);
        if !self.scenario.metrics_available {
            return Err(MetricsError::new("/proc/meminfo", "permission denied"));
        }
        Ok(HostSnapshot {
            platform: "linux".into(),
            os_type: "Linux 6.1.0".into(),
            cpu_cores: 8,
            memory: "15.53 GB".into(),
            disk_space: "468.28 GB".into(),
        })
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

#[async_trait]
impl PublicIpClient for Fake {
    async fn public_ip(&self) -> Result<String, UpstreamError> {
        self.calls.public_ip.fetch_add(1, Ordering::SeqCst);
        match self.scenario.public_ip.fail(IP_SERVICE_URL) {
            Some(e) => Err(e),
            None => Ok("203.0.113.9".into()),
        }
    }

    async fn geolocate(&self, _ip: &str) -> Result<GeoInfo, UpstreamError> {
        self.calls.geolocate.fetch_add(1, Ordering::SeqCst);
        match self.scenario.geo.fail(GEO_SERVICE_URL) {
            Some(e) => Err(e),
            None => Ok(GeoInfo {
                isp: "Example Transit".into(),
                location: "Amsterdam, Netherlands".into(),
            }),
        }
    }

    fn name(&self) -> &'static str {
        "fake"
    }
}

/// In-process server bound to an ephemeral port.
pub struct TestServer {
    pub base_url: String,
    pub client: Client,
    pub calls: Arc<CallCounts>,
    server: Arc<Server>,
}

#[allow(dead_code)]
impl TestServer {
    /// Start with the default scenario and the repository's `public/` pages.
    pub async fn start() -> Self {
        Self::start_with(Scenario::default()).await
    }

    pub async fn start_with(scenario: Scenario) -> Self {
        let static_dir = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("public");
        Self::start_in(scenario, static_dir).await
    }

    pub async fn start_in(scenario: Scenario, static_dir: PathBuf) -> Self {
        let calls = Arc::new(CallCounts::default());
        let fake = Arc::new(Fake {
            scenario: Arc::new(scenario),
            calls: Arc::clone(&calls),
        });

        let adapters = Adapters {
            resolver: fake.clone(),
            probe: fake.clone(),
            host: fake.clone(),
            public_ip: fake,
        };
        let settings = Settings {
            dns_query_timeout: Duration::from_millis(200),
            latency_target: "192.0.2.1".into(),
            static_dir,
            service_name: "netdiag".into(),
        };

        let server = Server::bind(
            "127.0.0.1:0".parse().unwrap(),
            Diagnostics::new(adapters, settings),
            middleware::default_chain(&MiddlewareConfig::default()),
        )
        .await
        .expect("Failed to bind test server");

        let base_url = format!("http://{}", server.local_addr().unwrap());
        let server = Arc::new(server);
        let runner = Arc::clone(&server);
        tokio::spawn(async move { runner.run().await });

        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url,
            client,
            calls,
            server,
        }
    }

    /// Make a GET request to the server
    pub async fn get(&self, path: &str) -> Response {
        self.request(Method::GET, path).await
    }

    /// Make a request with an arbitrary method
    pub async fn request(&self, method: Method, path: &str) -> Response {
        self.client
            .request(method, format!("{}{}", self.base_url, path))
            .send()
            .await
            .expect("request failed")
    }

    /// Make a request with custom headers
    pub async fn request_with_headers(
        &self,
        method: Method,
        path: &str,
        headers: &[(&str, &str)],
    ) -> Response {
        let mut req = self
            .client
            .request(method, format!("{}{}", self.base_url, path));
        for (name, value) in headers {
            req = req.header(*name, *value);
        }
        req.send().await.expect("request failed")
    }

    /// GET and decode a JSON body, returning the status alongside it
    pub async fn get_json(&self, path: &str) -> (StatusCode, serde_json::Value) {
        let resp = self.get(path).await;
        let status = resp.status();
        let body = resp.json().await.expect("Failed to decode JSON body");
        (status, body)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.server.trigger_shutdown();
    }
}

/// Assert that response has expected status
pub fn assert_status(response: &Response, expected: StatusCode) {
    assert_eq!(
        response.status(),
        expected,
        "Expected status {}, got {}",
        expected,
        response.status()
    );
}

/// Assert that response contains header
pub fn assert_header(response: &Response, name: &str, expected: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert_eq!(value, expected, "Header '{}' mismatch", name);
}

/// Assert that response contains header with prefix
#[allow(dead_code)]
pub fn assert_header_starts_with(response: &Response, name: &str, prefix: &str) {
    let value = response
        .headers()
        .get(name)
        .unwrap_or_else(|| panic!("Header '{}' not found", name))
        .to_str()
        .unwrap();
    assert!(
        value.starts_with(prefix),
        "Header '{}' expected to start with '{}', got '{}'",
        name,
        prefix,
        value
    );
}

/// Assert the JSON failure envelope shape
#[allow(dead_code)]
pub fn assert_failure(body: &serde_json::Value, code: &str) {
    assert_eq!(body["success"], false, "body: {}", body);
    assert_eq!(body["code"], code, "body: {}", body);
    assert!(
        body["error"].as_str().is_some_and(|e| !e.is_empty()),
        "missing error message: {}",
        body
    );
}

/// Top-level keys of a JSON object, sorted
#[allow(dead_code)]
pub fn keys(value: &serde_json::Value) -> Vec<String> {
    let mut keys: Vec<String> = value
        .as_object()
        .expect("expected a JSON object")
        .keys()
        .cloned()
        .collect();
    keys.sort();
    keys
}
