//! Diagnostics HTTP API.
//!
//! [`Diagnostics`] owns the adapters and routes each request to its handler:
//!
//! | Path | Handler |
//! |------|---------|
//! | `/health` | service liveness |
//! | `/get-ip` | public address via the IP-echo service |
//! | `/dns-lookup?domain=` | primary address plus A/AAAA/MX/NS/TXT records |
//! | `/ping?host=` | one ICMP echo |
//! | `/system-info` | host snapshot |
//! | `/network-info` | public address, ISP, location, latency |
//! | `/speed-test-file/{size}` | random attachment |
//! | anything else | static file, or JSON 404 |

mod error;
mod handlers;
pub mod static_files;

use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use http::Method;
use tracing::error;

pub use error::ApiError;

use crate::config::Config;
use crate::core::{Request, Response};
use crate::dns::{DnsResolver, HickoryDnsResolver};
use crate::probe::{PingProbe, StubPingProbe, SystemPingProbe};
use crate::system::{HostMetrics, OsHostMetrics};
use crate::upstream::{HttpPublicIpClient, PublicIpClient};

/// External facilities the handlers call into.
#[derive(Clone)]
pub struct Adapters {
    pub resolver: Arc<dyn DnsResolver>,
    pub probe: Arc<dyn PingProbe>,
    pub host: Arc<dyn HostMetrics>,
    pub public_ip: Arc<dyn PublicIpClient>,
}

impl Adapters {
    /// Production adapters; `USE_STUB_PROBE` swaps in the canned ping probe.
    pub fn from_config(config: &Config) -> Result<Self, reqwest::Error> {
        let probe: Arc<dyn PingProbe> = if config.probe.use_stub {
            Arc::new(StubPingProbe::new())
        } else {
            Arc::new(SystemPingProbe::new(config.probe.ping_timeout))
        };

        Ok(Self {
            resolver: Arc::new(HickoryDnsResolver::from_system_conf(
                config.upstream.dns_query_timeout,
            )),
            probe,
            host: Arc::new(OsHostMetrics::new()),
            public_ip: Arc::new(HttpPublicIpClient::new(config.upstream.clone())?),
        })
    }
}

/// Handler settings taken from configuration.
#[derive(Clone, Debug)]
pub struct Settings {
    pub dns_query_timeout: Duration,
    pub latency_target: String,
    pub static_dir: PathBuf,
    pub service_name: String,
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            dns_query_timeout: config.upstream.dns_query_timeout,
            latency_target: config.probe.latency_target.clone(),
            static_dir: config.server.static_dir.clone(),
            service_name: config.logging.service_name.clone(),
        }
    }
}

/// Request routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Route<'a> {
    Health,
    GetIp,
    DnsLookup,
    Ping,
    SystemInfo,
    NetworkInfo,
    SpeedTest(&'a str),
    Static,
}

fn route(path: &str) -> Route<'_> {
    match path {
        "/health" => Route::Health,
        "/get-ip" => Route::GetIp,
        "/dns-lookup" => Route::DnsLookup,
        "/ping" => Route::Ping,
        "/system-info" => Route::SystemInfo,
        "/network-info" => Route::NetworkInfo,
        _ => match path.strip_prefix("/speed-test-file/") {
            Some(tag) if !tag.is_empty() && !tag.contains('/') => Route::SpeedTest(tag),
            _ => Route::Static,
        },
    }
}

/// The diagnostics service: adapters, settings and routing.
pub struct Diagnostics {
    adapters: Adapters,
    settings: Settings,
}

impl Diagnostics {
    pub fn new(adapters: Adapters, settings: Settings) -> Self {
        Self { adapters, settings }
    }

    /// Handle one request. Never fails: handler panics become a 500 envelope.
    pub async fn handle(&self, req: Request) -> Response {
        let method = req.method().clone();
        let path = req.path().to_string();

        match AssertUnwindSafe(self.dispatch(req)).catch_unwind().await {
            Ok(res) => res,
            Err(panic) => {
                let message = panic
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| panic.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                error!(method = %method, path = %path, panic = %message, "handler panicked");
                ApiError::internal().into_response()
            }
        }
    }

    async fn dispatch(&self, req: Request) -> Response {
        let route = route(req.path());

        let readable = matches!(*req.method(), Method::GET | Method::HEAD);
        if !readable {
            return match route {
                Route::Static => ApiError::not_found().into_response(),
                _ => ApiError::method_not_allowed()
                    .into_response()
                    .with_header("allow", "GET, HEAD"),
            };
        }

        let result = match route {
            Route::Health => Ok(handlers::health(self)),
            Route::GetIp => handlers::get_ip(self).await,
            Route::DnsLookup => handlers::dns_lookup(self, &req).await,
            Route::Ping => handlers::ping(self, &req).await,
            Route::SystemInfo => handlers::system_info(self).await,
            Route::NetworkInfo => handlers::network_info(self).await,
            Route::SpeedTest(tag) => speed_test::speed_test_file(tag, req.method()).await,
            Route::Static => static_files::serve_static(&self.settings.static_dir, req.path())
                .await
                .ok_or_else(ApiError::not_found),
        };

        result.unwrap_or_else(ApiError::into_response)
    }
}
