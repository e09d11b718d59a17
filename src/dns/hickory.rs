//! Resolver backed by the OS lookup path and hickory-resolver.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use hickory_resolver::config::{ResolverConfig, ResolverOpts};
use hickory_resolver::error::{ResolveError, ResolveErrorKind};
use hickory_resolver::proto::error::ProtoErrorKind;
use hickory_resolver::proto::op::ResponseCode;
use hickory_resolver::proto::rr::{RData, RecordType as WireType};
use hickory_resolver::TokioAsyncResolver;
use tracing::{debug, warn};

use super::{DnsResolver, RecordError, RecordType, ResolveFailure};

/// Production resolver.
///
/// The primary address goes through the operating system (`getaddrinfo`),
/// so `/etc/hosts` and the local resolver policy apply exactly as they
/// would for any client. Record-type queries go to the system nameservers
/// through hickory.
pub struct HickoryDnsResolver {
    resolver: TokioAsyncResolver,
}

impl HickoryDnsResolver {
    /// Build from `/etc/resolv.conf`, falling back to hickory's defaults.
    pub fn from_system_conf(query_timeout: Duration) -> Self {
        let (config, mut opts) = match hickory_resolver::system_conf::read_system_conf() {
            Ok(conf) => conf,
            Err(e) => {
                warn!(error = %e, "system resolver config unavailable, using defaults");
                (ResolverConfig::default(), ResolverOpts::default())
            }
        };

        // One try per query; retries would blow the per-type budget.
        opts.timeout = query_timeout;
        opts.attempts = 1;

        Self {
            resolver: TokioAsyncResolver::tokio(config, opts),
        }
    }
}

#[async_trait]
impl DnsResolver for HickoryDnsResolver {
    async fn resolve_primary(&self, domain: &str) -> Result<IpAddr, ResolveFailure> {
        let addrs: Vec<IpAddr> = tokio::net::lookup_host((domain, 0))
            .await
            .map_err(|e| ResolveFailure::new(domain, e.to_string()))?
            .map(|addr| addr.ip())
            .collect();

        addrs
            .iter()
            .find(|ip| ip.is_ipv4())
            .or_else(|| addrs.first())
            .copied()
            .ok_or_else(|| ResolveFailure::new(domain, "no addresses returned"))
    }

    async fn query(
        &self,
        domain: &str,
        record_type: RecordType,
    ) -> Result<Vec<String>, RecordError> {
        let lookup = self
            .resolver
            .lookup(domain, wire_type(record_type))
            .await
            .map_err(|e| classify(&e))?;

        let values: Vec<String> = lookup
            .iter()
            .filter_map(|rdata| render(rdata, record_type))
            .collect();

        debug!(domain, record_type = %record_type, count = values.len(), "record query answered");
        Ok(values)
    }

    fn name(&self) -> &'static str {
        "hickory"
    }
}

fn wire_type(record_type: RecordType) -> WireType {
    match record_type {
        RecordType::A => WireType::A,
        RecordType::Aaaa => WireType::AAAA,
        RecordType::Mx => WireType::MX,
        RecordType::Ns => WireType::NS,
        RecordType::Txt => WireType::TXT,
    }
}

fn classify(error: &ResolveError) -> RecordError {
    match error.kind() {
        ResolveErrorKind::NoRecordsFound { response_code, .. } => {
            if *response_code == ResponseCode::NXDomain {
                RecordError::NotFound
            } else {
                RecordError::NoAnswer
            }
        }
        ResolveErrorKind::Timeout => RecordError::Timeout,
        ResolveErrorKind::NoConnections => RecordError::NoNameservers,
        ResolveErrorKind::Proto(proto) if matches!(proto.kind(), ProtoErrorKind::Timeout) => {
            RecordError::Timeout
        }
        _ => RecordError::Other(error.to_string()),
    }
}

/// Render one answer as text; records of other types (CNAME chains) are skipped.
fn render(rdata: &RData, record_type: RecordType) -> Option<String> {
    match (record_type, rdata) {
        (RecordType::A, RData::A(a)) => Some(a.0.to_string()),
        (RecordType::Aaaa, RData::AAAA(aaaa)) => Some(aaaa.0.to_string()),
        (RecordType::Mx, RData::MX(mx)) => Some(format!(
            "{} {}",
            mx.preference(),
            strip_root(&mx.exchange().to_utf8())
        )),
        (RecordType::Ns, RData::NS(ns)) => Some(strip_root(&ns.0.to_utf8()).to_string()),
        (RecordType::Txt, RData::TXT(txt)) => Some(join_txt(txt.txt_data())),
        _ => None,
    }
}

fn strip_root(name: &str) -> &str {
    name.strip_suffix('.').unwrap_or(name)
}

/// TXT character-strings are concatenated, as resolvers present them.
fn join_txt(chunks: &[Box<[u8]>]) -> String {
    chunks
        .iter()
        .map(|chunk| String::from_utf8_lossy(chunk))
        .collect()
}
