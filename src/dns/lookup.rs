//! Best-effort aggregation of record-type queries.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::panic::AssertUnwindSafe;
use std::time::Duration;

use futures_util::FutureExt;
use serde::Serialize;
use tracing::{debug, warn};

use super::{DnsResolver, LookupError, RecordError, RecordType};

/// Longest domain name accepted for a lookup.
pub const MAX_DOMAIN_LEN: usize = 255;

/// Record values keyed by type; absent types have no entry at all.
pub type DnsRecordSet = BTreeMap<RecordType, Vec<String>>;

/// Successful lookup payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DnsLookup {
    pub ip: IpAddr,
    pub records: DnsRecordSet,
}

/// Check a raw `domain` parameter and return the name to resolve.
pub fn validate_domain(raw: Option<&str>) -> Result<&str, LookupError> {
    let domain = raw.map(str::trim).unwrap_or_default();

    if domain.is_empty() {
        return Err(LookupError::InvalidInput(
            "Domain parameter is required".into(),
        ));
    }
    if domain.chars().count() > MAX_DOMAIN_LEN {
        return Err(LookupError::InvalidInput(format!(
            "Domain must be at most {} characters",
            MAX_DOMAIN_LEN
        )));
    }

    Ok(domain)
}

/// Resolve `domain` and collect every record type that answers.
///
/// Only a failed primary resolution (or a fault inside the resolver) fails
/// the lookup. Each record query is bounded by `query_timeout`; any query
/// error just leaves its type out of the result.
pub async fn lookup_domain(
    resolver: &dyn DnsResolver,
    domain: &str,
    query_timeout: Duration,
) -> Result<DnsLookup, LookupError> {
    let outcome = AssertUnwindSafe(resolve_all(resolver, domain, query_timeout))
        .catch_unwind()
        .await;

    match outcome {
        Ok(result) => result,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            warn!(
                operation = "dns_lookup",
                domain = domain,
                resolver = resolver.name(),
                error = %message,
                "resolver fault"
            );
            Err(LookupError::LookupFailed(message))
        }
    }
}

async fn resolve_all(
    resolver: &dyn DnsResolver,
    domain: &str,
    query_timeout: Duration,
) -> Result<DnsLookup, LookupError> {
    let ip = resolver.resolve_primary(domain).await?;

    let mut records = DnsRecordSet::new();
    for record_type in RecordType::ALL {
        let outcome = match tokio::time::timeout(query_timeout, resolver.query(domain, record_type))
            .await
        {
            Ok(outcome) => outcome,
            Err(_) => Err(RecordError::Timeout),
        };

        match outcome {
            Ok(values) if !values.is_empty() => {
                records.insert(record_type, values);
            }
            Ok(_) => {
                debug!(domain = domain, record_type = %record_type, "empty answer");
            }
            Err(e) if e.is_absence() => {
                debug!(domain = domain, record_type = %record_type, reason = %e, "record type absent");
            }
            Err(e) => {
                warn!(
                    operation = "dns_query",
                    domain = domain,
                    record_type = %record_type,
                    error = %e,
                    "record query failed"
                );
            }
        }
    }

    Ok(DnsLookup { ip, records })
}

/// Extract a readable message from a panic payload.
fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected resolver fault".to_string()
    }
}
