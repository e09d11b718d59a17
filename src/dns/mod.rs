//! DNS resolution adapter and best-effort record aggregation.
//!
//! The [`DnsResolver`] trait splits resolution into two calls with different
//! failure semantics:
//!
//! | Call | Error type | Effect on a lookup |
//! |------|------------|--------------------|
//! | [`DnsResolver::resolve_primary`] | [`ResolveFailure`] | aborts the lookup |
//! | [`DnsResolver::query`] | [`RecordError`] | omits one record type |
//!
//! There is no conversion from [`RecordError`] into [`LookupError`], so a
//! per-type failure cannot abort an aggregation by accident.
//!
//! # Example
//!
//! ```rust,ignore
//! use netdiag::dns::{lookup_domain, HickoryDnsResolver};
//!
//! let resolver = HickoryDnsResolver::from_system_conf(Duration::from_secs(2));
//! let result = lookup_domain(&resolver, "example.com", Duration::from_secs(2)).await?;
//! println!("{} -> {:?}", result.ip, result.records);
//! ```

mod hickory;
mod lookup;

use std::fmt;
use std::net::IpAddr;

use async_trait::async_trait;
use serde::{Serialize, Serializer};

pub use hickory::HickoryDnsResolver;
pub use lookup::{lookup_domain, validate_domain, DnsLookup, DnsRecordSet, MAX_DOMAIN_LEN};

/// Record types queried for every lookup, in query order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordType {
    A,
    Aaaa,
    Mx,
    Ns,
    Txt,
}

impl RecordType {
    /// All record types, in the order they are queried.
    pub const ALL: [RecordType; 5] = [
        RecordType::A,
        RecordType::Aaaa,
        RecordType::Mx,
        RecordType::Ns,
        RecordType::Txt,
    ];

    /// Wire tag used as the key in responses.
    pub const fn as_str(&self) -> &'static str {
        match self {
            RecordType::A => "A",
            RecordType::Aaaa => "AAAA",
            RecordType::Mx => "MX",
            RecordType::Ns => "NS",
            RecordType::Txt => "TXT",
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for RecordType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Primary forward resolution failed; the whole lookup is aborted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveFailure {
    pub domain: String,
    pub message: String,
}

impl ResolveFailure {
    pub fn new(domain: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ResolveFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "failed to resolve {}: {}", self.domain, self.message)
    }
}

impl std::error::Error for ResolveFailure {}

/// One record-type query failed; only that type is left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordError {
    /// The name exists but has no records of this type.
    NoAnswer,
    /// The name does not exist (NXDOMAIN).
    NotFound,
    /// No nameserver could be reached.
    NoNameservers,
    /// The query did not finish within its timeout.
    Timeout,
    /// Any other resolver failure.
    Other(String),
}

impl RecordError {
    /// True for outcomes that just mean "nothing published here".
    ///
    /// These are expected for most domains and logged at debug level;
    /// everything else is logged as a warning.
    pub fn is_absence(&self) -> bool {
        !matches!(self, RecordError::Other(_))
    }
}

impl fmt::Display for RecordError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordError::NoAnswer => write!(f, "no records of this type"),
            RecordError::NotFound => write!(f, "domain not found"),
            RecordError::NoNameservers => write!(f, "no nameservers available"),
            RecordError::Timeout => write!(f, "query timed out"),
            RecordError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for RecordError {}

/// A lookup that did not produce a result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// Domain missing, empty or too long; nothing was queried.
    InvalidInput(String),
    /// The primary address could not be resolved.
    ResolutionFailed(ResolveFailure),
    /// An unexpected fault while resolving.
    LookupFailed(String),
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LookupError::InvalidInput(msg) => write!(f, "invalid domain: {}", msg),
            LookupError::ResolutionFailed(e) => write!(f, "{}", e),
            LookupError::LookupFailed(msg) => write!(f, "lookup failed: {}", msg),
        }
    }
}

impl std::error::Error for LookupError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LookupError::ResolutionFailed(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ResolveFailure> for LookupError {
    fn from(e: ResolveFailure) -> Self {
        LookupError::ResolutionFailed(e)
    }
}

/// DNS resolution backend.
#[async_trait]
pub trait DnsResolver: Send + Sync {
    /// Resolve the address a client would connect to.
    async fn resolve_primary(&self, domain: &str) -> Result<IpAddr, ResolveFailure>;

    /// Query one record type; values are rendered as strings in answer order.
    async fn query(&self, domain: &str, record_type: RecordType)
        -> Result<Vec<String>, RecordError>;

    /// Backend name for logging.
    fn name(&self) -> &'static str;
}
