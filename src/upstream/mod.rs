//! Public-IP and geolocation lookups against remote HTTP services.

mod client;

use std::fmt;

use async_trait::async_trait;

pub use client::HttpPublicIpClient;

/// Geolocation of a public address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoInfo {
    pub isp: String,
    /// `"<city>, <country>"`.
    pub location: String,
}

/// Error type for outbound service calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    /// No complete response within the network timeout.
    Timeout { url: String },
    /// The service answered with a non-2xx status.
    Status { url: String, status: u16 },
    /// Connection-level failure.
    Transport { url: String, message: String },
    /// The body was not the expected JSON.
    Decode { url: String, message: String },
    /// The service reported a failure in its payload.
    Service { url: String, message: String },
}

impl UpstreamError {
    #[inline]
    pub fn is_timeout(&self) -> bool {
        matches!(self, UpstreamError::Timeout { .. })
    }

    /// URL of the call that failed.
    pub fn url(&self) -> &str {
        match self {
            UpstreamError::Timeout { url }
            | UpstreamError::Status { url, .. }
            | UpstreamError::Transport { url, .. }
            | UpstreamError::Decode { url, .. }
            | UpstreamError::Service { url, .. } => url,
        }
    }
}

impl fmt::Display for UpstreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UpstreamError::Timeout { url } => write!(f, "request to {} timed out", url),
            UpstreamError::Status { url, status } => {
                write!(f, "{} responded with status {}", url, status)
            }
            UpstreamError::Transport { url, message } => {
                write!(f, "request to {} failed: {}", url, message)
            }
            UpstreamError::Decode { url, message } => {
                write!(f, "invalid response from {}: {}", url, message)
            }
            UpstreamError::Service { url, message } => write!(f, "{} reported: {}", url, message),
        }
    }
}

impl std::error::Error for UpstreamError {}

/// Client for the services that report this host's public identity.
#[async_trait]
pub trait PublicIpClient: Send + Sync {
    /// The address remote peers see for this host.
    async fn public_ip(&self) -> Result<String, UpstreamError>;

    /// ISP and location for `ip`.
    async fn geolocate(&self, ip: &str) -> Result<GeoInfo, UpstreamError>;

    fn name(&self) -> &'static str;
}
