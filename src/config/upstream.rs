//! Outbound service configuration (IP echo, geolocation, DNS).

use std::time::Duration;

use super::parse::{env_or, env_timeout};
use super::ConfigError;

/// Placeholder replaced with the public address in the geolocation URL.
pub const GEO_IP_PLACEHOLDER: &str = "{ip}";

/// Endpoints and timeouts for outbound calls.
#[derive(Clone, Debug)]
pub struct UpstreamConfig {
    /// IP-echo service returning `{"ip": "..."}`.
    pub ip_service_url: String,
    /// Geolocation service URL template containing `{ip}`.
    pub geo_service_url: String,
    /// Timeout applied to every outbound HTTP call.
    pub network_timeout: Duration,
    /// Timeout applied to each DNS record-type query.
    pub dns_query_timeout: Duration,
}

impl UpstreamConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let geo_service_url = env_or("GEO_SERVICE_URL", "http://ip-api.com/json/{ip}");
        if !geo_service_url.contains(GEO_IP_PLACEHOLDER) {
            return Err(ConfigError::Invalid {
                key: "GEO_SERVICE_URL".into(),
                message: format!("URL must contain the {} placeholder", GEO_IP_PLACEHOLDER),
            });
        }

        Ok(Self {
            ip_service_url: env_or("IP_SERVICE_URL", "https://api.ipify.org?format=json"),
            geo_service_url,
            network_timeout: env_timeout("NETWORK_TIMEOUT", "5s")?,
            dns_query_timeout: env_timeout("DNS_QUERY_TIMEOUT", "2s")?,
        })
    }

    /// Build the geolocation URL for an address.
    pub fn geo_url_for(&self, ip: &str) -> String {
        self.geo_service_url.replace(GEO_IP_PLACEHOLDER, ip)
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            ip_service_url: "https://api.ipify.org?format=json".to_string(),
            geo_service_url: "http://ip-api.com/json/{ip}".to_string(),
            network_timeout: Duration::from_secs(5),
            dns_query_timeout: Duration::from_secs(2),
        }
    }
}
