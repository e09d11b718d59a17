use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use super::{GeoInfo, PublicIpClient, UpstreamError};
use crate::config::UpstreamConfig;

const USER_AGENT: &str = concat!("netdiag/", env!("CARGO_PKG_VERSION"));

#[derive(Deserialize)]
struct IpResponse {
    ip: String,
}

#[derive(Deserialize)]
struct GeoResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    isp: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
}

impl GeoResponse {
    fn into_geo_info(self, url: &str) -> Result<GeoInfo, UpstreamError> {
        if self.status.as_deref() == Some("fail") {
            return Err(UpstreamError::Service {
                url: url.to_string(),
                message: self
                    .message
                    .unwrap_or_else(|| "geolocation lookup failed".to_string()),
            });
        }

        let unknown = || "Unknown".to_string();
        Ok(GeoInfo {
            isp: self.isp.unwrap_or_else(unknown),
            location: format!(
                "{}, {}",
                self.city.unwrap_or_else(unknown),
                self.country.unwrap_or_else(unknown)
            ),
        })
    }
}

/// reqwest-backed client; every call is bounded by the network timeout.
pub struct HttpPublicIpClient {
    client: Client,
    config: UpstreamConfig,
}

impl HttpPublicIpClient {
    pub fn new(config: UpstreamConfig) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .timeout(config.network_timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self { client, config })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, UpstreamError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let payload = response.json::<T>().await.map_err(|e| classify(url, e))?;
        debug!(url, status = status.as_u16(), "upstream call succeeded");
        Ok(payload)
    }
}

#[async_trait]
impl PublicIpClient for HttpPublicIpClient {
    async fn public_ip(&self) -> Result<String, UpstreamError> {
        let response: IpResponse = self.get_json(&self.config.ip_service_url).await?;
        Ok(response.ip)
    }

    async fn geolocate(&self, ip: &str) -> Result<GeoInfo, UpstreamError> {
        let url = self.config.geo_url_for(ip);
        let response: GeoResponse = self.get_json(&url).await?;
        response.into_geo_info(&url)
    }

    fn name(&self) -> &'static str {
        "http"
    }
}

fn classify(url: &str, error: reqwest::Error) -> UpstreamError {
    let url = url.to_string();
    if error.is_timeout() {
        UpstreamError::Timeout { url }
    } else if error.is_decode() {
        UpstreamError::Decode {
            url,
            message: error.to_string(),
        }
    } else {
        UpstreamError::Transport {
            url,
            message: error.to_string(),
        }
    }
}
