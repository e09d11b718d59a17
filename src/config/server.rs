//! Listener, static pages and shutdown.

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use super::parse::{env_or, env_parse, env_timeout};
use super::ConfigError;

/// Where to listen and what to serve.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Listen address (LISTEN_HOST:PORT, default: 0.0.0.0:3001).
    pub listen_addr: SocketAddr,
    /// Directory holding the front-end pages (default: public).
    pub static_dir: PathBuf,
    /// How long shutdown waits for open connections (DRAIN_TIMEOUT, default: 10s).
    pub drain_timeout: Duration,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let host: IpAddr = env_parse("LISTEN_HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = env_parse("PORT", 3001)?;

        Ok(Self {
            listen_addr: SocketAddr::new(host, port),
            static_dir: PathBuf::from(env_or("STATIC_DIR", "public")),
            drain_timeout: env_timeout("DRAIN_TIMEOUT", "10s")?,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 3001)),
            static_dir: PathBuf::from("public"),
            drain_timeout: Duration::from_secs(10),
        }
    }
}
