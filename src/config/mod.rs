//! Configuration module for netdiag.
//!
//! All settings are read from environment variables once at startup and
//! handed to the server and adapters as plain structs.
//!
//! # Example
//!
//! ```rust,ignore
//! use netdiag::config::Config;
//!
//! let config = Config::from_env()?;
//! println!("Listen address: {}", config.server.listen_addr);
//! ```

mod error;
mod logging;
mod middleware;
mod parse;
mod probe;
mod server;
mod upstream;

pub use error::ConfigError;
pub use logging::{LogFormat, LoggingConfig};
pub use middleware::MiddlewareConfig;
pub use probe::ProbeConfig;
pub use server::ServerConfig;
pub use upstream::UpstreamConfig;

/// Serializes tests that touch process environment variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Complete application configuration.
#[derive(Clone, Debug, Default)]
pub struct Config {
    /// Server configuration.
    pub server: ServerConfig,
    /// Outbound service configuration.
    pub upstream: UpstreamConfig,
    /// Ping probe configuration.
    pub probe: ProbeConfig,
    /// Middleware configuration.
    pub middleware: MiddlewareConfig,
    /// Logging configuration.
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            server: ServerConfig::from_env()?,
            upstream: UpstreamConfig::from_env()?,
            probe: ProbeConfig::from_env()?,
            middleware: MiddlewareConfig::from_env()?,
            logging: LoggingConfig::from_env()?,
        })
    }

    /// Print configuration summary to log.
    pub fn log_summary(&self) {
        use tracing::info;

        info!("Configuration loaded:");
        info!("  Listen: {}", self.server.listen_addr);
        info!("  Static dir: {:?}", self.server.static_dir);
        info!("  IP service: {}", self.upstream.ip_service_url);
        info!("  Geo service: {}", self.upstream.geo_service_url);
        info!(
            "  Timeouts: network {}ms, dns query {}ms, ping {}ms",
            self.upstream.network_timeout.as_millis(),
            self.upstream.dns_query_timeout.as_millis(),
            self.probe.ping_timeout.as_millis()
        );
        info!("  Latency target: {}", self.probe.latency_target);

        if self.probe.use_stub {
            info!("  Ping probe: stub");
        }

        if self.middleware.access_log {
            info!("  Access log: enabled");
        }

        info!("  CORS origins: {}", self.middleware.cors_origins.join(", "));
    }
}
