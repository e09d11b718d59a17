//! Ping probe configuration.

use std::time::Duration;

use super::parse::{env_bool, env_or, env_timeout};
use super::ConfigError;

#[derive(Clone, Debug)]
pub struct ProbeConfig {
    /// Upper bound for one ping invocation.
    pub ping_timeout: Duration,
    /// Reference address used by the latency helper.
    pub latency_target: String,
    /// Replace the ping binary with canned output (USE_STUB_PROBE=1).
    pub use_stub: bool,
}

impl ProbeConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            ping_timeout: env_timeout("PING_TIMEOUT", "10s")?,
            latency_target: env_or("LATENCY_TARGET", "8.8.8.8"),
            use_stub: env_bool("USE_STUB_PROBE", false),
        })
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ping_timeout: Duration::from_secs(10),
            latency_target: "8.8.8.8".to_string(),
            use_stub: false,
        }
    }
}
