//! ICMP reachability probes.
//!
//! The server uses the [`PingProbe`] trait to abstract over how a ping is
//! performed.
//!
//! | Probe | Description |
//! |-------|-------------|
//! | [`SystemPingProbe`] | Runs the platform `ping` executable |
//! | [`StubPingProbe`] | Canned replies, no process spawned (`USE_STUB_PROBE=1`) |

pub mod latency;
mod stub;
mod system;

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;

pub use stub::StubPingProbe;
pub use system::{PingPlatform, SystemPingProbe};

/// Longest host argument passed to a probe.
pub const MAX_HOST_LEN: usize = 255;

/// Error type for probe execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProbeError {
    /// The ping executable could not be started.
    Spawn(String),
    /// The probe did not finish in time and was killed.
    Timeout(Duration),
    /// The probe ran and reported failure.
    Failed { code: Option<i32>, output: String },
}

impl fmt::Display for ProbeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProbeError::Spawn(msg) => write!(f, "failed to start ping: {}", msg),
            ProbeError::Timeout(d) => write!(f, "ping timed out after {}s", d.as_secs_f64()),
            ProbeError::Failed { code, output } => {
                match code {
                    Some(code) => write!(f, "ping exited with status {}", code)?,
                    None => write!(f, "ping terminated by signal")?,
                }
                let output = output.trim();
                if !output.is_empty() {
                    write!(f, ": {}", output)?;
                }
                Ok(())
            }
        }
    }
}

impl std::error::Error for ProbeError {}

/// A host argument that is missing or could be mistaken for an option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidHost(pub &'static str);

impl fmt::Display for InvalidHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

impl std::error::Error for InvalidHost {}

/// Check a raw `host` parameter before it reaches a process argument list.
pub fn validate_host(raw: Option<&str>) -> Result<&str, InvalidHost> {
    let host = raw.map(str::trim).unwrap_or_default();

    if host.is_empty() {
        return Err(InvalidHost("Host parameter is required"));
    }
    if host.chars().count() > MAX_HOST_LEN {
        return Err(InvalidHost("Host must be at most 255 characters"));
    }
    if host.starts_with('-') {
        return Err(InvalidHost("Host must not start with '-'"));
    }
    if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(InvalidHost("Host must not contain whitespace"));
    }

    Ok(host)
}

/// Trait for ping backends.
///
/// Implementations send a single echo request and return the captured
/// output (stdout followed by stderr) on success.
#[async_trait]
pub trait PingProbe: Send + Sync {
    /// Ping `host` once.
    async fn ping(&self, host: &str) -> Result<String, ProbeError>;

    /// Returns the name of this probe for logging purposes.
    fn name(&self) -> &'static str;
}
