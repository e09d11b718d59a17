//! Host information for the `/system-info` endpoint.
//!
//! Collection goes through the [`HostMetrics`] trait so the API can be
//! exercised without touching the real machine.
//!
//! # Example
//!
//! ```rust,ignore
//! use netdiag::system::{HostMetrics, OsHostMetrics};
//!
//! let snapshot = OsHostMetrics::new().snapshot().await?;
//! println!("{} cores, {} RAM", snapshot.cpu_cores, snapshot.memory);
//! ```

mod os;

use std::fmt;

use async_trait::async_trait;
use serde::Serialize;

pub use os::OsHostMetrics;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Point-in-time description of the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HostSnapshot {
    /// OS family, e.g. `linux`.
    pub platform: String,
    /// Kernel name and release, e.g. `Linux 6.1.0`.
    pub os_type: String,
    /// Logical CPUs.
    pub cpu_cores: usize,
    /// Total physical memory, e.g. `15.53 GB`.
    pub memory: String,
    /// Root filesystem size.
    pub disk_space: String,
}

/// Render a byte count in GiB with two decimals.
pub fn format_gb(bytes: u64) -> String {
    format!("{:.2} GB", bytes as f64 / BYTES_PER_GIB)
}

/// A metrics source could not be read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricsError {
    pub source: &'static str,
    pub message: String,
}

impl MetricsError {
    pub fn new(source: &'static str, message: impl Into<String>) -> Self {
        Self {
            source,
            message: message.into(),
        }
    }
}

impl fmt::Display for MetricsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.source, self.message)
    }
}

impl std::error::Error for MetricsError {}

/// Source of host information.
#[async_trait]
pub trait HostMetrics: Send + Sync {
    /// Collect every field; any unreadable source fails the whole snapshot.
    async fn snapshot(&self) -> Result<HostSnapshot, MetricsError>;

    fn name(&self) -> &'static str;
}
