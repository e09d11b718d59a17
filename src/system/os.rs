//! Host metrics read from the running operating system.

use std::path::PathBuf;

use async_trait::async_trait;

use super::{format_gb, HostMetrics, HostSnapshot, MetricsError};

/// Reads the kernel identity, memory and root filesystem of this host.
pub struct OsHostMetrics {
    disk_path: PathBuf,
}

impl OsHostMetrics {
    pub fn new() -> Self {
        Self::with_disk_path("/")
    }

    /// Report the size of the filesystem holding `path` instead of `/`.
    pub fn with_disk_path(path: impl Into<PathBuf>) -> Self {
        Self {
            disk_path: path.into(),
        }
    }
}

impl Default for OsHostMetrics {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl HostMetrics for OsHostMetrics {
    async fn snapshot(&self) -> Result<HostSnapshot, MetricsError> {
        let disk_path = self.disk_path.clone();
        tokio::task::spawn_blocking(move || collect(&disk_path))
            .await
            .map_err(|e| MetricsError::new("collector", e.to_string()))?
    }

    fn name(&self) -> &'static str {
        "os"
    }
}

#[cfg(unix)]
fn collect(disk_path: &std::path::Path) -> Result<HostSnapshot, MetricsError> {
    let (sysname, release) = unix::uname()?;

    Ok(HostSnapshot {
        platform: std::env::consts::OS.to_string(),
        os_type: format!("{} {}", sysname, release),
        cpu_cores: num_cpus::get(),
        memory: format_gb(unix::total_memory()?),
        disk_space: format_gb(unix::filesystem_size(disk_path)?),
    })
}

#[cfg(not(unix))]
fn collect(_disk_path: &std::path::Path) -> Result<HostSnapshot, MetricsError> {
    Err(MetricsError::new(
        "platform",
        format!("host metrics are not supported on {}", std::env::consts::OS),
    ))
}

#[cfg(unix)]
mod unix {
    use std::ffi::{CStr, CString};
    use std::io;
    use std::os::unix::ffi::OsStrExt;
    use std::path::Path;

    use super::MetricsError;

    /// Kernel name and release.
    pub(super) fn uname() -> Result<(String, String), MetricsError> {
        unsafe {
            let mut uts: libc::utsname = std::mem::zeroed();
            if libc::uname(&mut uts) != 0 {
                return Err(MetricsError::new(
                    "uname",
                    io::Error::last_os_error().to_string(),
                ));
            }

            let sysname = CStr::from_ptr(uts.sysname.as_ptr())
                .to_string_lossy()
                .into_owned();
            let release = CStr::from_ptr(uts.release.as_ptr())
                .to_string_lossy()
                .into_owned();
            Ok((sysname, release))
        }
    }

    /// Total physical memory in bytes.
    #[cfg(target_os = "linux")]
    pub(super) fn total_memory() -> Result<u64, MetricsError> {
        let content = std::fs::read_to_string("/proc/meminfo")
            .map_err(|e| MetricsError::new("/proc/meminfo", e.to_string()))?;

        content
            .lines()
            .find(|line| line.starts_with("MemTotal:"))
            .map(|line| parse_meminfo_kb(line) * 1024)
            .filter(|bytes| *bytes > 0)
            .ok_or_else(|| MetricsError::new("/proc/meminfo", "MemTotal not reported"))
    }

    #[cfg(not(target_os = "linux"))]
    pub(super) fn total_memory() -> Result<u64, MetricsError> {
        let (pages, page_size) =
            unsafe { (libc::sysconf(libc::_SC_PHYS_PAGES), libc::sysconf(libc::_SC_PAGESIZE)) };
        if pages <= 0 || page_size <= 0 {
            return Err(MetricsError::new(
                "sysconf",
                io::Error::last_os_error().to_string(),
            ));
        }
        Ok(pages as u64 * page_size as u64)
    }

    /// Parse a line like "MemTotal:       16384000 kB" and return the value in KB
    #[cfg(any(target_os = "linux", test))]
    pub(super) fn parse_meminfo_kb(line: &str) -> u64 {
        line.split_whitespace()
            .nth(1)
            .and_then(|s| s.parse().ok())
            .unwrap_or(0)
    }

    /// Size in bytes of the filesystem containing `path`.
    #[allow(clippy::unnecessary_cast)]
    pub(super) fn filesystem_size(path: &Path) -> Result<u64, MetricsError> {
        let c_path = CString::new(path.as_os_str().as_bytes())
            .map_err(|e| MetricsError::new("statvfs", e.to_string()))?;

        unsafe {
            let mut stat: libc::statvfs = std::mem::zeroed();
            if libc::statvfs(c_path.as_ptr(), &mut stat) != 0 {
                return Err(MetricsError::new(
                    "statvfs",
                    format!("{}: {}", path.display(), io::Error::last_os_error()),
                ));
            }
            Ok(stat.f_blocks as u64 * stat.f_frsize as u64)
        }
    }
}
