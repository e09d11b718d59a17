use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{PingProbe, ProbeError};

/// Platform family, which decides the echo-count flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PingPlatform {
    Windows,
    Unix,
}

impl PingPlatform {
    /// Family of the running host.
    pub const fn current() -> Self {
        if cfg!(windows) {
            PingPlatform::Windows
        } else {
            PingPlatform::Unix
        }
    }

    #[inline]
    pub const fn count_flag(&self) -> &'static str {
        match self {
            PingPlatform::Windows => "-n",
            PingPlatform::Unix => "-c",
        }
    }
}

/// Probe that runs the platform `ping` executable.
pub struct SystemPingProbe {
    program: String,
    platform: PingPlatform,
    timeout: Duration,
}

impl SystemPingProbe {
    pub fn new(timeout: Duration) -> Self {
        Self::with_program("ping", PingPlatform::current(), timeout)
    }

    /// Use a specific executable and flag family.
    pub fn with_program(program: impl Into<String>, platform: PingPlatform, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            platform,
            timeout,
        }
    }

    /// Arguments for a single echo request to `host`.
    pub fn command_args<'a>(&self, host: &'a str) -> [&'a str; 3] {
        [self.platform.count_flag(), "1", host]
    }
}

#[async_trait]
impl PingProbe for SystemPingProbe {
    async fn ping(&self, host: &str) -> Result<String, ProbeError> {
        let mut cmd = Command::new(&self.program);
        cmd.args(self.command_args(host))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        // Dropping the output future on timeout kills the child.
        let output = match tokio::time::timeout(self.timeout, cmd.output()).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => return Err(ProbeError::Spawn(e.to_string())),
            Err(_) => return Err(ProbeError::Timeout(self.timeout)),
        };

        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));

        debug!(
            host,
            program = %self.program,
            status = ?output.status.code(),
            "ping finished"
        );

        if output.status.success() {
            Ok(text)
        } else {
            Err(ProbeError::Failed {
                code: output.status.code(),
                output: text,
            })
        }
    }

    fn name(&self) -> &'static str {
        "system"
    }
}
