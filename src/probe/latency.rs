//! Round-trip latency sampling.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use super::PingProbe;

static LATENCY_REGEX: OnceLock<Regex> = OnceLock::new();

fn latency_regex() -> &'static Regex {
    LATENCY_REGEX.get_or_init(|| Regex::new(r"time[=<]\s*(\d+(?:\.\d+)?)").expect("Invalid regex"))
}

/// Parse the first reply time from ping output, in milliseconds.
///
/// Matches `time=12.3` and the `time<1` form Windows prints for
/// sub-millisecond replies.
pub fn parse_latency(output: &str) -> Option<f64> {
    latency_regex()
        .captures(output)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Ping `target` once and return the reply time, or `0.0` if anything fails.
pub async fn measure_latency(probe: &dyn PingProbe, target: &str) -> f64 {
    match probe.ping(target).await {
        Ok(output) => parse_latency(&output).unwrap_or_else(|| {
            debug!(target_host = target, "no reply time in ping output");
            0.0
        }),
        Err(e) => {
            debug!(target_host = target, error = %e, "latency probe failed");
            0.0
        }
    }
}
