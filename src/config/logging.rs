//! Log filter, output format and service name.

use super::parse::{env_opt, env_or};
use super::ConfigError;

const DEFAULT_FILTER: &str = "netdiag=info,access=info";
const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per line.
    Json,
    /// tracing-subscriber's human-readable output.
    Text,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    /// `EnvFilter` directive string.
    pub filter: String,
    /// Reported as `ctx.service` on every JSON line.
    pub service_name: String,
    pub format: LogFormat,
}

impl LoggingConfig {
    /// `LOG_LEVEL` (a bare level) wins over `RUST_LOG` (full filter syntax).
    pub fn from_env() -> Result<Self, ConfigError> {
        let format = match env_or("LOG_FORMAT", "json").trim().to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            "text" | "pretty" => LogFormat::Text,
            other => {
                return Err(ConfigError::Invalid {
                    key: "LOG_FORMAT".into(),
                    message: format!("expected json or text, got '{}'", other),
                })
            }
        };

        Ok(Self {
            filter: filter_from(
                std::env::var("LOG_LEVEL").ok().as_deref(),
                std::env::var("RUST_LOG").ok().as_deref(),
            ),
            service_name: env_opt("SERVICE_NAME").unwrap_or_else(|| "netdiag".to_string()),
            format,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_FILTER.to_string(),
            service_name: "netdiag".to_string(),
            format: LogFormat::Json,
        }
    }
}

/// Access entries log under their own `access` target, so a bare level
/// applies to both targets.
fn filter_from(log_level: Option<&str>, rust_log: Option<&str>) -> String {
    if let Some(level) = log_level.map(|l| l.trim().to_ascii_lowercase()) {
        if LEVELS.contains(&level.as_str()) {
            return format!("netdiag={level},access={level}");
        }
        eprintln!(
            "Ignoring LOG_LEVEL '{}' (expected one of {})",
            level,
            LEVELS.join(", ")
        );
    }

    match rust_log {
        Some(filter) if !filter.trim().is_empty() => filter.to_string(),
        _ => DEFAULT_FILTER.to_string(),
    }
}
