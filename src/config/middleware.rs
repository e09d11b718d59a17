//! Access log and CORS settings.

use super::parse::{env_bool, env_or};
use super::ConfigError;

#[derive(Clone, Debug)]
pub struct MiddlewareConfig {
    /// `ACCESS_LOG`, on by default.
    pub access_log: bool,
    /// Allowed CORS origins. A single `*` allows any origin.
    pub cors_origins: Vec<String>,
}

impl MiddlewareConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            access_log: env_bool("ACCESS_LOG", true),
            cors_origins: parse_origins(&env_or("CORS_ALLOWED_ORIGINS", "*")),
        })
    }
}

impl Default for MiddlewareConfig {
    fn default() -> Self {
        Self {
            access_log: true,
            cors_origins: vec!["*".to_string()],
        }
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().trim_end_matches('/'))
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
