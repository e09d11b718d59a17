//! Reading typed values out of the process environment.

use std::str::FromStr;
use std::time::Duration;

use super::ConfigError;

/// Value of `key`, or `default` when unset.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Value of `key` unless unset or blank.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// `1`, `true`, `yes` and `on` (any case) are true; anything else set is false.
pub fn env_bool(key: &str, default: bool) -> bool {
    match std::env::var(key) {
        Ok(v) => matches!(
            v.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "yes" | "on"
        ),
        Err(_) => default,
    }
}

/// Parse `key` with [`FromStr`]; unset or empty yields `default`.
pub fn env_parse<T: FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    let raw = match std::env::var(key) {
        Ok(v) if !v.trim().is_empty() => v,
        _ => return Ok(default),
    };
    raw.trim().parse().map_err(|e: T::Err| ConfigError::Parse {
        key: key.into(),
        error: e.to_string(),
        value: raw,
    })
}

/// Parse a duration such as `750ms`, `5s`, `2m` or `1h`.
///
/// A bare number counts as seconds. Zero and `off` return `None`.
pub fn parse_duration(input: &str) -> Result<Option<Duration>, String> {
    let text = input.trim().to_ascii_lowercase();
    if text.is_empty() || text == "off" {
        return Ok(None);
    }

    let split = text
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len());
    let (digits, unit) = text.split_at(split);
    let amount: u64 = digits
        .parse()
        .map_err(|_| format!("invalid duration: {}", input.trim()))?;

    let duration = match unit {
        "ms" => Duration::from_millis(amount),
        "" | "s" => Duration::from_secs(amount),
        "m" => Duration::from_secs(amount.saturating_mul(60)),
        "h" => Duration::from_secs(amount.saturating_mul(3600)),
        other => return Err(format!("unknown duration unit '{}'", other)),
    };

    Ok((!duration.is_zero()).then_some(duration))
}

/// Timeout for an outbound call or shutdown wait. These cannot be disabled.
pub fn env_timeout(key: &str, default: &str) -> Result<Duration, ConfigError> {
    let value = env_or(key, default);
    match parse_duration(&value) {
        Ok(Some(duration)) => Ok(duration),
        Ok(None) => Err(ConfigError::Invalid {
            key: key.into(),
            message: "timeout cannot be disabled".into(),
        }),
        Err(error) => Err(ConfigError::Parse { key: key.into(), value, error }),
    }
}
