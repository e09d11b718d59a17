use std::fmt;

/// Why the environment could not be turned into a [`Config`](super::Config).
#[derive(Debug)]
pub enum ConfigError {
    /// The value is present but not of the expected type.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// The value parses but is not acceptable.
    Invalid { key: String, message: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "{}={:?} is not valid: {}", key, value, error)
            }
            ConfigError::Invalid { key, message } => write!(f, "{}: {}", key, message),
        }
    }
}

impl std::error::Error for ConfigError {}
