//! JSON failure envelope shared by every endpoint.

use std::fmt;

use http::StatusCode;
use serde::Serialize;

use crate::core::Response;
use crate::dns::LookupError;
use crate::probe::{InvalidHost, ProbeError};
use crate::system::MetricsError;
use crate::upstream::UpstreamError;

/// Handler failure rendered as `{success:false, error, code, details?}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: &'static str,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Serialize)]
struct Envelope<'a> {
    success: bool,
    error: &'a str,
    code: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

impl ApiError {
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "invalid-input", message)
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NOT_FOUND, "not-found", "Not found")
    }

    pub fn method_not_allowed() -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "method-not-allowed",
            "Method not allowed",
        )
    }

    pub fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "Internal server error",
        )
    }

    /// Public IP fetch failure: a timeout is 504, anything else 500.
    pub fn public_ip(error: &UpstreamError) -> Self {
        if error.is_timeout() {
            Self::new(
                StatusCode::GATEWAY_TIMEOUT,
                "upstream-timeout",
                "Public IP service timed out",
            )
        } else {
            Self::new(
                StatusCode::INTERNAL_SERVER_ERROR,
                "upstream-failed",
                "Failed to get public IP",
            )
        }
        .with_details(error.to_string())
    }

    /// Network info is all-or-nothing; every upstream failure is a 500.
    pub fn network_info(error: &UpstreamError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "upstream-failed",
            "Failed to get network information",
        )
        .with_details(error.to_string())
    }

    pub fn into_response(self) -> Response {
        let envelope = Envelope {
            success: false,
            error: &self.message,
            code: self.code,
            details: self.details.as_deref(),
        };
        Response::json(self.status, &envelope)
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}): {}", self.status.as_u16(), self.code, self.message)?;
        if let Some(details) = &self.details {
            write!(f, ": {}", details)?;
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl From<LookupError> for ApiError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::InvalidInput(msg) => Self::invalid_input(msg),
            LookupError::ResolutionFailed(failure) => Self::new(
                StatusCode::BAD_REQUEST,
                "resolution-failed",
                "Failed to resolve domain",
            )
            .with_details(failure.message),
            LookupError::LookupFailed(msg) => {
                Self::new(StatusCode::BAD_REQUEST, "lookup-failed", "DNS lookup failed")
                    .with_details(msg)
            }
        }
    }
}

impl From<InvalidHost> for ApiError {
    fn from(e: InvalidHost) -> Self {
        Self::invalid_input(e.0)
    }
}

impl From<ProbeError> for ApiError {
    fn from(e: ProbeError) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "ping-failed", e.to_string())
    }
}

impl From<MetricsError> for ApiError {
    fn from(e: MetricsError) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "metrics-unavailable",
            "Failed to get system information",
        )
        .with_details(e.to_string())
    }
}
