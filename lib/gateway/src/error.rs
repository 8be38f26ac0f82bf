//! Error types for the gateway pipeline.
//!
//! Every failure the pipeline can produce is a [`GatewayError`] variant, so
//! the HTTP adapter only ever has to map one taxonomy onto a status code and
//! a user-safe body. Details carried here are already bounded excerpts —
//! never a raw credential, never an unbounded upstream payload.

use std::fmt;

/// Failures produced by the invocation pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayError {
    /// The caller's input is malformed (missing prompt, wrong shape).
    /// Never retried.
    InvalidRequest { reason: String },
    /// No upstream credential is configured. Operator fault, never retried.
    MissingCredential,
    /// Upstream rejected the request with a non-retryable status
    /// (4xx other than 429). The caller's input or credential is at fault.
    UpstreamRejected { status: u16, detail: String },
    /// Upstream failed with a retryable status (429 or 5xx) or a connection
    /// error, and retries were exhausted.
    UpstreamUnavailable { status: Option<u16>, detail: String },
    /// The bounded time budget elapsed before upstream answered.
    Timeout,
    /// Upstream returned a 2xx response whose body could not be interpreted.
    MalformedUpstreamResponse { detail: String },
    /// Upstream suppressed the content (safety filter). Distinct from both
    /// empty success and technical failure.
    Blocked { reason: Option<String> },
}

impl fmt::Display for GatewayError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest { reason } => {
                write!(f, "invalid request: {reason}")
            }
            Self::MissingCredential => write!(f, "upstream credential is not configured"),
            Self::UpstreamRejected { status, detail } => {
                write!(f, "upstream rejected request (status {status}): {detail}")
            }
            Self::UpstreamUnavailable { status, detail } => match status {
                Some(status) => {
                    write!(f, "upstream unavailable (status {status}): {detail}")
                }
                None => write!(f, "upstream unavailable: {detail}"),
            },
            Self::Timeout => write!(f, "upstream request timed out"),
            Self::MalformedUpstreamResponse { detail } => {
                write!(f, "malformed upstream response: {detail}")
            }
            Self::Blocked { reason } => match reason {
                Some(reason) => write!(f, "content blocked by upstream: {reason}"),
                None => write!(f, "content blocked by upstream"),
            },
        }
    }
}

impl std::error::Error for GatewayError {}

impl GatewayError {
    /// Whether another attempt against upstream could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. } | Self::Timeout)
    }

    /// HTTP status the adapter should answer with.
    ///
    /// Permanent upstream rejections pass the upstream status through;
    /// everything else maps onto gateway semantics (400 caller fault,
    /// 500 operator fault, 502/504 upstream fault).
    #[must_use]
    pub fn http_status(&self) -> u16 {
        match self {
            Self::InvalidRequest { .. } => 400,
            Self::MissingCredential => 500,
            Self::UpstreamRejected { status, .. } => {
                if (400..600).contains(status) {
                    *status
                } else {
                    502
                }
            }
            Self::UpstreamUnavailable { .. }
            | Self::MalformedUpstreamResponse { .. }
            | Self::Blocked { .. } => 502,
            Self::Timeout => 504,
        }
    }

    /// Stable, user-safe error message.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest { .. } => "invalid request",
            Self::MissingCredential => "service is not configured",
            Self::UpstreamRejected { .. } => "upstream rejected the request",
            Self::UpstreamUnavailable { .. } => "upstream unavailable",
            Self::Timeout => "upstream timed out",
            Self::MalformedUpstreamResponse { .. } => "unexpected upstream response",
            Self::Blocked { .. } => "content blocked by upstream safety policy",
        }
    }

    /// Bounded detail excerpt safe to echo back to the caller, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::InvalidRequest { reason } => Some(reason),
            Self::UpstreamRejected { detail, .. }
            | Self::UpstreamUnavailable { detail, .. }
            | Self::MalformedUpstreamResponse { detail } => Some(detail),
            Self::Blocked { reason } => reason.as_deref(),
            Self::MissingCredential | Self::Timeout => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn permanent_status_passes_through() {
        let err = GatewayError::UpstreamRejected {
            status: 404,
            detail: "model not found".to_string(),
        };
        assert_eq!(err.http_status(), 404);
        assert!(!err.is_transient());
    }

    #[test]
    fn bogus_permanent_status_maps_to_bad_gateway() {
        let err = GatewayError::UpstreamRejected {
            status: 302,
            detail: "redirect".to_string(),
        };
        assert_eq!(err.http_status(), 502);
    }

    #[test]
    fn transient_classes_map_to_gateway_statuses() {
        let unavailable = GatewayError::UpstreamUnavailable {
            status: Some(503),
            detail: "overloaded".to_string(),
        };
        assert_eq!(unavailable.http_status(), 502);
        assert!(unavailable.is_transient());

        assert_eq!(GatewayError::Timeout.http_status(), 504);
        assert!(GatewayError::Timeout.is_transient());
    }

    #[test]
    fn display_includes_detail() {
        let err = GatewayError::UpstreamRejected {
            status: 400,
            detail: "bad model name".to_string(),
        };
        assert!(err.to_string().contains("400"));
        assert!(err.to_string().contains("bad model name"));
    }

    #[test]
    fn credential_error_carries_no_detail() {
        assert_eq!(GatewayError::MissingCredential.detail(), None);
        assert_eq!(GatewayError::MissingCredential.http_status(), 500);
    }
}
