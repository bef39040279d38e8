//! Error classification for retry decisions.
//!
//! # Responsibilities
//! - Map a failure description to an `ErrorKind`
//! - Attach a retry decision and a suggested wait to each kind
//!
//! # Design Decisions
//! - Pure and deterministic: substring matching over the lowercased message
//! - Fixed priority: rate limit > timeout > network > credential > server > unknown
//! - Credential failures are the only kind never retried
//! - Retry here means "same provider again"; falling back to the next
//!   provider is always allowed

use std::fmt;
use std::time::Duration;

use serde::Serialize;

/// Failure taxonomy shared by the executor, pipeline and batch report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    RateLimit,
    Timeout,
    NetworkError,
    InvalidCredential,
    ProviderServerError,
    ValidationFailed,
    AllProvidersUnavailable,
    Cancelled,
    Internal,
    Unknown,
}

impl ErrorKind {
    /// Stable code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::Timeout => "TIMEOUT",
            ErrorKind::NetworkError => "NETWORK_ERROR",
            ErrorKind::InvalidCredential => "INVALID_API_KEY",
            ErrorKind::ProviderServerError => "PROVIDER_ERROR",
            ErrorKind::ValidationFailed => "VALIDATION_FAILED",
            ErrorKind::AllProvidersUnavailable => "ALL_PROVIDERS_UNAVAILABLE",
            ErrorKind::Cancelled => "CANCELLED",
            ErrorKind::Internal => "INTERNAL_ERROR",
            ErrorKind::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Outcome of classifying one failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub should_retry: bool,
    pub wait_hint: Duration,
    pub kind: ErrorKind,
}

impl Classification {
    const fn new(should_retry: bool, wait_secs: u64, kind: ErrorKind) -> Self {
        Self {
            should_retry,
            wait_hint: Duration::from_secs(wait_secs),
            kind,
        }
    }

    /// Fixed classification of a kind that is known without inspecting text.
    pub fn of(kind: ErrorKind) -> Self {
        match kind {
            ErrorKind::RateLimit => Self::new(true, 60, kind),
            ErrorKind::Timeout => Self::new(true, 5, kind),
            ErrorKind::NetworkError => Self::new(true, 3, kind),
            ErrorKind::InvalidCredential => Self::new(false, 0, kind),
            ErrorKind::ProviderServerError => Self::new(true, 10, kind),
            ErrorKind::ValidationFailed => Self::new(true, 0, kind),
            ErrorKind::AllProvidersUnavailable => Self::new(true, 60, kind),
            ErrorKind::Cancelled | ErrorKind::Internal => Self::new(false, 0, kind),
            ErrorKind::Unknown => Self::new(true, 2, kind),
        }
    }
}

const RULES: &[(&[&str], ErrorKind)] = &[
    (
        &["rate limit", "429", "quota", "too many requests"],
        ErrorKind::RateLimit,
    ),
    (&["timeout", "timed out", "deadline"], ErrorKind::Timeout),
    (
        &["network", "connection", "unreachable", "503", "502", "dns"],
        ErrorKind::NetworkError,
    ),
    (
        &[
            "api key",
            "api_key",
            "authentication",
            "unauthorized",
            "401",
            "403",
            "invalid key",
        ],
        ErrorKind::InvalidCredential,
    ),
    (&["500", "internal server error"], ErrorKind::ProviderServerError),
];

/// Classify a failure by its description.
pub fn classify(description: &str) -> Classification {
    let lowered = description.to_lowercase();
    let kind = RULES
        .iter()
        .find(|(markers, _)| markers.iter().any(|m| lowered.contains(m)))
        .map(|(_, kind)| *kind)
        .unwrap_or(ErrorKind::Unknown);
    Classification::of(kind)
}

/// Classify any displayable error.
pub fn classify_error(error: &dyn std::error::Error) -> Classification {
    classify(&error.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_table() {
        let cases = [
            ("openai returned HTTP 429: slow down", ErrorKind::RateLimit, true, 60),
            ("Quota exceeded for project", ErrorKind::RateLimit, true, 60),
            ("request timed out after 120s", ErrorKind::Timeout, true, 5),
            ("Connection refused", ErrorKind::NetworkError, true, 3),
            ("gemini returned HTTP 503: overloaded", ErrorKind::NetworkError, true, 3),
            ("xai: API key not configured", ErrorKind::InvalidCredential, false, 0),
            ("HTTP 401: Unauthorized", ErrorKind::InvalidCredential, false, 0),
            ("HTTP 500: Internal Server Error", ErrorKind::ProviderServerError, true, 10),
            ("something odd happened", ErrorKind::Unknown, true, 2),
        ];

        for (message, kind, retry, wait) in cases {
            let c = classify(message);
            assert_eq!(c.kind, kind, "{message}");
            assert_eq!(c.should_retry, retry, "{message}");
            assert_eq!(c.wait_hint, Duration::from_secs(wait), "{message}");
        }
    }

    #[test]
    fn test_priority_prefers_rate_limit() {
        // carries both a rate-limit and a credential marker
        let c = classify("401 unauthorized: too many requests");
        assert_eq!(c.kind, ErrorKind::RateLimit);
    }

    #[test]
    fn test_classify_is_deterministic() {
        let message = "upstream dns failure";
        assert_eq!(classify(message), classify(message));
    }

    #[test]
    fn test_codes() {
        assert_eq!(ErrorKind::InvalidCredential.code(), "INVALID_API_KEY");
        assert_eq!(ErrorKind::ProviderServerError.to_string(), "PROVIDER_ERROR");
        assert!(Classification::of(ErrorKind::ValidationFailed).should_retry);
    }
}
