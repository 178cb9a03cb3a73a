//! Failure classification and human-readable detail text
//!
//! The stored form of a failure is a short message ("HTTP 503",
//! "Connection Timeout"). [`FailureKind`] is the typed view of that message and
//! carries the detail text shown to users. Detail text is presentation only and
//! never feeds back into the up/down verdict.

use std::fmt;

/// Message recorded for a probe that hit its timeout
pub const TIMEOUT_MESSAGE: &str = "Connection Timeout";

/// Message recorded for a probe that could not connect
pub const CONNECTION_MESSAGE: &str = "Connection Error";

/// Why a check counted as down
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    /// No response within the probe timeout
    Timeout,

    /// Connection refused, DNS failure, TLS handshake failure
    Connection,

    /// Any other transport failure, with the client's own description
    Transport(String),

    /// A response arrived with a status outside [200, 400)
    Http(u16),
}

/// Returns true if the status code counts as "up"
pub fn is_up_status(status_code: u16) -> bool {
    (200..400).contains(&status_code)
}

/// Classifies a response status, returning the failure for non-up codes
pub fn classify_status(status_code: u16) -> Option<FailureKind> {
    if is_up_status(status_code) {
        None
    } else {
        Some(FailureKind::Http(status_code))
    }
}

impl FailureKind {
    /// The short message stored with the check record
    pub fn message(&self) -> String {
        match self {
            Self::Timeout => TIMEOUT_MESSAGE.to_string(),
            Self::Connection => CONNECTION_MESSAGE.to_string(),
            Self::Transport(message) => message.clone(),
            Self::Http(code) => format!("HTTP {}", code),
        }
    }

    /// Recovers the failure kind from a stored message
    ///
    /// Transport errors are matched by phrase, case-insensitively, since their
    /// wording depends on the HTTP client that produced them.
    pub fn from_message(message: &str) -> Self {
        if let Some(code) = message
            .strip_prefix("HTTP ")
            .and_then(|rest| rest.trim().parse::<u16>().ok())
        {
            return Self::Http(code);
        }

        let lowered = message.to_lowercase();
        if TIMEOUT_PHRASES.iter().any(|phrase| lowered.contains(phrase)) {
            Self::Timeout
        } else if CONNECTION_PHRASES
            .iter()
            .any(|phrase| lowered.contains(phrase))
        {
            Self::Connection
        } else {
            Self::Transport(message.to_string())
        }
    }

    /// Human-readable explanation for alerts and history views
    pub fn detail(&self) -> String {
        match self {
            Self::Timeout => "Server failed to respond before the request timed out".to_string(),
            Self::Connection => "Unable to establish a connection to the server".to_string(),
            Self::Transport(message) if message.trim().is_empty() => UNKNOWN_DETAIL.to_string(),
            Self::Transport(message) => message.clone(),
            Self::Http(code) => match http_detail(*code) {
                Some(detail) => detail.to_string(),
                None => format!("Server returned an error response (HTTP {})", code),
            },
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message())
    }
}

const TIMEOUT_PHRASES: &[&str] = &["connection timeout", "request timeout", "timed out"];

const CONNECTION_PHRASES: &[&str] = &["connection error", "connection refused"];

const UNKNOWN_DETAIL: &str = "An unknown error occurred";

fn http_detail(code: u16) -> Option<&'static str> {
    match code {
        403 => Some("Forbidden - access to this URL is not allowed"),
        404 => Some("Page not found - the URL may have changed or been deleted"),
        500 => Some("Server error - the server encountered an internal problem"),
        502 => Some("Bad gateway - the server received an invalid response"),
        503 => Some("Service unavailable - the server is temporarily down"),
        _ => None,
    }
}

/// Maps a stored error message to a human-readable detail line
///
/// A missing message yields the generic "unknown error" text.
pub fn error_detail(message: Option<&str>) -> String {
    match message {
        Some(message) => FailureKind::from_message(message).detail(),
        None => UNKNOWN_DETAIL.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_up_range_boundaries() {
        assert!(!is_up_status(199));
        assert!(is_up_status(200));
        assert!(is_up_status(301));
        assert!(is_up_status(399));
        assert!(!is_up_status(400));
        assert!(!is_up_status(503));
        assert!(!is_up_status(101));
    }

    #[test]
    fn test_classify_status_message() {
        assert_eq!(classify_status(204), None);

        let failure = classify_status(404).unwrap();
        assert_eq!(failure, FailureKind::Http(404));
        assert_eq!(failure.message(), "HTTP 404");

        assert_eq!(classify_status(100).unwrap().message(), "HTTP 100");
    }

    #[test]
    fn test_message_round_trips_through_from_message() {
        for kind in [
            FailureKind::Timeout,
            FailureKind::Connection,
            FailureKind::Http(502),
        ] {
            assert_eq!(FailureKind::from_message(&kind.message()), kind);
        }
    }

    #[test]
    fn test_from_message_matches_phrases_case_insensitively() {
        assert_eq!(
            FailureKind::from_message("Request TIMEOUT after 10s"),
            FailureKind::Timeout
        );
        assert_eq!(
            FailureKind::from_message("tcp connect error: Connection refused (os error 111)"),
            FailureKind::Connection
        );
        assert_eq!(
            FailureKind::from_message("too many redirects"),
            FailureKind::Transport("too many redirects".to_string())
        );
    }

    #[test]
    fn test_http_details() {
        assert_eq!(
            error_detail(Some("HTTP 503")),
            "Service unavailable - the server is temporarily down"
        );
        assert_eq!(
            error_detail(Some("HTTP 403")),
            "Forbidden - access to this URL is not allowed"
        );
        assert_eq!(
            error_detail(Some("HTTP 418")),
            "Server returned an error response (HTTP 418)"
        );
    }

    #[test]
    fn test_transport_details() {
        assert_eq!(
            error_detail(Some("Connection Timeout")),
            "Server failed to respond before the request timed out"
        );
        assert_eq!(
            error_detail(Some("connection error")),
            "Unable to establish a connection to the server"
        );
        assert_eq!(error_detail(Some("invalid certificate")), "invalid certificate");
    }

    #[test]
    fn test_unknown_detail() {
        assert_eq!(error_detail(None), "An unknown error occurred");
        assert_eq!(error_detail(Some("")), "An unknown error occurred");
    }
}
