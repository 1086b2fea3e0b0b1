//! Fetch error taxonomy.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::facility::Facility;

/// Result of one fetch for a bounding box.
///
/// An empty vector is a valid, non-error outcome.
pub type FetchOutcome = Result<Vec<Facility>, FetchError>;

/// Classified fetch failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Connectivity problem or server-side failure
    #[error("network error: {0}")]
    Network(String),

    /// The request exceeded its deadline
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The response body was malformed or unexpected
    #[error("malformed response: {0}")]
    Parse(String),
}

/// Discriminant of [`FetchError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorKind {
    Network,
    Timeout,
    Parse,
}

impl FetchError {
    pub fn kind(&self) -> FetchErrorKind {
        match self {
            FetchError::Network(_) => FetchErrorKind::Network,
            FetchError::Timeout(_) => FetchErrorKind::Timeout,
            FetchError::Parse(_) => FetchErrorKind::Parse,
        }
    }

    /// Short message suitable for a user-facing notice.
    pub fn user_message(&self) -> &'static str {
        match self.kind() {
            FetchErrorKind::Network => "Could not reach the map data server",
            FetchErrorKind::Timeout => "The map data server took too long to respond",
            FetchErrorKind::Parse => "The map data server sent an unexpected response",
        }
    }
}

impl fmt::Display for FetchErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FetchErrorKind::Network => "network",
            FetchErrorKind::Timeout => "timeout",
            FetchErrorKind::Parse => "parse",
        };
        f.write_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind() {
        assert_eq!(
            FetchError::Network("refused".into()).kind(),
            FetchErrorKind::Network
        );
        assert_eq!(
            FetchError::Timeout(Duration::from_secs(1)).kind(),
            FetchErrorKind::Timeout
        );
        assert_eq!(FetchError::Parse("eof".into()).kind(), FetchErrorKind::Parse);
    }

    #[test]
    fn test_display_includes_detail() {
        let err = FetchError::Parse("expected value at line 1".into());
        assert!(err.to_string().contains("malformed response"));
        assert!(err.to_string().contains("line 1"));
        assert_eq!(FetchErrorKind::Timeout.to_string(), "timeout");
    }
}
