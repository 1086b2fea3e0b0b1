//! Location detection types.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

use crate::geo::GeoPoint;

/// Default upper bound on a single location request.
pub const DEFAULT_LOCATION_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Result of one location request.
pub type LocationOutcome = Result<GeoPoint, LocationError>;

/// Options passed to the platform for each request.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationOptions {
    /// Upper bound on the request; the detector resolves `Timeout` after this.
    pub timeout: Duration,
    /// Ask the platform for its most precise fix.
    pub high_accuracy: bool,
}

impl Default for LocationOptions {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_LOCATION_TIMEOUT,
            high_accuracy: true,
        }
    }
}

impl LocationOptions {
    pub fn new(timeout: Duration, high_accuracy: bool) -> Self {
        Self {
            timeout,
            high_accuracy,
        }
    }
}

/// Failure reported by a platform geolocation capability, before classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    /// The user or system refused access
    PermissionDenied,
    /// No position fix could be obtained
    PositionUnavailable(String),
    /// The platform's own deadline expired
    Timeout,
    /// Any other platform-specific failure
    Other(String),
}

/// Classified location failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("position unavailable: {0}")]
    PositionUnavailable(String),

    #[error("location request timed out after {0:?}")]
    Timeout(Duration),

    #[error("geolocation not supported: {0}")]
    NotSupported(String),
}

/// Discriminant of [`LocationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationErrorKind {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
    NotSupported,
}

impl LocationError {
    pub fn kind(&self) -> LocationErrorKind {
        match self {
            LocationError::PermissionDenied => LocationErrorKind::PermissionDenied,
            LocationError::PositionUnavailable(_) => LocationErrorKind::PositionUnavailable,
            LocationError::Timeout(_) => LocationErrorKind::Timeout,
            LocationError::NotSupported(_) => LocationErrorKind::NotSupported,
        }
    }

    /// Map a platform failure onto the taxonomy.
    ///
    /// Unrecognised failures become `PositionUnavailable` with the platform
    /// message preserved.
    pub fn from_platform(error: PlatformError, timeout: Duration) -> Self {
        match error {
            PlatformError::PermissionDenied => LocationError::PermissionDenied,
            PlatformError::PositionUnavailable(msg) => LocationError::PositionUnavailable(msg),
            PlatformError::Timeout => LocationError::Timeout(timeout),
            PlatformError::Other(msg) => LocationError::PositionUnavailable(msg),
        }
    }
}

impl fmt::Display for LocationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LocationErrorKind::PermissionDenied => "permission-denied",
            LocationErrorKind::PositionUnavailable => "position-unavailable",
            LocationErrorKind::Timeout => "timeout",
            LocationErrorKind::NotSupported => "not-supported",
        };
        f.write_str(s)
    }
}

/// Where a detection request ended up.
///
/// `Pending` while a request is outstanding; every other state is terminal for
/// that request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DetectionState {
    Idle,
    Pending,
    Granted(GeoPoint),
    Denied,
    Unavailable,
    TimedOut,
    Unsupported,
}

impl DetectionState {
    /// Terminal state for a finished request.
    pub fn from_outcome(outcome: &LocationOutcome) -> Self {
        match outcome {
            Ok(point) => DetectionState::Granted(*point),
            Err(e) => match e.kind() {
                LocationErrorKind::PermissionDenied => DetectionState::Denied,
                LocationErrorKind::PositionUnavailable => DetectionState::Unavailable,
                LocationErrorKind::Timeout => DetectionState::TimedOut,
                LocationErrorKind::NotSupported => DetectionState::Unsupported,
            },
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, DetectionState::Idle | DetectionState::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options() {
        let options = LocationOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(10));
        assert!(options.high_accuracy);
    }

    #[test]
    fn test_platform_error_mapping() {
        let timeout = Duration::from_secs(5);

        assert_eq!(
            LocationError::from_platform(PlatformError::PermissionDenied, timeout),
            LocationError::PermissionDenied
        );
        assert_eq!(
            LocationError::from_platform(PlatformError::Timeout, timeout),
            LocationError::Timeout(timeout)
        );
        assert_eq!(
            LocationError::from_platform(
                PlatformError::PositionUnavailable("no satellites".into()),
                timeout
            ),
            LocationError::PositionUnavailable("no satellites".into())
        );
    }

    #[test]
    fn test_unknown_platform_error_preserves_message() {
        let error = LocationError::from_platform(
            PlatformError::Other("driver crashed".into()),
            Duration::from_secs(1),
        );

        assert_eq!(error.kind(), LocationErrorKind::PositionUnavailable);
        assert!(error.to_string().contains("driver crashed"));
    }

    #[test]
    fn test_detection_state_from_outcome() {
        let point = GeoPoint::new(1.0, 2.0).unwrap();
        assert_eq!(
            DetectionState::from_outcome(&Ok(point)),
            DetectionState::Granted(point)
        );
        assert_eq!(
            DetectionState::from_outcome(&Err(LocationError::PermissionDenied)),
            DetectionState::Denied
        );
        assert_eq!(
            DetectionState::from_outcome(&Err(LocationError::NotSupported("http".into()))),
            DetectionState::Unsupported
        );
        assert!(DetectionState::TimedOut.is_terminal());
        assert!(!DetectionState::Pending.is_terminal());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(
            LocationErrorKind::PermissionDenied.to_string(),
            "permission-denied"
        );
        assert_eq!(LocationErrorKind::NotSupported.to_string(), "not-supported");
    }
}
