//! One-shot user location detection.
//!
//! The detector wraps a platform geolocation capability behind the
//! [`GeolocationPlatform`] trait and turns each request into exactly one
//! [`LocationOutcome`]. Platform failure codes are mapped onto a small
//! taxonomy ([`LocationErrorKind`]) so the sync engine can fall back
//! gracefully instead of blocking on a missing fix.
//!
//! # Example
//!
//! ```ignore
//! use facilitymap::location::{FixedPosition, LocationDetector, LocationOptions};
//!
//! let platform = FixedPosition::new("56.9496,24.1052".parse()?);
//! let mut detector = LocationDetector::new(platform, LocationOptions::default());
//! let outcome = detector.detect_location().await;
//! ```

mod detector;
mod ip;
mod platform;
mod source;
mod types;

pub use detector::LocationDetector;
pub use ip::{IpGeolocation, DEFAULT_IP_GEOLOCATION_ENDPOINT};
pub use platform::{FixedPosition, GeolocationPlatform, NoGeolocation};
pub use source::LocationSource;
pub use types::{
    DetectionState, LocationError, LocationErrorKind, LocationOptions, LocationOutcome,
    PlatformError, DEFAULT_LOCATION_TIMEOUT,
};

#[cfg(test)]
pub use platform::tests::MockPlatform;
