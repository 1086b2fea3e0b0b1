//! Runtime choice of geolocation platform.

use super::ip::IpGeolocation;
use super::platform::{FixedPosition, GeolocationPlatform, NoGeolocation};
use super::types::{LocationOptions, PlatformError};
use crate::geo::GeoPoint;

/// Where the user's position comes from, picked at startup.
#[derive(Debug, Clone)]
pub enum LocationSource {
    /// Coarse position from an IP geolocation service
    Ip(IpGeolocation),
    /// A position given on the command line
    Fixed(FixedPosition),
    /// Detection disabled; sessions start at the fallback view
    Disabled(NoGeolocation),
}

impl LocationSource {
    pub fn fixed(position: GeoPoint) -> Self {
        LocationSource::Fixed(FixedPosition::new(position))
    }

    pub fn disabled() -> Self {
        LocationSource::Disabled(NoGeolocation)
    }

    /// Short label for logs and status lines.
    pub fn describe(&self) -> String {
        match self {
            LocationSource::Ip(ip) => format!("ip ({})", ip.endpoint()),
            LocationSource::Fixed(_) => "fixed".to_string(),
            LocationSource::Disabled(_) => "disabled".to_string(),
        }
    }
}

impl GeolocationPlatform for LocationSource {
    fn is_available(&self) -> bool {
        match self {
            LocationSource::Ip(p) => p.is_available(),
            LocationSource::Fixed(p) => p.is_available(),
            LocationSource::Disabled(p) => p.is_available(),
        }
    }

    fn is_secure_context(&self) -> bool {
        match self {
            LocationSource::Ip(p) => p.is_secure_context(),
            LocationSource::Fixed(p) => p.is_secure_context(),
            LocationSource::Disabled(p) => p.is_secure_context(),
        }
    }

    async fn current_position(&self, options: &LocationOptions) -> Result<GeoPoint, PlatformError> {
        match self {
            LocationSource::Ip(p) => p.current_position(options).await,
            LocationSource::Fixed(p) => p.current_position(options).await,
            LocationSource::Disabled(p) => p.current_position(options).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::location::{LocationDetector, LocationError};

    #[tokio::test]
    async fn test_fixed_source_grants() {
        let point = GeoPoint::new(56.9496, 24.1052).unwrap();
        let mut detector = LocationDetector::with_defaults(LocationSource::fixed(point));

        assert_eq!(detector.detect_location().await, Ok(point));
    }

    #[tokio::test]
    async fn test_disabled_source_is_not_supported() {
        let mut detector = LocationDetector::with_defaults(LocationSource::disabled());

        assert!(matches!(
            detector.detect_location().await,
            Err(LocationError::NotSupported(_))
        ));
    }

    #[tokio::test]
    async fn test_plain_http_ip_source_is_insecure() {
        let ip = IpGeolocation::new("http://geo.example/json").unwrap();
        let source = LocationSource::Ip(ip);

        assert!(!source.is_secure_context());
        assert_eq!(source.describe(), "ip (http://geo.example/json)");
    }
}
