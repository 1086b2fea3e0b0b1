//! IP-based geolocation over HTTPS.
//!
//! Coarse positioning for environments without a device fix. The endpoint is
//! expected to answer a GET with a JSON object carrying `latitude`/`longitude`
//! (or `lat`/`lon`), as ipapi.co and compatible services do.

use std::time::Duration;

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use super::platform::GeolocationPlatform;
use super::types::{LocationOptions, PlatformError};
use crate::geo::GeoPoint;

/// Default IP geolocation endpoint.
pub const DEFAULT_IP_GEOLOCATION_ENDPOINT: &str = "https://ipapi.co/json/";

#[derive(Debug, Deserialize)]
struct IpLocationResponse {
    #[serde(alias = "lat")]
    latitude: Option<f64>,
    #[serde(alias = "lon")]
    longitude: Option<f64>,
    /// Some services flag failures in-band instead of via status codes.
    #[serde(default)]
    error: Option<serde_json::Value>,
    #[serde(default)]
    reason: Option<String>,
}

/// Geolocation platform backed by an IP geolocation web service.
#[derive(Debug, Clone)]
pub struct IpGeolocation {
    client: reqwest::Client,
    endpoint: String,
}

impl IpGeolocation {
    /// Create a client for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, PlatformError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("facilitymap/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| PlatformError::Other(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    /// Create a client for [`DEFAULT_IP_GEOLOCATION_ENDPOINT`].
    pub fn with_default_endpoint() -> Result<Self, PlatformError> {
        Self::new(DEFAULT_IP_GEOLOCATION_ENDPOINT)
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

/// Whether a URL is acceptable for location traffic: HTTPS, or any scheme on loopback.
fn is_secure_url(endpoint: &str) -> bool {
    let Ok(url) = Url::parse(endpoint) else {
        return false;
    };

    if url.scheme() == "https" {
        return true;
    }

    matches!(
        url.host_str(),
        Some("localhost") | Some("127.0.0.1") | Some("[::1]") | Some("::1")
    )
}

fn parse_response(body: &[u8]) -> Result<GeoPoint, PlatformError> {
    let response: IpLocationResponse = serde_json::from_slice(body)
        .map_err(|e| PlatformError::PositionUnavailable(format!("Invalid response: {}", e)))?;

    let in_band_error = response
        .error
        .as_ref()
        .is_some_and(|v| v.as_bool().unwrap_or(true));
    if in_band_error {
        return Err(PlatformError::PositionUnavailable(
            response
                .reason
                .unwrap_or_else(|| "service reported an error".to_string()),
        ));
    }

    match (response.latitude, response.longitude) {
        (Some(lat), Some(lon)) => GeoPoint::new(lat, lon)
            .map_err(|e| PlatformError::PositionUnavailable(e.to_string())),
        _ => Err(PlatformError::PositionUnavailable(
            "response carries no coordinates".to_string(),
        )),
    }
}

fn classify_status(status: StatusCode) -> PlatformError {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => PlatformError::PermissionDenied,
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => PlatformError::Timeout,
        other => PlatformError::PositionUnavailable(format!("HTTP {}", other)),
    }
}

impl GeolocationPlatform for IpGeolocation {
    fn is_available(&self) -> bool {
        Url::parse(&self.endpoint).is_ok()
    }

    fn is_secure_context(&self) -> bool {
        is_secure_url(&self.endpoint)
    }

    async fn current_position(&self, options: &LocationOptions) -> Result<GeoPoint, PlatformError> {
        if options.high_accuracy {
            debug!(
                endpoint = %self.endpoint,
                "High accuracy requested; IP geolocation is city-level at best"
            );
        }

        let response = self
            .client
            .get(&self.endpoint)
            // Leave headroom so the detector's own deadline stays authoritative.
            .timeout(options.timeout + Duration::from_millis(500))
            .send()
            .await
            .map_err(|e| {
                warn!(endpoint = %self.endpoint, error = %e, "IP geolocation request failed");
                if e.is_timeout() {
                    PlatformError::Timeout
                } else {
                    PlatformError::PositionUnavailable(format!("Request failed: {}", e))
                }
            })?;

        if !response.status().is_success() {
            return Err(classify_status(response.status()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| PlatformError::Other(format!("Failed to read response: {}", e)))?;

        parse_response(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secure_url_detection() {
        assert!(is_secure_url("https://ipapi.co/json/"));
        assert!(is_secure_url("http://localhost:8080/where"));
        assert!(is_secure_url("http://127.0.0.1/json"));
        assert!(!is_secure_url("http://ip-api.com/json"));
        assert!(!is_secure_url("not a url"));
    }

    #[test]
    fn test_insecure_endpoint_is_not_secure_context() {
        let platform = IpGeolocation::new("http://ip-api.com/json").unwrap();
        assert!(platform.is_available());
        assert!(!platform.is_secure_context());
    }

    #[test]
    fn test_parse_latitude_longitude() {
        let body = br#"{"ip":"1.2.3.4","latitude":56.9496,"longitude":24.1052}"#;
        let point = parse_response(body).unwrap();
        assert_eq!(point, GeoPoint::new(56.9496, 24.1052).unwrap());
    }

    #[test]
    fn test_parse_lat_lon_alias() {
        let body = br#"{"status":"success","lat":10.5,"lon":-20.25}"#;
        let point = parse_response(body).unwrap();
        assert_eq!(point.lat(), 10.5);
        assert_eq!(point.lon(), -20.25);
    }

    #[test]
    fn test_parse_in_band_error() {
        let body = br#"{"error":true,"reason":"RateLimited"}"#;
        assert_eq!(
            parse_response(body),
            Err(PlatformError::PositionUnavailable("RateLimited".into()))
        );
    }

    #[test]
    fn test_parse_missing_coordinates() {
        let body = br#"{"ip":"1.2.3.4"}"#;
        assert!(matches!(
            parse_response(body),
            Err(PlatformError::PositionUnavailable(_))
        ));
    }

    #[test]
    fn test_classify_status() {
        assert_eq!(
            classify_status(StatusCode::FORBIDDEN),
            PlatformError::PermissionDenied
        );
        assert_eq!(
            classify_status(StatusCode::GATEWAY_TIMEOUT),
            PlatformError::Timeout
        );
        assert!(matches!(
            classify_status(StatusCode::TOO_MANY_REQUESTS),
            PlatformError::PositionUnavailable(_)
        ));
    }
}
