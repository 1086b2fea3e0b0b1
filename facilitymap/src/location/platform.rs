//! Platform geolocation capability abstraction.

use std::future::Future;

use super::types::{LocationOptions, PlatformError};
use crate::geo::GeoPoint;

/// A source of the user's position.
///
/// This is the single boundary where platform callbacks or services are
/// wrapped; everything inward sees one async request returning one result.
pub trait GeolocationPlatform: Send + Sync {
    /// Whether the capability exists at all in this runtime.
    fn is_available(&self) -> bool;

    /// Whether the capability may be used from the current context.
    ///
    /// Positions must only be requested over secure channels (HTTPS or a
    /// loopback host).
    fn is_secure_context(&self) -> bool;

    /// Request a single position fix.
    fn current_position(
        &self,
        options: &LocationOptions,
    ) -> impl Future<Output = Result<GeoPoint, PlatformError>> + Send;
}

/// A platform that always reports a fixed, user-supplied position.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition {
    position: GeoPoint,
}

impl FixedPosition {
    pub fn new(position: GeoPoint) -> Self {
        Self { position }
    }
}

impl GeolocationPlatform for FixedPosition {
    fn is_available(&self) -> bool {
        true
    }

    fn is_secure_context(&self) -> bool {
        true
    }

    async fn current_position(&self, _options: &LocationOptions) -> Result<GeoPoint, PlatformError> {
        Ok(self.position)
    }
}

/// A runtime without any geolocation capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoGeolocation;

impl GeolocationPlatform for NoGeolocation {
    fn is_available(&self) -> bool {
        false
    }

    fn is_secure_context(&self) -> bool {
        false
    }

    async fn current_position(&self, _options: &LocationOptions) -> Result<GeoPoint, PlatformError> {
        Err(PlatformError::Other("no geolocation capability".to_string()))
    }
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    /// Scripted platform for tests.
    ///
    /// Responses are consumed in order; the last one repeats.
    pub struct MockPlatform {
        pub available: bool,
        pub secure: bool,
        pub delay: Option<Duration>,
        responses: Mutex<VecDeque<Result<GeoPoint, PlatformError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl MockPlatform {
        pub fn new(responses: Vec<Result<GeoPoint, PlatformError>>) -> Self {
            Self {
                available: true,
                secure: true,
                delay: None,
                responses: Mutex::new(responses.into()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn granting(point: GeoPoint) -> Self {
            Self::new(vec![Ok(point)])
        }

        pub fn failing(error: PlatformError) -> Self {
            Self::new(vec![Err(error)])
        }

        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn insecure(mut self) -> Self {
            self.secure = false;
            self
        }

        /// Shared counter of `current_position` invocations.
        pub fn calls(&self) -> Arc<AtomicUsize> {
            Arc::clone(&self.calls)
        }
    }

    impl GeolocationPlatform for MockPlatform {
        fn is_available(&self) -> bool {
            self.available
        }

        fn is_secure_context(&self) -> bool {
            self.secure
        }

        async fn current_position(
            &self,
            _options: &LocationOptions,
        ) -> Result<GeoPoint, PlatformError> {
            self.calls.fetch_add(1, Ordering::SeqCst);

            let response = {
                let mut responses = self.responses.lock().unwrap();
                if responses.len() > 1 {
                    responses.pop_front().unwrap()
                } else {
                    responses
                        .front()
                        .cloned()
                        .unwrap_or(Err(PlatformError::Other("no scripted response".into())))
                }
            };

            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }

            response
        }
    }

    #[tokio::test]
    async fn test_fixed_position_reports_point() {
        let point = GeoPoint::new(56.9496, 24.1052).unwrap();
        let platform = FixedPosition::new(point);

        assert!(platform.is_available());
        assert!(platform.is_secure_context());
        let result = platform.current_position(&LocationOptions::default()).await;
        assert_eq!(result, Ok(point));
    }

    #[test]
    fn test_no_geolocation_is_unavailable() {
        let platform = NoGeolocation;
        assert!(!platform.is_available());
    }

    #[tokio::test]
    async fn test_mock_platform_consumes_responses_in_order() {
        let point = GeoPoint::new(1.0, 1.0).unwrap();
        let platform = MockPlatform::new(vec![Err(PlatformError::PermissionDenied), Ok(point)]);
        let options = LocationOptions::default();

        assert_eq!(
            platform.current_position(&options).await,
            Err(PlatformError::PermissionDenied)
        );
        assert_eq!(platform.current_position(&options).await, Ok(point));
        assert_eq!(platform.current_position(&options).await, Ok(point));
        assert_eq!(platform.calls().load(Ordering::SeqCst), 3);
    }
}
